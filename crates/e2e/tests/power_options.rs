//! EC2 power menu availability tables

use test_case::test_case;

use stratus_model::instance::{
    Ec2Instance, SOFT_REBOOT, START, STATE_ARCHIVED, STATE_OFF, STATE_ON, STATE_SUSPENDED,
    STATE_TERMINATED, STATE_UNKNOWN, STOP, TERMINATE,
};

#[test_case(STATE_ON, STOP; "running instances can stop")]
#[test_case(STATE_ON, SOFT_REBOOT; "running instances can reboot")]
#[test_case(STATE_ON, TERMINATE; "running instances can terminate")]
#[test_case(STATE_OFF, START; "stopped instances can start")]
#[test_case(STATE_OFF, TERMINATE; "stopped instances can terminate")]
fn option_is_available(state: &str, option: &str) {
    assert!(Ec2Instance::available_power_options(state).contains(&option));
}

#[test_case(STATE_ON, START; "running instances cannot start")]
#[test_case(STATE_OFF, STOP; "stopped instances cannot stop")]
#[test_case(STATE_OFF, SOFT_REBOOT; "stopped instances cannot reboot")]
fn option_is_withheld(state: &str, option: &str) {
    assert!(Ec2Instance::unavailable_power_options(state).contains(&option));
}

#[test_case(STATE_TERMINATED)]
#[test_case(STATE_ARCHIVED)]
#[test_case(STATE_UNKNOWN)]
fn terminal_states_offer_nothing(state: &str) {
    assert!(Ec2Instance::available_power_options(state).is_empty());
    assert_eq!(Ec2Instance::unavailable_power_options(state).len(), 4);
}

#[test]
fn a_state_never_lists_an_option_both_ways() {
    for state in [
        STATE_ON,
        STATE_OFF,
        STATE_SUSPENDED,
        STATE_TERMINATED,
        STATE_ARCHIVED,
        STATE_UNKNOWN,
    ] {
        let available = Ec2Instance::available_power_options(state);
        for option in Ec2Instance::unavailable_power_options(state) {
            assert!(!available.contains(option), "{state} lists {option} twice");
        }
    }
}
