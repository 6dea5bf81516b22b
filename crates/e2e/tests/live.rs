//! Tests against a real console; skipped unless STRATUS_BASE_URL is set

use std::time::Duration;

use stratus_e2e::{wait_for, Harness};
use stratus_model::access_control::{Credential, User};
use stratus_model::Navigatable;

fn harness() -> Option<Harness> {
    Harness::from_env().expect("harness config should parse")
}

#[test]
fn dashboard_and_configuration_render() {
    let Some(harness) = harness() else { return };
    let server = harness.appliance().server();

    server.navigate_to("Dashboard").unwrap();
    server.navigate_to("Configuration").unwrap();
}

#[test]
fn user_lifecycle() {
    let Some(harness) = harness() else { return };
    let appliance = harness.appliance();

    let user = User::new(appliance, "e2e-user", Credential::new("e2e-user", "topsecret!1"))
        .with_email("e2e-user@example.com");

    user.create().unwrap();
    assert!(user.exists().unwrap());

    user.delete().unwrap();
    wait_for("user row gone", Duration::from_secs(30), || {
        Ok(!user.exists()?)
    })
    .unwrap();
}
