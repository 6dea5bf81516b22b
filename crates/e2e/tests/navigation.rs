//! Behaviour tests over a recording fake session
//!
//! These run anywhere: the appliance is wired to a `FakeSession` and the
//! assertions are on the exact action sequences the console would have seen.

use std::sync::Arc;

use stratus_model::access_control::{Credential, Tenant, User};
use stratus_model::instance::{Ec2Instance, Instance};
use stratus_model::provider::{CloudProvider, ProviderType};
use stratus_model::{default_registry, Appliance, Navigatable};
use stratus_rest::RestClient;
use stratus_ui::testing::{FakeSession, Failure};

const SUCCESS_FLASH: &str = "[data-testid=\"flash-msg\"][data-level=\"success\"]";

fn appliance() -> (Arc<FakeSession>, Arc<Appliance>) {
    let session = Arc::new(FakeSession::new());
    let rest = RestClient::new("http://127.0.0.1:1", "admin", "smartvm")
        .expect("rest client builds offline");
    let appliance = Appliance::new(
        "http://127.0.0.1:1",
        Arc::clone(&session) as Arc<dyn stratus_ui::UiSession>,
        rest,
        default_registry(),
    );
    (session, appliance)
}

fn alice(appliance: &Arc<Appliance>) -> User {
    User::new(appliance, "alice", Credential::new("alice", "secret"))
}

#[test]
fn user_create_walks_configuration_then_users_then_the_form() {
    let (session, appliance) = appliance();
    session.stage_texts(SUCCESS_FLASH, vec!["User \"alice\" was saved".to_string()]);

    alice(&appliance).create().unwrap();

    assert_eq!(
        session.actions(),
        vec![
            "goto:/configuration",
            "wait:[data-testid=\"settings-shell\"]",
            "click:[data-testid=\"accordion-access-control\"]",
            "wait:[data-tree-node=\"Users\"]",
            "click:[data-tree-node=\"Users\"]",
            "click:[data-testid=\"toolbar-configuration\"]",
            "click:[data-menu-item=\"add-a-new-user\"]",
            "fill:[data-testid=\"user-name-input\"]=alice",
            "fill:[data-testid=\"user-userid-input\"]=alice",
            "fill:[data-testid=\"user-password-input\"]=secret",
            "fill:[data-testid=\"user-verify-input\"]=secret",
            "click:[data-testid=\"form-add\"]",
            "texts:[data-testid=\"flash-msg\"][data-level=\"success\"]",
        ]
    );
}

#[test]
fn repeat_details_navigation_only_replays_the_terminal_hop() {
    let (session, appliance) = appliance();
    let user = alice(&appliance);

    user.navigate_to("Details").unwrap();
    session.clear_actions();

    user.navigate_to("Details").unwrap();

    // Configuration and the Users grid are already on screen; only the
    // Details hop runs again.
    assert_eq!(
        session.actions(),
        vec![
            "click:[data-testid=\"accordion-access-control\"]",
            "wait:[data-tree-node=\"Users\"]",
            "click:[data-tree-node=\"Users\"]",
            "wait:[data-tree-node=\"alice\"]",
            "click:[data-tree-node=\"alice\"]",
        ]
    );
}

#[test]
fn forced_refresh_replays_the_whole_chain_with_resetters() {
    let (session, appliance) = appliance();
    let user = alice(&appliance);

    user.navigate_to("Details").unwrap();
    session.clear_actions();

    user.navigate_fresh("Details").unwrap();

    let actions = session.actions();
    assert!(actions.contains(&"click:[data-testid=\"accordion-access-control-refresh\"]".to_string()));
    assert!(actions.contains(&"goto:/configuration".to_string()));
}

#[test]
fn exists_is_false_when_the_tree_has_no_such_user() {
    let (session, appliance) = appliance();
    session.fail_on("[data-tree-node=\"alice\"]", Failure::NotFound);

    assert!(!alice(&appliance).exists().unwrap());
}

#[test]
fn exists_propagates_timeouts_instead_of_hiding_them() {
    let (session, appliance) = appliance();
    session.fail_on("[data-testid=\"settings-shell\"]", Failure::Timeout);

    assert!(alice(&appliance).exists().is_err());
}

#[test]
fn tag_assignment_arms_the_confirm_before_the_policy_menu() {
    let (session, appliance) = appliance();
    session.stage_texts(
        SUCCESS_FLASH,
        vec!["Tag edits were successfully saved".to_string()],
    );
    let user = alice(&appliance);
    user.navigate_to("Details").unwrap();
    session.clear_actions();

    user.edit_tags("Department", "Engineering").unwrap();

    let actions = session.actions();
    let alert = actions.iter().position(|a| a == "accept_alert").unwrap();
    let menu = actions
        .iter()
        .position(|a| a == "click:[data-testid=\"toolbar-policy\"]")
        .unwrap();
    assert!(alert < menu);
    assert!(actions.contains(
        &"select:[data-testid=\"tag-category-select\"]=Department".to_string()
    ));
    assert!(actions.contains(
        &"select:[data-testid=\"tag-value-select\"]=Engineering".to_string()
    ));
}

#[test]
fn child_tenant_add_goes_through_the_parents_details() {
    let (session, appliance) = appliance();
    let child = Tenant::new(&appliance, "engineering", "Engineering tenant");

    child.navigate_to("Add").unwrap();

    let actions = session.actions();
    let parent_node = actions
        .iter()
        .position(|a| a == "click:[data-tree-node=\"My Company\"]")
        .unwrap();
    let add_item = actions
        .iter()
        .position(|a| a == "click:[data-menu-item=\"add-child-tenant-to-this-tenant\"]")
        .unwrap();
    assert!(parent_node < add_item);
}

#[test]
fn ec2_details_shadow_the_generic_instance_registration() {
    let (session, appliance) = appliance();
    let provider = CloudProvider::new(&appliance, "ec2west", ProviderType::Ec2);

    Ec2Instance::new(&appliance, "web-1", provider.clone())
        .navigate_to("Details")
        .unwrap();
    let ec2_actions = session.actions();
    assert!(ec2_actions.contains(&"wait:[data-testid=\"summary-ec2\"]".to_string()));

    session.clear_actions();
    appliance.navigator().invalidate();

    Instance::new(&appliance, "web-2", provider)
        .navigate_to("Details")
        .unwrap();
    let generic_actions = session.actions();
    assert!(!generic_actions.contains(&"wait:[data-testid=\"summary-ec2\"]".to_string()));
}

#[test]
fn logout_invalidates_the_resolved_path() {
    let (session, appliance) = appliance();
    let user = alice(&appliance);

    user.navigate_to("Details").unwrap();
    appliance.logout().unwrap();
    session.clear_actions();

    user.navigate_to("Details").unwrap();

    // Nothing is trusted after a session change; the chain replays from the
    // Configuration root.
    assert_eq!(session.actions().first().unwrap(), "goto:/configuration");
}
