//! Deployment roles reported by infrastructure providers

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use stratus_nav::{
    downcast_subject, NavArgs, NavStep, Prerequisite, Registry, StepError, Subject, SubjectRef,
};
use stratus_ui::widgets::toolbar;

use crate::appliance::{Appliance, Navigatable};
use crate::error::ModelResult;
use crate::provider::CloudProvider;

const ROLES_GRID: &str = "[data-testid=\"deployment-roles-grid\"]";
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// A deployment role (compute, controller, ...) on a provider.
#[derive(Clone)]
pub struct DeploymentRole {
    pub name: String,
    pub provider: CloudProvider,
    appliance: Arc<Appliance>,
}

impl DeploymentRole {
    pub fn new(appliance: &Arc<Appliance>, name: &str, provider: CloudProvider) -> Self {
        Self {
            name: name.to_string(),
            provider,
            appliance: Arc::clone(appliance),
        }
    }

    /// Names of every deployment role currently listed.
    pub fn list_names(appliance: &Arc<Appliance>, provider: &CloudProvider) -> ModelResult<Vec<String>> {
        let probe = DeploymentRole::new(appliance, "", provider.clone());
        probe.navigate_to("AllForProvider")?;
        let names = appliance.ui().texts_of("[data-role-name]")?;
        Ok(names)
    }

    /// A field from one titled section of the Details summary.
    pub fn summary_detail(&self, section: &str, field: &str) -> ModelResult<String> {
        self.navigate_to("Details")?;
        let value = self.appliance.ui().text_of(&format!(
            "[data-summary=\"{}\"] [data-field=\"{}\"]",
            stratus_ui::widgets::slug(section),
            stratus_ui::widgets::slug(field),
        ))?;
        Ok(value)
    }

    pub fn delete(&self) -> ModelResult<()> {
        self.navigate_to("DetailsFromProvider")?;
        toolbar::select_confirm(
            self.appliance.ui(),
            "Configuration",
            "Remove this Deployment Role from Inventory",
        )?;
        Ok(())
    }
}

impl Subject for DeploymentRole {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["DeploymentRole"]
    }

    fn identity(&self) -> Vec<String> {
        vec![self.provider.name.clone(), self.name.clone()]
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "appliance" => Some(Arc::clone(&self.appliance) as SubjectRef),
            "provider" => Some(Arc::new(self.provider.clone()) as SubjectRef),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Navigatable for DeploymentRole {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

struct RoleAll;

impl NavStep for RoleAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Root
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let role = downcast_subject::<DeploymentRole>(subject)?;
        let ui = role.appliance.ui();
        ui.goto("/compute/deployment-roles")?;
        ui.wait_for(ROLES_GRID, PAGE_TIMEOUT)?;
        Ok(json!({ "page": "deployment-roles" }))
    }
}

struct RoleDetails;

impl NavStep for RoleDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let role = downcast_subject::<DeploymentRole>(subject)?;
        role.appliance
            .ui()
            .click(&format!("[data-quadicon=\"{}\"]", role.name))?;
        Ok(json!({ "page": "deployment-role-details", "role": role.name }))
    }
}

/// The same grid, reached through the owning provider's relationships panel.
struct RoleAllForProvider;

impl NavStep for RoleAllForProvider {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::attribute_to("provider", "Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let role = downcast_subject::<DeploymentRole>(subject)?;
        let ui = role.appliance.ui();
        ui.click("[data-testid=\"relationship-deployment-roles\"]")?;
        ui.wait_for(ROLES_GRID, PAGE_TIMEOUT)?;
        Ok(json!({ "page": "deployment-roles", "provider": role.provider.name }))
    }
}

struct RoleDetailsFromProvider;

impl NavStep for RoleDetailsFromProvider {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("AllForProvider")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let role = downcast_subject::<DeploymentRole>(subject)?;
        role.appliance
            .ui()
            .click(&format!("[data-quadicon=\"{}\"]", role.name))?;
        Ok(json!({ "page": "deployment-role-details", "role": role.name }))
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register("DeploymentRole", "All", RoleAll);
    registry.register("DeploymentRole", "Details", RoleDetails);
    registry.register("DeploymentRole", "AllForProvider", RoleAllForProvider);
    registry.register("DeploymentRole", "DetailsFromProvider", RoleDetailsFromProvider);
}
