//! Cloud providers and their screens

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::info;

use stratus_nav::{
    downcast_subject, NavArgs, NavStep, Prerequisite, Registry, StepError, Subject, SubjectRef,
};
use stratus_ui::widgets::{flash, toolbar, FieldValue, Form};

use crate::appliance::{Appliance, Navigatable};
use crate::error::{ModelError, ModelResult};
use crate::tagging;

const PROVIDERS_GRID: &str = "[data-testid=\"providers-grid\"]";
const FORM_ADD: &str = "[data-testid=\"form-add\"]";
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// The provider backends the console can manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Ec2,
    Azure,
    OpenStack,
}

impl ProviderType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderType::Ec2 => "Amazon EC2",
            ProviderType::Azure => "Azure",
            ProviderType::OpenStack => "OpenStack",
        }
    }
}

fn provider_form() -> Form {
    Form::new("provider")
        .text("name", "[data-testid=\"provider-name-input\"]")
        .select("provider_type", "[data-testid=\"provider-type-select\"]")
        .select("region", "[data-testid=\"provider-region-select\"]")
        .text("access_key", "[data-testid=\"provider-access-key-input\"]")
        .text("secret_key", "[data-testid=\"provider-secret-key-input\"]")
}

/// A cloud provider registered with the console.
#[derive(Clone)]
pub struct CloudProvider {
    pub name: String,
    pub provider_type: ProviderType,
    pub region: Option<String>,
    appliance: Arc<Appliance>,
}

impl CloudProvider {
    pub fn new(appliance: &Arc<Appliance>, name: &str, provider_type: ProviderType) -> Self {
        Self {
            name: name.to_string(),
            provider_type,
            region: None,
            appliance: Arc::clone(appliance),
        }
    }

    pub fn in_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub fn create(&self, access_key: &str, secret_key: &str) -> ModelResult<()> {
        info!(provider = %self.name, kind = self.provider_type.as_str(), "adding provider");
        self.navigate_to("Add")?;
        let mut values = vec![
            ("name", FieldValue::Text(self.name.clone())),
            (
                "provider_type",
                FieldValue::Choice(self.provider_type.as_str().to_string()),
            ),
        ];
        if let Some(region) = &self.region {
            values.push(("region", FieldValue::Choice(region.clone())));
        }
        values.push(("access_key", access_key.into()));
        values.push(("secret_key", secret_key.into()));
        provider_form().fill_and(self.appliance.ui(), &values, FORM_ADD)?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Cloud Providers \"{}\" was saved", self.name),
        )?;
        Ok(())
    }

    pub fn delete(&self) -> ModelResult<()> {
        self.navigate_to("Details")?;
        toolbar::select_confirm(
            self.appliance.ui(),
            "Configuration",
            "Remove this Cloud Provider from Inventory",
        )?;
        flash::assert_success(self.appliance.ui(), "Delete initiated for 1 Cloud Provider")?;
        Ok(())
    }

    /// Queue an inventory refresh for this provider.
    pub fn refresh_relationships(&self) -> ModelResult<()> {
        self.navigate_to("Details")?;
        toolbar::select_confirm(
            self.appliance.ui(),
            "Configuration",
            "Refresh Relationships and Power States",
        )?;
        flash::assert_no_errors(self.appliance.ui())?;
        Ok(())
    }

    pub fn edit_tags(&self, category: &str, value: &str) -> ModelResult<()> {
        self.navigate_to("Details")?;
        tagging::open_tag_editor(self.appliance.ui(), "Cloud Provider")?;
        tagging::assign(self.appliance.ui(), category, value)?;
        Ok(())
    }

    pub fn exists(&self) -> ModelResult<bool> {
        match self.navigate_to("Details") {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = ModelError::from(err);
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }
}

impl Subject for CloudProvider {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["CloudProvider"]
    }

    fn identity(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "appliance" => Some(Arc::clone(&self.appliance) as SubjectRef),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Navigatable for CloudProvider {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

struct ProviderAll;

impl NavStep for ProviderAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Root
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let provider = downcast_subject::<CloudProvider>(subject)?;
        let ui = provider.appliance.ui();
        ui.goto("/providers")?;
        ui.wait_for(PROVIDERS_GRID, PAGE_TIMEOUT)?;
        Ok(json!({ "page": "providers" }))
    }
}

struct ProviderAdd;

impl NavStep for ProviderAdd {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let provider = downcast_subject::<CloudProvider>(subject)?;
        toolbar::select(
            provider.appliance.ui(),
            "Configuration",
            "Add a New Cloud Provider",
        )?;
        Ok(json!({ "page": "provider-add" }))
    }
}

struct ProviderDetails;

impl NavStep for ProviderDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let provider = downcast_subject::<CloudProvider>(subject)?;
        provider
            .appliance
            .ui()
            .click(&format!("[data-quadicon=\"{}\"]", provider.name))?;
        Ok(json!({ "page": "provider-details", "provider": provider.name }))
    }
}

struct ProviderTimelines;

impl NavStep for ProviderTimelines {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let provider = downcast_subject::<CloudProvider>(subject)?;
        toolbar::select(provider.appliance.ui(), "Monitoring", "Timelines")?;
        Ok(json!({ "page": "provider-timelines", "provider": provider.name }))
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register("CloudProvider", "All", ProviderAll);
    registry.register("CloudProvider", "Add", ProviderAdd);
    registry.register("CloudProvider", "Details", ProviderDetails);
    registry.register("CloudProvider", "Timelines", ProviderTimelines);
}
