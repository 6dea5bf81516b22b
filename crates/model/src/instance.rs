//! Cloud instances, including the EC2 specialization
//!
//! `Ec2Instance` re-registers `Details` under its own type name; the
//! registry's most-specific-first lookup makes that registration shadow the
//! generic `Instance` one while everything else falls through.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::info;

use stratus_nav::{
    NavArgs, NavStep, Prerequisite, Registry, StepError, Subject, SubjectRef,
};
use stratus_ui::widgets::toolbar;

use crate::appliance::{Appliance, Navigatable};
use crate::error::{ModelError, ModelResult};
use crate::provider::CloudProvider;
use crate::tagging;

const INSTANCES_GRID: &str = "[data-testid=\"instances-grid\"]";
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Power menu options.
pub const START: &str = "Start";
pub const STOP: &str = "Stop";
pub const SOFT_REBOOT: &str = "Soft Reboot";
pub const TERMINATE: &str = "Delete";

/// Power states as the UI reports them.
pub const STATE_ON: &str = "on";
pub const STATE_OFF: &str = "off";
pub const STATE_SUSPENDED: &str = "suspended";
pub const STATE_TERMINATED: &str = "terminated";
pub const STATE_ARCHIVED: &str = "archived";
pub const STATE_UNKNOWN: &str = "unknown";

/// A cloud instance on some provider.
#[derive(Clone)]
pub struct Instance {
    pub name: String,
    pub provider: CloudProvider,
    appliance: Arc<Appliance>,
}

impl Instance {
    pub fn new(appliance: &Arc<Appliance>, name: &str, provider: CloudProvider) -> Self {
        Self {
            name: name.to_string(),
            provider,
            appliance: Arc::clone(appliance),
        }
    }

    /// Current power state as shown on the Details summary.
    pub fn power_state(&self) -> ModelResult<String> {
        self.navigate_fresh("Details")?;
        let state = self
            .appliance
            .ui()
            .text_of("[data-testid=\"summary-power-state\"]")?;
        Ok(state)
    }

    /// Pick `option` from the Power toolbar menu, confirming the alert.
    pub fn power_control(&self, option: &str) -> ModelResult<()> {
        info!(instance = %self.name, option, "power control");
        self.navigate_to("Details")?;
        toolbar::select_confirm(self.appliance.ui(), "Power", option)?;
        Ok(())
    }

    /// Whether `option` is currently offered in the Power menu.
    pub fn power_option_visible(&self, option: &str) -> ModelResult<bool> {
        self.navigate_to("Details")?;
        let ui = self.appliance.ui();
        ui.click("[data-testid=\"toolbar-power\"]")?;
        let visible = ui.is_visible(&format!(
            "[data-menu-item=\"{}\"]",
            stratus_ui::widgets::slug(option)
        ))?;
        Ok(visible)
    }

    pub fn edit_tags(&self, category: &str, value: &str) -> ModelResult<()> {
        self.navigate_to("Details")?;
        tagging::open_tag_editor(self.appliance.ui(), "Instance")?;
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

impl Subject for Instance {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Instance"]
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

impl Navigatable for Instance {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

/// An instance on an EC2 provider. Inherits the generic destinations but
/// carries EC2 power-state rules and its own Details screen.
#[derive(Clone)]
pub struct Ec2Instance {
    pub base: Instance,
}

impl Ec2Instance {
    pub fn new(appliance: &Arc<Appliance>, name: &str, provider: CloudProvider) -> Self {
        Self {
            base: Instance::new(appliance, name, provider),
        }
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    /// Power options EC2 offers while in `state`.
    pub fn available_power_options(state: &str) -> &'static [&'static str] {
        match state {
            STATE_ON => &[STOP, SOFT_REBOOT, TERMINATE],
            STATE_OFF => &[START, TERMINATE],
            _ => &[],
        }
    }

    /// Power options EC2 withholds while in `state`.
    pub fn unavailable_power_options(state: &str) -> &'static [&'static str] {
        match state {
            STATE_ON => &[START],
            STATE_OFF => &[STOP, SOFT_REBOOT],
            STATE_TERMINATED | STATE_ARCHIVED | STATE_UNKNOWN => {
                &[START, STOP, SOFT_REBOOT, TERMINATE]
            }
            _ => &[],
        }
    }

    pub fn power_control(&self, option: &str) -> ModelResult<()> {
        self.base.power_control(option)
    }

    pub fn power_state(&self) -> ModelResult<String> {
        // Routed through this subject so the EC2 Details registration is the
        // one that runs.
        self.navigate_fresh("Details")?;
        let state = self
            .base
            .appliance
            .ui()
            .text_of("[data-testid=\"summary-power-state\"]")?;
        Ok(state)
    }
}

impl Subject for Ec2Instance {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Ec2Instance", "Instance"]
    }

    fn identity(&self) -> Vec<String> {
        self.base.identity()
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        self.base.related(attribute)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Navigatable for Ec2Instance {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.base.appliance
    }
}

/// Steps registered for `Instance` also run for its subtypes, so they look
/// through the concrete types rather than downcasting to one.
fn as_instance(subject: &dyn Subject) -> Result<&Instance, StepError> {
    if let Some(instance) = subject.as_any().downcast_ref::<Instance>() {
        return Ok(instance);
    }
    if let Some(ec2) = subject.as_any().downcast_ref::<Ec2Instance>() {
        return Ok(&ec2.base);
    }
    Err(format!("subject {:?} is not an instance", subject.type_chain()).into())
}

struct InstanceAll;

impl NavStep for InstanceAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Root
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let instance = as_instance(subject)?;
        let ui = instance.appliance.ui();
        ui.goto("/compute/instances")?;
        ui.wait_for(INSTANCES_GRID, PAGE_TIMEOUT)?;
        Ok(json!({ "page": "instances" }))
    }
}

struct InstanceDetails;

impl NavStep for InstanceDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let instance = as_instance(subject)?;
        instance
            .appliance
            .ui()
            .click(&format!("[data-quadicon=\"{}\"]", instance.name))?;
        Ok(json!({ "page": "instance-details", "instance": instance.name }))
    }
}

struct InstanceTimelines;

impl NavStep for InstanceTimelines {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let instance = as_instance(subject)?;
        toolbar::select(instance.appliance.ui(), "Monitoring", "Timelines")?;
        Ok(json!({ "page": "instance-timelines", "instance": instance.name }))
    }
}

/// EC2 details live behind the same quadicon but land on a screen with the
/// EC2 summary extensions, so it waits for that variant of the shell.
struct Ec2InstanceDetails;

impl NavStep for Ec2InstanceDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let instance = as_instance(subject)?;
        let ui = instance.appliance.ui();
        ui.click(&format!("[data-quadicon=\"{}\"]", instance.name))?;
        ui.wait_for("[data-testid=\"summary-ec2\"]", PAGE_TIMEOUT)?;
        Ok(json!({ "page": "ec2-instance-details", "instance": instance.name }))
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register("Instance", "All", InstanceAll);
    registry.register("Instance", "Details", InstanceDetails);
    registry.register("Instance", "Timelines", InstanceTimelines);
    registry.register("Ec2Instance", "Details", Ec2InstanceDetails);
}
