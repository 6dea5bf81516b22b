//! The appliance: one console under test and its session handles

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde_json::{json, Value};
use tracing::info;

use stratus_nav::{
    downcast_subject, NavArgs, NavError, NavStep, Navigator, Prerequisite, Registry, StepError,
    Subject, SubjectRef, ViewHandle,
};
use stratus_rest::RestClient;
use stratus_ui::widgets::{flash, Form};
use stratus_ui::UiSession;

use crate::error::ModelResult;

const LOGIN_USERNAME: &str = "[data-testid=\"login-identifier-input\"]";
const LOGIN_PASSWORD: &str = "[data-testid=\"login-password-input\"]";
const LOGIN_SUBMIT: &str = "[data-testid=\"login-submit\"]";
const APP_SHELL: &str = "[data-testid=\"app-shell\"]";
const SETTINGS_SHELL: &str = "[data-testid=\"settings-shell\"]";

const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// One console instance: the browser session, the REST client, and the
/// navigator every entity built on this appliance shares.
pub struct Appliance {
    base_url: String,
    ui: Arc<dyn UiSession>,
    rest: RestClient,
    navigator: Navigator,
    // Lets `related("server")` hand out subjects that point back here.
    me: Weak<Appliance>,
}

impl Appliance {
    pub fn new(
        base_url: &str,
        ui: Arc<dyn UiSession>,
        rest: RestClient,
        registry: Arc<Registry>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ui,
            rest,
            navigator: Navigator::new(registry),
            me: me.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ui(&self) -> &dyn UiSession {
        self.ui.as_ref()
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn server(self: &Arc<Self>) -> Server {
        Server {
            appliance: Arc::clone(self),
        }
    }

    /// Log in through the UI and wait for the application shell.
    pub fn login(&self, username: &str, password: &str) -> ModelResult<()> {
        info!(%username, "logging in");
        self.ui.goto("/login")?;
        login_form().fill_and(
            self.ui(),
            &[("username", username.into()), ("password", password.into())],
            LOGIN_SUBMIT,
        )?;
        self.ui.wait_for(APP_SHELL, PAGE_TIMEOUT)?;
        Ok(())
    }

    /// Log out and drop the navigator's path cache; nothing previously
    /// resolved survives a session change.
    pub fn logout(&self) -> ModelResult<()> {
        self.ui.click("[data-testid=\"logout\"]")?;
        self.navigator.invalidate();
        Ok(())
    }
}

impl Subject for Appliance {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Appliance"]
    }

    fn identity(&self) -> Vec<String> {
        vec![self.base_url.clone()]
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "server" => {
                let appliance = self.me.upgrade()?;
                Some(Arc::new(Server { appliance }))
            }
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn login_form() -> Form {
    Form::new("login")
        .text("username", LOGIN_USERNAME)
        .text("password", LOGIN_PASSWORD)
}

/// The console server itself; the root subject that cross-entity attribute
/// prerequisites (`appliance.server`) land on.
#[derive(Clone)]
pub struct Server {
    pub(crate) appliance: Arc<Appliance>,
}

impl Subject for Server {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Server"]
    }

    fn identity(&self) -> Vec<String> {
        vec![self.appliance.base_url().to_string()]
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "appliance" => Some(Arc::clone(&self.appliance) as SubjectRef),
            _ => None,
        }
    }

    fn default_destination(&self) -> &'static str {
        "Dashboard"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Entities that can be navigated to. Supplies `navigate_to` sugar over the
/// appliance's navigator so call sites read like
/// `user.navigate_to("Details")?`.
pub trait Navigatable: Subject + Clone + Sized + 'static {
    fn appliance(&self) -> &Arc<Appliance>;

    fn subject(&self) -> SubjectRef {
        Arc::new(self.clone())
    }

    fn navigate_to(&self, destination: &str) -> Result<ViewHandle, NavError> {
        self.appliance()
            .navigator()
            .navigate_to(&self.subject(), destination)
    }

    fn navigate_with(&self, destination: &str, args: &NavArgs) -> Result<ViewHandle, NavError> {
        self.appliance()
            .navigator()
            .navigate_with(&self.subject(), destination, args, false)
    }

    /// Navigate with resetters applied and no prerequisite skipping.
    fn navigate_fresh(&self, destination: &str) -> Result<ViewHandle, NavError> {
        self.appliance()
            .navigator()
            .navigate_fresh(&self.subject(), destination)
    }
}

impl Navigatable for Server {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

struct ServerDashboard;

impl NavStep for ServerDashboard {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Root
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let server = downcast_subject::<Server>(subject)?;
        let ui = server.appliance.ui();
        ui.goto("/")?;
        ui.wait_for(APP_SHELL, PAGE_TIMEOUT)?;
        flash::assert_no_errors(ui)?;
        Ok(json!({ "page": "dashboard" }))
    }
}

struct ServerConfiguration;

impl NavStep for ServerConfiguration {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Root
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let server = downcast_subject::<Server>(subject)?;
        let ui = server.appliance.ui();
        ui.goto("/configuration")?;
        ui.wait_for(SETTINGS_SHELL, PAGE_TIMEOUT)?;
        Ok(json!({ "page": "configuration" }))
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register("Server", "Dashboard", ServerDashboard);
    registry.register("Server", "Configuration", ServerConfiguration);
}
