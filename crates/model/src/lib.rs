//! Stratus console domain entities and their navigation registrations
//!
//! Each entity (user, group, role, tenant, provider, instance, deployment
//! role, tag category/tag) is a [`stratus_nav::Subject`] with a set of
//! registered destinations, plus page-object CRUD methods that navigate,
//! fill forms, and assert flash messages through the appliance's
//! [`stratus_ui::UiSession`].
//!
//! The registry is populated by one explicit call to [`register_all`] before
//! the first navigation; tests may build isolated registries the same way.

pub mod access_control;
pub mod appliance;
pub mod deployment_role;
pub mod error;
pub mod instance;
pub mod provider;
pub mod tagging;
pub mod timelines;

use std::sync::Arc;

use stratus_nav::Registry;

pub use appliance::{Appliance, Navigatable, Server};
pub use error::{ModelError, ModelResult};

/// Register every known navigation step. Call once at startup, before any
/// navigation runs.
pub fn register_all(registry: &mut Registry) {
    appliance::register(registry);
    access_control::register(registry);
    provider::register(registry);
    instance::register(registry);
    deployment_role::register(registry);
    tagging::register(registry);
}

/// A fully populated, shareable registry.
pub fn default_registry() -> Arc<Registry> {
    let mut registry = Registry::new();
    register_all(&mut registry);
    Arc::new(registry)
}
