//! Step registry with most-specific-type lookup

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::step::NavStep;

/// Mapping from `(subject type, destination name)` to exactly one step.
///
/// Populated once at startup by an explicit registration pass (see
/// `stratus_model::register_all`), then shared read-only behind an `Arc`.
/// Registration is pure metadata; no step runs until a navigation asks
/// for it.
#[derive(Default)]
pub struct Registry {
    steps: HashMap<(String, String), Arc<dyn NavStep>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the step for `(subject_type, destination)`. Re-registering
    /// the same pair replaces the previous step; the last registration wins.
    pub fn register(
        &mut self,
        subject_type: impl Into<String>,
        destination: impl Into<String>,
        step: impl NavStep + 'static,
    ) {
        let key = (subject_type.into(), destination.into());
        debug!(subject_type = %key.0, destination = %key.1, "registering navigation step");
        if self
            .steps
            .insert(key.clone(), Arc::new(step))
            .is_some()
        {
            debug!(subject_type = %key.0, destination = %key.1, "replaced existing step");
        }
    }

    /// Find the step for `destination` on the most specific type in
    /// `type_chain` (ordered most-specific first). A subtype registration
    /// shadows a base one for the same destination name.
    pub fn lookup<'a>(
        &self,
        type_chain: &[&'a str],
        destination: &str,
    ) -> Option<(&'a str, Arc<dyn NavStep>)> {
        for &ty in type_chain {
            if let Some(step) = self.steps.get(&(ty.to_string(), destination.to_string())) {
                return Some((ty, Arc::clone(step)));
            }
        }
        None
    }

    /// Destination names registered directly for `subject_type` (not its
    /// ancestors), sorted. Useful for diagnostics.
    pub fn destinations_for(&self, subject_type: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .steps
            .keys()
            .filter(|(ty, _)| ty == subject_type)
            .map(|(_, dest)| dest.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;
    use crate::step::{NavArgs, Prerequisite};
    use crate::subject::Subject;
    use serde_json::{json, Value};

    struct Marker(&'static str);

    impl NavStep for Marker {
        fn prerequisite(&self) -> Prerequisite {
            Prerequisite::Root
        }

        fn execute(&self, _subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
            Ok(json!({ "marker": self.0 }))
        }
    }

    #[test]
    fn lookup_walks_chain_most_specific_first() {
        let mut registry = Registry::new();
        registry.register("Instance", "Details", Marker("base"));
        registry.register("Ec2Instance", "Details", Marker("ec2"));

        let (ty, _) = registry
            .lookup(&["Ec2Instance", "Instance"], "Details")
            .unwrap();
        assert_eq!(ty, "Ec2Instance");

        // A subtype with no registration of its own falls back to the base.
        let (ty, _) = registry
            .lookup(&["AzureInstance", "Instance"], "Details")
            .unwrap();
        assert_eq!(ty, "Instance");
    }

    #[test]
    fn lookup_misses_when_no_ancestor_registered() {
        let mut registry = Registry::new();
        registry.register("Instance", "Details", Marker("base"));

        assert!(registry.lookup(&["User"], "Details").is_none());
        assert!(registry.lookup(&["Instance"], "Edit").is_none());
    }

    #[test]
    fn reregistration_replaces() {
        let mut registry = Registry::new();
        registry.register("User", "All", Marker("first"));
        registry.register("User", "All", Marker("second"));
        assert_eq!(registry.len(), 1);

        let (_, step) = registry.lookup(&["User"], "All").unwrap();
        struct NoSubject;
        impl Subject for NoSubject {
            fn type_chain(&self) -> Vec<&'static str> {
                vec!["User"]
            }
            fn identity(&self) -> Vec<String> {
                vec![]
            }
            fn related(&self, _attribute: &str) -> Option<crate::subject::SubjectRef> {
                None
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
        let out = step.execute(&NoSubject, &NavArgs::new()).unwrap();
        assert_eq!(out["marker"], "second");
    }

    #[test]
    fn destinations_for_lists_direct_registrations() {
        let mut registry = Registry::new();
        registry.register("User", "All", Marker("a"));
        registry.register("User", "Details", Marker("b"));
        registry.register("Group", "All", Marker("c"));

        assert_eq!(registry.destinations_for("User"), vec!["All", "Details"]);
    }
}
