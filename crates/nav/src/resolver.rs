//! Chain construction and root-to-leaf execution

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{NavError, NavResult, StepError};
use crate::registry::Registry;
use crate::step::{NavArgs, NavStep, Prerequisite, ViewHandle};
use crate::subject::{Subject, SubjectRef};

/// One node of a resolution path, compared structurally. Two navigations to
/// the same `(type, identity, destination)` are "the same place" regardless
/// of which subject instance asked.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    subject_type: String,
    identity: Vec<String>,
    destination: String,
}

impl PathNode {
    fn for_subject(subject: &dyn Subject, destination: &str) -> Self {
        Self {
            subject_type: subject
                .type_chain()
                .first()
                .copied()
                .unwrap_or("?")
                .to_string(),
            identity: subject.identity(),
            destination: destination.to_string(),
        }
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}).{}",
            self.subject_type,
            self.identity.join("/"),
            self.destination
        )
    }
}

/// A fully resolved hop: the subject it runs on, its path node, and the step.
struct ChainEntry {
    subject: SubjectRef,
    node: PathNode,
    step: Arc<dyn NavStep>,
}

/// Executes navigation requests against a shared read-only [`Registry`].
///
/// One navigator per session: the only mutable state is the last
/// successfully resolved path, used to skip already-satisfied intermediate
/// steps. Skipping is an optimization, not a correctness requirement;
/// re-executing a skippable step is always safe, just slower. The terminal
/// step is never skipped so every navigation lands on fresh state.
pub struct Navigator {
    registry: Arc<Registry>,
    last_path: Mutex<Vec<PathNode>>,
}

impl Navigator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            last_path: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Navigate `subject` to `destination` with no extra context.
    pub fn navigate_to(&self, subject: &SubjectRef, destination: &str) -> NavResult<ViewHandle> {
        self.navigate_with(subject, destination, &NavArgs::default(), false)
    }

    /// Navigate with a forced refresh: no intermediate step is skipped, and
    /// each step's `reset` hook runs before its `execute`.
    pub fn navigate_fresh(&self, subject: &SubjectRef, destination: &str) -> NavResult<ViewHandle> {
        self.navigate_with(subject, destination, &NavArgs::default(), true)
    }

    /// Full-control navigation entry point. `args` is forwarded to every
    /// step in the resolved path.
    pub fn navigate_with(
        &self,
        subject: &SubjectRef,
        destination: &str,
        args: &NavArgs,
        force_refresh: bool,
    ) -> NavResult<ViewHandle> {
        // Phase 1: resolve the whole chain before touching the session.
        // Configuration errors (unknown destination, cycle, missing
        // attribute) surface here with zero side effects.
        let mut chain = Vec::new();
        let mut seen = Vec::new();
        self.build_chain(Arc::clone(subject), destination.to_string(), &mut seen, &mut chain)?;

        debug!(
            target = %chain[chain.len() - 1].node,
            hops = chain.len(),
            force_refresh,
            "resolved navigation chain"
        );

        // Phase 2: execute root-to-leaf.
        let cached = self.last_path.lock().clone();
        let mut executed: Vec<PathNode> = Vec::with_capacity(chain.len());
        let mut skipping = !force_refresh;
        let terminal_index = chain.len() - 1;
        let mut view = None;

        for (i, entry) in chain.iter().enumerate() {
            let terminal = i == terminal_index;

            // Intermediate hops still forming a prefix of the last resolved
            // path are known-current and may be skipped. The first executed
            // hop invalidates everything after it.
            if skipping && !terminal && cached.get(i) == Some(&entry.node) {
                trace!(node = %entry.node, "prerequisite already current, skipping");
                executed.push(entry.node.clone());
                continue;
            }
            skipping = false;

            if force_refresh {
                if let Err(source) = entry.step.reset(entry.subject.as_ref()) {
                    return Err(self.step_failure(entry, source));
                }
            }

            debug!(node = %entry.node, "executing navigation step");
            match entry.step.execute(entry.subject.as_ref(), args) {
                Ok(data) => {
                    executed.push(entry.node.clone());
                    if terminal {
                        view = Some(ViewHandle::new(
                            &entry.node.subject_type,
                            &entry.node.destination,
                            data,
                        ));
                    }
                }
                Err(source) => return Err(self.step_failure(entry, source)),
            }
        }

        *self.last_path.lock() = executed;

        // The chain always contains at least the terminal entry, so the
        // loop above has produced a view by now.
        match view {
            Some(view) => Ok(view),
            None => unreachable!("terminal step executed without producing a view"),
        }
    }

    /// Drop the last-resolved-path cache. Call after anything that moves the
    /// session out from under the resolver (logout, manual URL changes).
    pub fn invalidate(&self) {
        self.last_path.lock().clear();
    }

    fn step_failure(&self, entry: &ChainEntry, source: StepError) -> NavError {
        // Session state is now wherever the step left it; nothing cached is
        // trustworthy.
        self.last_path.lock().clear();
        NavError::Step {
            subject_type: entry.node.subject_type.clone(),
            destination: entry.node.destination.clone(),
            source,
        }
    }

    /// Recursively resolve `destination` on `subject`, prepending its
    /// prerequisite chain. `chain` comes out ordered root-first.
    fn build_chain(
        &self,
        subject: SubjectRef,
        destination: String,
        seen: &mut Vec<PathNode>,
        chain: &mut Vec<ChainEntry>,
    ) -> NavResult<()> {
        let type_chain = subject.type_chain();
        let (_matched, step) = self
            .registry
            .lookup(&type_chain, &destination)
            .ok_or_else(|| NavError::DestinationNotFound {
                subject_type: type_chain.first().copied().unwrap_or("?").to_string(),
                destination: destination.clone(),
            })?;

        let node = PathNode::for_subject(subject.as_ref(), &destination);
        if seen.contains(&node) {
            let mut path: Vec<String> = seen.iter().map(ToString::to_string).collect();
            path.push(node.to_string());
            return Err(NavError::PrerequisiteCycle { destination, path });
        }
        seen.push(node.clone());

        match step.prerequisite() {
            Prerequisite::Root => {}
            Prerequisite::Sibling(prereq) => {
                self.build_chain(Arc::clone(&subject), prereq, seen, chain)?;
            }
            Prerequisite::Attribute { path, destination: prereq } => {
                let related = self.resolve_attribute(&subject, &path)?;
                let prereq = prereq.unwrap_or_else(|| related.default_destination().to_string());
                self.build_chain(related, prereq, seen, chain)?;
            }
        }

        chain.push(ChainEntry { subject, node, step });
        Ok(())
    }

    /// Walk a dotted attribute path (`appliance.server`) from `subject` to
    /// the related subject it names.
    fn resolve_attribute(&self, subject: &SubjectRef, path: &str) -> NavResult<SubjectRef> {
        let mut current = Arc::clone(subject);
        for segment in path.split('.') {
            current = current.related(segment).ok_or_else(|| NavError::AttributeNotFound {
                subject_type: current
                    .type_chain()
                    .first()
                    .copied()
                    .unwrap_or("?")
                    .to_string(),
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Shared journal of step executions, in order.
    type Journal = Arc<Mutex<Vec<String>>>;

    #[derive(Clone)]
    struct Fixture {
        types: Vec<&'static str>,
        name: String,
        related: HashMap<String, SubjectRef>,
    }

    impl Fixture {
        fn new(types: Vec<&'static str>, name: &str) -> Self {
            Self {
                types,
                name: name.to_string(),
                related: HashMap::new(),
            }
        }

        fn with_related(mut self, attr: &str, subject: impl Subject + 'static) -> Self {
            self.related.insert(attr.to_string(), Arc::new(subject));
            self
        }

        fn into_ref(self) -> SubjectRef {
            Arc::new(self)
        }
    }

    impl Subject for Fixture {
        fn type_chain(&self) -> Vec<&'static str> {
            self.types.clone()
        }

        fn identity(&self) -> Vec<String> {
            vec![self.name.clone()]
        }

        fn related(&self, attribute: &str) -> Option<SubjectRef> {
            self.related.get(attribute).cloned()
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct Recorder {
        label: &'static str,
        prereq: Prerequisite,
        journal: Journal,
        fail: bool,
    }

    impl Recorder {
        fn step(label: &'static str, prereq: Prerequisite, journal: &Journal) -> Self {
            Self {
                label,
                prereq,
                journal: Arc::clone(journal),
                fail: false,
            }
        }

        fn failing(label: &'static str, prereq: Prerequisite, journal: &Journal) -> Self {
            Self {
                fail: true,
                ..Self::step(label, prereq, journal)
            }
        }
    }

    impl NavStep for Recorder {
        fn prerequisite(&self) -> Prerequisite {
            self.prereq.clone()
        }

        fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
            if self.fail {
                return Err(format!("{} blew up", self.label).into());
            }
            self.journal
                .lock()
                .push(format!("{}:{}", self.label, subject.identity().join("/")));
            Ok(json!({ "page": self.label }))
        }

        fn reset(&self, _subject: &dyn Subject) -> Result<(), StepError> {
            self.journal.lock().push(format!("reset:{}", self.label));
            Ok(())
        }
    }

    fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn taken(journal: &Journal) -> Vec<String> {
        journal.lock().clone()
    }

    /// User.'All' -> root, 'Details' -> sibling(All), 'Edit' -> sibling(Details).
    fn user_registry(journal: &Journal) -> Registry {
        let mut registry = Registry::new();
        registry.register("User", "All", Recorder::step("user-all", Prerequisite::Root, journal));
        registry.register(
            "User",
            "Details",
            Recorder::step("user-details", Prerequisite::sibling("All"), journal),
        );
        registry.register(
            "User",
            "Edit",
            Recorder::step("user-edit", Prerequisite::sibling("Details"), journal),
        );
        registry
    }

    #[test]
    fn sibling_chain_executes_root_to_leaf() {
        let journal = journal();
        let navigator = Navigator::new(Arc::new(user_registry(&journal)));
        let user = Fixture::new(vec!["User"], "alice").into_ref();

        let view = navigator.navigate_to(&user, "Edit").unwrap();
        assert_eq!(view.subject_type(), "User");
        assert_eq!(view.destination(), "Edit");
        assert_eq!(view.data()["page"], "user-edit");
        assert_eq!(
            taken(&journal),
            vec!["user-all:alice", "user-details:alice", "user-edit:alice"]
        );
    }

    #[test]
    fn unknown_destination_executes_nothing() {
        let journal = journal();
        let navigator = Navigator::new(Arc::new(user_registry(&journal)));
        let user = Fixture::new(vec!["User"], "alice").into_ref();

        let err = navigator.navigate_to(&user, "Timelines").unwrap_err();
        match err {
            NavError::DestinationNotFound { subject_type, destination } => {
                assert_eq!(subject_type, "User");
                assert_eq!(destination, "Timelines");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(taken(&journal).is_empty());
    }

    #[test]
    fn unregistered_type_reports_not_found() {
        let journal = journal();
        let navigator = Navigator::new(Arc::new(user_registry(&journal)));
        let group = Fixture::new(vec!["Group"], "admins").into_ref();

        assert!(matches!(
            navigator.navigate_to(&group, "All"),
            Err(NavError::DestinationNotFound { .. })
        ));
    }

    #[test]
    fn cycle_rejected_before_any_side_effect() {
        let journal = journal();
        let mut registry = Registry::new();
        registry.register(
            "User",
            "A",
            Recorder::step("a", Prerequisite::sibling("B"), &journal),
        );
        registry.register(
            "User",
            "B",
            Recorder::step("b", Prerequisite::sibling("C"), &journal),
        );
        registry.register(
            "User",
            "C",
            Recorder::step("c", Prerequisite::sibling("A"), &journal),
        );
        let navigator = Navigator::new(Arc::new(registry));
        let user = Fixture::new(vec!["User"], "alice").into_ref();

        let err = navigator.navigate_to(&user, "A").unwrap_err();
        match err {
            NavError::PrerequisiteCycle { destination, path } => {
                assert_eq!(destination, "A");
                assert_eq!(path.first().map(String::as_str), Some("User(alice).A"));
                assert_eq!(path.last().map(String::as_str), Some("User(alice).A"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Fail-fast: the cyclic chain produced zero executions.
        assert!(taken(&journal).is_empty());
    }

    #[test]
    fn subtype_registration_shadows_base() {
        let journal = journal();
        let mut registry = Registry::new();
        registry.register(
            "Instance",
            "All",
            Recorder::step("instance-all", Prerequisite::Root, &journal),
        );
        registry.register(
            "Instance",
            "Details",
            Recorder::step("instance-details", Prerequisite::sibling("All"), &journal),
        );
        registry.register(
            "Ec2Instance",
            "Details",
            Recorder::step("ec2-details", Prerequisite::sibling("All"), &journal),
        );
        let navigator = Navigator::new(Arc::new(registry));

        let ec2 = Fixture::new(vec!["Ec2Instance", "Instance"], "web-1").into_ref();
        navigator.navigate_to(&ec2, "Details").unwrap();
        assert_eq!(taken(&journal), vec!["instance-all:web-1", "ec2-details:web-1"]);

        // 'All' has no Ec2 override and falls through to the base step.
        journal.lock().clear();
        navigator.invalidate();
        navigator.navigate_to(&ec2, "All").unwrap();
        assert_eq!(taken(&journal), vec!["instance-all:web-1"]);
    }

    #[test]
    fn attribute_prerequisite_crosses_subjects() {
        let journal = journal();
        let mut registry = Registry::new();
        registry.register(
            "Server",
            "Configuration",
            Recorder::step("server-config", Prerequisite::Root, &journal),
        );
        registry.register(
            "Group",
            "Details",
            Recorder::step(
                "group-details",
                Prerequisite::attribute_to("appliance.server", "Configuration"),
                &journal,
            ),
        );
        let navigator = Navigator::new(Arc::new(registry));

        let server = Fixture::new(vec!["Server"], "server-1");
        let appliance = Fixture::new(vec!["Appliance"], "env-a").with_related("server", server);
        let group = Fixture::new(vec!["Group"], "admins")
            .with_related("appliance", appliance)
            .into_ref();

        navigator.navigate_to(&group, "Details").unwrap();
        assert_eq!(
            taken(&journal),
            vec!["server-config:server-1", "group-details:admins"]
        );
    }

    #[test]
    fn attribute_without_destination_uses_default() {
        let journal = journal();
        let mut registry = Registry::new();
        registry.register(
            "Provider",
            "All",
            Recorder::step("provider-all", Prerequisite::Root, &journal),
        );
        registry.register(
            "Role",
            "AllForProvider",
            Recorder::step("role-for-provider", Prerequisite::attribute("provider"), &journal),
        );
        let navigator = Navigator::new(Arc::new(registry));

        let provider = Fixture::new(vec!["Provider"], "openstack");
        let role = Fixture::new(vec!["Role"], "compute")
            .with_related("provider", provider)
            .into_ref();

        navigator.navigate_to(&role, "AllForProvider").unwrap();
        assert_eq!(
            taken(&journal),
            vec!["provider-all:openstack", "role-for-provider:compute"]
        );
    }

    #[test]
    fn missing_attribute_fails_before_execution() {
        let journal = journal();
        let mut registry = Registry::new();
        registry.register(
            "Role",
            "AllForProvider",
            Recorder::step("role-for-provider", Prerequisite::attribute("provider"), &journal),
        );
        let navigator = Navigator::new(Arc::new(registry));
        let role = Fixture::new(vec!["Role"], "compute").into_ref();

        let err = navigator.navigate_to(&role, "AllForProvider").unwrap_err();
        match err {
            NavError::AttributeNotFound { segment, .. } => assert_eq!(segment, "provider"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(taken(&journal).is_empty());
    }

    #[test]
    fn second_navigation_skips_satisfied_prerequisites() {
        let journal = journal();
        let navigator = Navigator::new(Arc::new(user_registry(&journal)));
        let user = Fixture::new(vec!["User"], "alice").into_ref();

        let first = navigator.navigate_to(&user, "Edit").unwrap();
        journal.lock().clear();

        // Prerequisites are known-current; only the terminal step re-runs.
        let second = navigator.navigate_to(&user, "Edit").unwrap();
        assert_eq!(taken(&journal), vec!["user-edit:alice"]);
        assert_eq!(first, second);
    }

    #[test]
    fn different_identity_invalidates_the_skip() {
        let journal = journal();
        let navigator = Navigator::new(Arc::new(user_registry(&journal)));
        let alice = Fixture::new(vec!["User"], "alice").into_ref();
        let bob = Fixture::new(vec!["User"], "bob").into_ref();

        navigator.navigate_to(&alice, "Edit").unwrap();
        journal.lock().clear();

        // Same shape, different identity attributes: structural equality
        // fails at the first node and the whole chain re-executes.
        navigator.navigate_to(&bob, "Edit").unwrap();
        assert_eq!(
            taken(&journal),
            vec!["user-all:bob", "user-details:bob", "user-edit:bob"]
        );
    }

    #[test]
    fn shorter_target_still_executes_terminal() {
        let journal = journal();
        let navigator = Navigator::new(Arc::new(user_registry(&journal)));
        let user = Fixture::new(vec!["User"], "alice").into_ref();

        navigator.navigate_to(&user, "Edit").unwrap();
        journal.lock().clear();

        // 'Details' was current as an intermediate of the Edit chain, but as
        // a terminal it must re-execute.
        navigator.navigate_to(&user, "Details").unwrap();
        assert_eq!(taken(&journal), vec!["user-details:alice"]);
    }

    #[test]
    fn forced_refresh_resets_and_reexecutes_everything() {
        let journal = journal();
        let navigator = Navigator::new(Arc::new(user_registry(&journal)));
        let user = Fixture::new(vec!["User"], "alice").into_ref();

        navigator.navigate_to(&user, "Details").unwrap();
        journal.lock().clear();

        navigator.navigate_fresh(&user, "Details").unwrap();
        assert_eq!(
            taken(&journal),
            vec![
                "reset:user-all",
                "user-all:alice",
                "reset:user-details",
                "user-details:alice"
            ]
        );
    }

    #[test]
    fn step_failure_propagates_and_clears_the_cache() {
        let journal = journal();
        let mut registry = Registry::new();
        registry.register("User", "All", Recorder::step("user-all", Prerequisite::Root, &journal));
        registry.register(
            "User",
            "Details",
            Recorder::failing("user-details", Prerequisite::sibling("All"), &journal),
        );
        let navigator = Navigator::new(Arc::new(registry));
        let user = Fixture::new(vec!["User"], "alice").into_ref();

        let err = navigator.navigate_to(&user, "Details").unwrap_err();
        match &err {
            NavError::Step { destination, source, .. } => {
                assert_eq!(destination, "Details");
                assert_eq!(source.to_string(), "user-details blew up");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.step_source().unwrap().to_string(), "user-details blew up");
        assert_eq!(taken(&journal), vec!["user-all:alice"]);

        // The failed navigation left the session in an unknown place, so the
        // next one starts over from the root.
        journal.lock().clear();
        let _ = navigator.navigate_to(&user, "Details");
        assert_eq!(taken(&journal), vec!["user-all:alice"]);
    }

    #[test]
    fn args_reach_every_step() {
        struct ArgCheck {
            prereq: Prerequisite,
            journal: Journal,
        }

        impl NavStep for ArgCheck {
            fn prerequisite(&self) -> Prerequisite {
                self.prereq.clone()
            }

            fn execute(&self, _subject: &dyn Subject, args: &NavArgs) -> Result<Value, StepError> {
                self.journal
                    .lock()
                    .push(args.get_str("parent").unwrap_or("-").to_string());
                Ok(Value::Null)
            }
        }

        let journal = journal();
        let mut registry = Registry::new();
        registry.register(
            "Tenant",
            "All",
            ArgCheck { prereq: Prerequisite::Root, journal: Arc::clone(&journal) },
        );
        registry.register(
            "Tenant",
            "Add",
            ArgCheck { prereq: Prerequisite::sibling("All"), journal: Arc::clone(&journal) },
        );
        let navigator = Navigator::new(Arc::new(registry));
        let tenant = Fixture::new(vec!["Tenant"], "child").into_ref();

        let args = NavArgs::new().with("parent", "My Company");
        navigator.navigate_with(&tenant, "Add", &args, false).unwrap();
        assert_eq!(taken(&journal), vec!["My Company", "My Company"]);
    }
}
