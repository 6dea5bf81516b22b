//! Subjects: the domain objects being navigated to

use std::any::Any;
use std::sync::Arc;

use crate::error::StepError;

/// Shared handle to a subject. Attribute prerequisites produce new subjects
/// during chain construction, so subjects are handed around by `Arc`.
pub type SubjectRef = Arc<dyn Subject>;

/// A domain object with registered navigation destinations.
///
/// Rust has no inheritance to lean on for the base-type/subtype shadowing
/// rule, so each subject declares its ancestry explicitly: `type_chain()`
/// lists type names most-specific first, and the registry picks the first
/// name in the chain that has a step for the requested destination.
pub trait Subject: Send + Sync {
    /// Type names this subject answers to, most specific first.
    ///
    /// A plain type returns one entry (`["User"]`); a specialized one lists
    /// itself and then its bases (`["Ec2Instance", "Instance"]`).
    fn type_chain(&self) -> Vec<&'static str>;

    /// Stable identity attributes (name, parent scope, ...) used for the
    /// resolver's structural path equality. Two subjects with equal type and
    /// equal identity are "the same place" for caching and cycle detection.
    fn identity(&self) -> Vec<String>;

    /// Resolve one segment of an attribute prerequisite path to a related
    /// subject, e.g. `"server"` on an appliance. Dotted paths are split and
    /// resolved segment by segment by the resolver.
    fn related(&self, attribute: &str) -> Option<SubjectRef>;

    /// Destination used when an attribute prerequisite names none.
    /// Conventionally the type's listing page.
    fn default_destination(&self) -> &'static str {
        "All"
    }

    /// Concrete-type access for steps.
    fn as_any(&self) -> &dyn Any;
}

/// Downcast a subject to the concrete type a step was registered for.
///
/// Steps registered for a base type receive subtype instances too and should
/// try each concrete type in the subtype's chain (see the instance steps in
/// `stratus-model` for the pattern).
pub fn downcast_subject<T: 'static>(subject: &dyn Subject) -> Result<&T, StepError> {
    subject.as_any().downcast_ref::<T>().ok_or_else(|| {
        format!(
            "step expected subject type {}, got {}",
            std::any::type_name::<T>(),
            subject.type_chain().first().copied().unwrap_or("?"),
        )
        .into()
    })
}
