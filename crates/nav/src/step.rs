//! Navigation steps, prerequisites, and the values that flow through them

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StepError;
use crate::subject::Subject;

/// The destination that must be current before a step may execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerequisite {
    /// No prerequisite; this step starts a chain.
    Root,

    /// Another destination on the same subject.
    Sibling(String),

    /// A destination on a related subject, reached through a dotted
    /// attribute path from the current subject (e.g. `appliance.server`).
    /// `destination: None` means the related subject's default destination.
    Attribute {
        path: String,
        destination: Option<String>,
    },
}

impl Prerequisite {
    pub fn sibling(name: impl Into<String>) -> Self {
        Prerequisite::Sibling(name.into())
    }

    /// Attribute prerequisite targeting the related subject's default
    /// destination.
    pub fn attribute(path: impl Into<String>) -> Self {
        Prerequisite::Attribute {
            path: path.into(),
            destination: None,
        }
    }

    /// Attribute prerequisite targeting a named destination on the related
    /// subject.
    pub fn attribute_to(path: impl Into<String>, destination: impl Into<String>) -> Self {
        Prerequisite::Attribute {
            path: path.into(),
            destination: Some(destination.into()),
        }
    }
}

/// One registered navigation action for a `(subject type, destination)` pair.
///
/// `execute` assumes the prerequisite destination is already current and
/// performs the UI transition for this one hop, returning the page payload
/// the resolver wraps into the terminal [`ViewHandle`]. Steps must not catch
/// and retry their own infrastructure failures; retry policy belongs to the
/// calling test layer.
pub trait NavStep: Send + Sync {
    fn prerequisite(&self) -> Prerequisite;

    fn execute(&self, subject: &dyn Subject, args: &NavArgs) -> Result<Value, StepError>;

    /// Invalidate any cached view state for this destination. Called before
    /// `execute` when the caller requests a forced refresh.
    fn reset(&self, subject: &dyn Subject) -> Result<(), StepError> {
        let _ = subject;
        Ok(())
    }
}

/// Free-form keyword context forwarded to every step in a resolution path.
/// Used for parameterized destinations (e.g. adding under a chosen parent).
#[derive(Debug, Clone, Default)]
pub struct NavArgs {
    values: HashMap<String, Value>,
}

impl NavArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Opaque result of a successful navigation: the page/state now current.
/// The `data` payload's shape is owned by the page-object layer that
/// produced it, not by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewHandle {
    subject_type: String,
    destination: String,
    data: Value,
}

impl ViewHandle {
    pub(crate) fn new(subject_type: &str, destination: &str, data: Value) -> Self {
        Self {
            subject_type: subject_type.to_string(),
            destination: destination.to_string(),
            data,
        }
    }

    pub fn subject_type(&self) -> &str {
        &self.subject_type
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}
