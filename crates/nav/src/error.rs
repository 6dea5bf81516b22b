//! Error types for navigation resolution

use thiserror::Error;

/// Errors raised by an individual step's `execute`/`reset`. Steps own their
/// error types (UI timeouts, missing elements); the resolver passes them
/// through without interpretation.
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for resolver operations
pub type NavResult<T> = Result<T, NavError>;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("no destination '{destination}' registered for type {subject_type} or any ancestor")]
    DestinationNotFound {
        subject_type: String,
        destination: String,
    },

    #[error("prerequisite cycle while resolving '{destination}': {}", path.join(" -> "))]
    PrerequisiteCycle {
        destination: String,
        path: Vec<String>,
    },

    #[error("subject {subject_type} has no related subject at '{segment}' (attribute path '{path}')")]
    AttributeNotFound {
        subject_type: String,
        path: String,
        segment: String,
    },

    #[error("step for '{destination}' on {subject_type} failed")]
    Step {
        subject_type: String,
        destination: String,
        #[source]
        source: StepError,
    },
}

impl NavError {
    /// The underlying step error, if this failure came out of a step's
    /// `execute`/`reset`. Callers that want "exists"-style probes downcast
    /// this to their session's error type.
    pub fn step_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            NavError::Step { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
