//! Error types for the domain model layer

use thiserror::Error;

use stratus_nav::NavError;
use stratus_rest::RestError;
use stratus_ui::UiError;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("navigation failed: {0}")]
    Nav(#[from] NavError),

    #[error("UI error: {0}")]
    Ui(#[from] UiError),

    #[error("REST error: {0}")]
    Rest(#[from] RestError),

    #[error("invalid operation: {0}")]
    Invalid(String),
}

impl ModelError {
    /// Whether this failure means "the entity is not in the UI" rather than
    /// "the session broke". Used by `exists` probes.
    pub fn is_not_found(&self) -> bool {
        match self {
            ModelError::Ui(ui) => ui.is_not_found(),
            ModelError::Nav(nav) => nav
                .step_source()
                .and_then(|source| source.downcast_ref::<UiError>())
                .map(UiError::is_not_found)
                .unwrap_or(false),
            _ => false,
        }
    }
}
