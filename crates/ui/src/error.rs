//! Error types for the UI session layer

use thiserror::Error;

pub type UiResult<T> = Result<T, UiError>;

#[derive(Error, Debug)]
pub enum UiError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("driver protocol error: {0}")]
    Driver(String),

    #[error("browser script error: {0}")]
    Script(String),

    #[error("no element matching '{selector}'")]
    CandidateNotFound { selector: String },

    #[error("timed out waiting for '{selector}'")]
    Timeout { selector: String },

    #[error("form '{form}' has no field '{field}'")]
    UnknownField { form: String, field: String },

    #[error("expected flash message '{expected}', got: {got:?}")]
    FlashMismatch { expected: String, got: Vec<String> },

    #[error("flash error messages present: {0:?}")]
    FlashErrors(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UiError {
    /// Whether this error means "the thing is not there" rather than "the
    /// session broke". `exists`-style probes map this class to `false`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UiError::CandidateNotFound { .. })
    }
}
