//! Error types for the test harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("server failed to start: {0}")]
    ServerStartup(String),

    #[error("server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("timed out waiting for: {0}")]
    Timeout(String),

    #[error(transparent)]
    Model(#[from] stratus_model::ModelError),

    #[error(transparent)]
    Nav(#[from] stratus_nav::NavError),

    #[error(transparent)]
    Ui(#[from] stratus_ui::UiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
