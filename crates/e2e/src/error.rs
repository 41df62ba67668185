//! Error types for the E2E harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("Could not open browser session: {0}")]
    Session(String),

    #[error("WebDriver command failed: {0}")]
    WebDriver(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Cancelled while waiting for: {0}")]
    Cancelled(String),

    #[error("Message from {sender} contains no 6-digit verification code")]
    CodeNotInMessage { sender: String },

    #[error("Test spec parse error: {0}")]
    SpecParse(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<fantoccini::error::CmdError> for E2eError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        E2eError::WebDriver(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for E2eError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        E2eError::Session(err.to_string())
    }
}

impl E2eError {
    /// Whether this error came from a bounded wait running out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::Timeout(_))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
