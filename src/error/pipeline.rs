/// Pipeline error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline configuration error: {0}")]
    ConfigurationError(String),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Pipeline wiring error: {0}")]
    WiringError(String),
    #[error("Extension '{name}' failed with: {stderr}")]
    ExtensionFailure { name: String, stderr: String },
    #[error("Stream error: {0}")]
    StreamError(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a new ConfigurationError
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a new InvalidAction error
    pub fn invalid_action(action: impl Into<String>) -> Self {
        Self::InvalidAction(action.into())
    }

    /// Create a new WiringError
    pub fn wiring_error(msg: impl Into<String>) -> Self {
        Self::WiringError(msg.into())
    }

    /// Create a new ExtensionFailure from the stage name and its captured stderr
    pub fn extension_failure(name: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExtensionFailure {
            name: name.into(),
            stderr: stderr.into(),
        }
    }

    /// Name of the failed stage, if this error belongs to one
    pub fn failed_extension(&self) -> Option<&str> {
        match self {
            Self::ExtensionFailure { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
