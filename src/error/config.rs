/// Extension configuration loading errors
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid extension entry '{key}': {message}")]
    InvalidEntry { key: String, message: String },
    #[error("Failed to query git config: {0}")]
    Git(String),
}

impl ConfigError {
    /// Create a new InvalidEntry error
    pub fn invalid_entry(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEntry {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
