//! Configuration errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A base or override source is missing or unreadable.
    #[error("Could not load HAPI properties from {source_name}")]
    Load {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid HAPI properties in {source_name}: {message}")]
    Parse { source_name: String, message: String },

    /// A configured value does not convert to the parameter's declared type.
    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue { key: String, value: String, expected: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: &str, expected: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}
