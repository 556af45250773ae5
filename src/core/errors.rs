//! Error types for the rig-naming library.
//!
//! Naming failures fall into two families. Configuration errors are raised while a
//! convention is compiled or a [`Manager`](crate::naming::Manager) is constructed and
//! are always fatal. Validation errors are raised by individual operations
//! (`build`, `update`, `resolve`, `get_token_value`) and carry enough text to name
//! the offending token, value or limit.

use std::io;

use thiserror::Error;

/// Main result type for naming operations.
pub type Result<T> = std::result::Result<T, NamingError>;

/// Error type for all naming operations.
#[derive(Error, Debug)]
pub enum NamingError {
    /// Invalid convention configuration (bad separator, duplicate tokens, unknown rule kind, ...)
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Token or configuration key that caused the error
        field: Option<String>,
    },

    /// A name or token value failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Token that failed validation
        field: Option<String>,
        /// Expected value or limit
        expected: Option<String>,
        /// Actual value received
        actual: Option<String>,
    },

    /// I/O errors while reading convention files
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being decoded
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl NamingError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error naming the offending token or key
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            expected: None,
            actual: None,
        }
    }

    /// Create a new validation error naming the offending token
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
            expected: None,
            actual: None,
        }
    }

    /// Create a validation error describing a limit that was exceeded
    pub fn limit_exceeded(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            expected: Some(expected.into()),
            actual: Some(actual.into()),
        }
    }

    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// True for errors raised while compiling or constructing a convention
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// True for errors raised by a naming operation on otherwise valid configuration
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// The token or key the error refers to, when one was recorded
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Config { field, .. } | Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

impl From<io::Error> for NamingError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for NamingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON deserialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for NamingError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML deserialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<regex::Error> for NamingError {
    fn from(err: regex::Error) -> Self {
        Self::config(format!("Invalid regular expression: {err}"))
    }
}
