//! Error types for filter transport

use sieve_core::FilterError;
use thiserror::Error;

/// Failure to recover a filter from a query string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The parameter is absent or empty.
    #[error("Query parameter \"{param}\" not found")]
    NotFound { param: String },

    #[error("Invalid filter JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("Malformed filter at {path}: {reason}")]
    Malformed { path: String, reason: String },
}

impl From<FilterError> for DecodeError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidJson { reason } => DecodeError::InvalidJson { reason },
            FilterError::Malformed { path, reason } => DecodeError::Malformed { path, reason },
        }
    }
}

/// Failure while sending a filter to a server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl TransportError {
    /// Response status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Http(err) => err.status().map(|s| s.as_u16()),
            TransportError::Serde(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or SIEVE_CONFIG)")]
    MissingConfigPath,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
