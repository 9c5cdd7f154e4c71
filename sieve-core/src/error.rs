//! Error types for Sieve operations

use crate::NodeId;
use thiserror::Error;

/// Error when parsing an enum from its wire spelling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Schema construction and loading errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field in schema: {name}")]
    DuplicateField { name: String },

    #[error("Failed to read schema {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse schema {format}: {reason}")]
    Parse { format: &'static str, reason: String },
}

/// Structural edit errors. These indicate a caller bug, not bad user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Child index {index} out of range for group {group_id} with {len} children")]
    ChildIndexOutOfRange {
        group_id: NodeId,
        index: usize,
        len: usize,
    },

    #[error("No node at path {path:?}")]
    PathNotFound { path: Vec<usize> },

    #[error("Node {node_id} is not a group")]
    NotAGroup { node_id: NodeId },
}

/// Wire-format errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Malformed filter at {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Invalid filter JSON: {reason}")]
    InvalidJson { reason: String },
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::InvalidJson {
            reason: err.to_string(),
        }
    }
}

/// Master error type for all Sieve core errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SieveError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),
}

/// Result type alias for Sieve operations.
pub type SieveResult<T> = Result<T, SieveError>;

// =============================================================================
// TESTS
// =============================================================================
