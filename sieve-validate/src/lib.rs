//! Sieve Validate - Schema Validation
//!
//! Checks an editable filter tree against a [`sieve_core::FilterSchema`]
//! and reports every violation keyed by node id. Also provides
//! [`FilterEditor`], a headless editing session that keeps the tree, its
//! validation result and its wire form in sync.

pub mod editor;
pub mod validator;

pub use editor::{FilterEditor, ROOT_ID};
pub use validator::{
    check_type, parse_date, validate, validate_root, IssueKind, ValidationError, ValidationResult,
};
