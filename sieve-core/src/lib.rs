//! Sieve Core - Filter Model
//!
//! Schema description, the editable filter tree, and the JSON wire format
//! it serializes to. Validation lives in `sieve-validate`; transport
//! encoding lives in `sieve-http`.
//!
//! ```text
//! FilterSchema ──► GroupNode (editable, with ids)
//!                     │  serialize / deserialize
//!                     ▼
//!                  FilterRoot (wire JSON)
//! ```

pub mod enums;
pub mod error;
pub mod identity;
pub mod input;
pub mod schema;
pub mod serializer;
pub mod tree;
pub mod wire;

pub use enums::{Combinator, FieldType, Operator};
pub use error::{FilterError, ParseEnumError, SchemaError, SieveError, SieveResult, TreeError};
pub use identity::NodeId;
pub use input::{between_value, display_value, parse_list_input, parse_scalar_input};
pub use schema::{
    default_operators, default_operators_by_type, FieldDefinition, FilterSchema, OperatorsByType,
};
pub use serializer::{deserialize, deserialize_root, deserialize_root_json, serialize, serialize_root};
pub use tree::{ConditionNode, GroupNode, TreeNode};
pub use wire::{Condition, Filter, FilterRoot, Group};
