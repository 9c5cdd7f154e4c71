//! Filter schema: fields, types and operator resolution
//!
//! A schema is static data. The only logic here is the operator lookup:
//! field override, then the schema's per-type table, then the built-in
//! defaults when the schema declares no table at all.

use crate::{FieldType, Operator, SchemaError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Operators allowed per field type.
pub type OperatorsByType = BTreeMap<FieldType, Vec<Operator>>;

/// Built-in operator table used when a schema declares none.
pub fn default_operators(field_type: FieldType) -> &'static [Operator] {
    use Operator::*;
    match field_type {
        FieldType::String => &[
            Eq, Neq, Contains, StartsWith, EndsWith, In, NotIn, IsNull, IsNotNull,
        ],
        FieldType::Number => &[
            Eq, Neq, Gt, Lt, Gte, Lte, Between, In, NotIn, IsNull, IsNotNull,
        ],
        FieldType::Boolean => &[Eq, Neq, IsNull, IsNotNull],
        FieldType::Date => &[Eq, Neq, Before, After, Between, IsNull, IsNotNull],
    }
}

/// The built-in table as an owned map.
pub fn default_operators_by_type() -> OperatorsByType {
    FieldType::ALL
        .into_iter()
        .map(|t| (t, default_operators(t).to_vec()))
        .collect()
}

// ============================================================================
// FIELD DEFINITION
// ============================================================================

/// A filterable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Overrides the schema's operators for this field when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<Vec<Operator>>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            operators: None,
        }
    }

    pub fn with_operators(mut self, operators: Vec<Operator>) -> Self {
        self.operators = Some(operators);
        self
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Ordered set of fields with unique names plus an optional operator table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct FilterSchema {
    fields: Vec<FieldDefinition>,
    #[serde(rename = "operatorsByType", skip_serializing_if = "Option::is_none")]
    operators_by_type: Option<OperatorsByType>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    fields: Vec<FieldDefinition>,
    #[serde(default, alias = "operatorsByType")]
    operators_by_type: Option<OperatorsByType>,
}

impl TryFrom<RawSchema> for FilterSchema {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        let schema = FilterSchema::new(raw.fields)?;
        Ok(match raw.operators_by_type {
            Some(table) => schema.with_operators_by_type(table),
            None => schema,
        })
    }
}

impl FilterSchema {
    /// Build a schema, rejecting duplicate field names.
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }
        Ok(Self {
            fields,
            operators_by_type: None,
        })
    }

    pub fn with_operators_by_type(mut self, table: OperatorsByType) -> Self {
        self.operators_by_type = Some(table);
        self
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn operators_by_type(&self) -> Option<&OperatorsByType> {
        self.operators_by_type.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field new conditions start on: the first field, or `""` when empty.
    pub fn default_field(&self) -> &str {
        self.fields.first().map(|f| f.name.as_str()).unwrap_or("")
    }

    /// Resolve the operators allowed for a field.
    ///
    /// A schema without `operatorsByType` falls back to the built-in table.
    /// The validator and the editor both resolve through here, so they
    /// always agree on what a field allows.
    pub fn operators_for<'a>(&'a self, field: &'a FieldDefinition) -> &'a [Operator] {
        if let Some(overrides) = field.operators.as_deref() {
            if !overrides.is_empty() {
                return overrides;
            }
        }
        match &self.operators_by_type {
            Some(table) => table
                .get(&field.field_type)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => default_operators(field.field_type),
        }
    }

    /// Resolve operators by field name; empty for unknown fields.
    pub fn operators_for_name(&self, name: &str) -> &[Operator] {
        self.field(name)
            .map(|f| self.operators_for(f))
            .unwrap_or(&[])
    }

    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(input).map_err(|e| SchemaError::Parse {
            format: "json",
            reason: e.to_string(),
        })
    }

    pub fn from_toml_str(input: &str) -> Result<Self, SchemaError> {
        toml::from_str(input).map_err(|e| SchemaError::Parse {
            format: "toml",
            reason: e.to_string(),
        })
    }

    /// Load from a `.toml` or `.json` file (by extension; JSON otherwise).
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> FilterSchema {
        FilterSchema::new(vec![
            FieldDefinition::new("age", "Age", FieldType::Number),
            FieldDefinition::new("email", "Email", FieldType::String)
                .with_operators(vec![Operator::Eq, Operator::EndsWith]),
            FieldDefinition::new("active", "Active", FieldType::Boolean).with_operators(vec![]),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = FilterSchema::new(vec![
            FieldDefinition::new("age", "Age", FieldType::Number),
            FieldDefinition::new("age", "Age again", FieldType::String),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                name: "age".to_string()
            }
        );
    }

    #[test]
    fn test_field_override_wins() {
        let schema = people();
        assert_eq!(
            schema.operators_for_name("email"),
            &[Operator::Eq, Operator::EndsWith]
        );
    }

    #[test]
    fn test_empty_override_falls_through_to_defaults() {
        let schema = people();
        assert_eq!(
            schema.operators_for_name("active"),
            default_operators(FieldType::Boolean)
        );
    }

    #[test]
    fn test_schema_table_replaces_defaults() {
        let mut table = OperatorsByType::new();
        table.insert(FieldType::Number, vec![Operator::Gt]);
        let schema = people().with_operators_by_type(table);
        assert_eq!(schema.operators_for_name("age"), &[Operator::Gt]);
        // Declared table without a boolean entry resolves to nothing.
        assert!(schema.operators_for_name("active").is_empty());
    }

    #[test]
    fn test_unknown_field_has_no_operators() {
        assert!(people().operators_for_name("nope").is_empty());
    }

    #[test]
    fn test_default_field() {
        assert_eq!(people().default_field(), "age");
        assert_eq!(FilterSchema::new(vec![]).unwrap().default_field(), "");
    }

    #[test]
    fn test_from_json_accepts_camel_case_table() {
        let schema = FilterSchema::from_json_str(
            r#"{
                "fields": [{"name": "year", "label": "Year", "type": "number"}],
                "operatorsByType": {"number": ["eq", "gt"]}
            }"#,
        )
        .unwrap();
        assert_eq!(schema.operators_for_name("year"), &[Operator::Eq, Operator::Gt]);
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let err = FilterSchema::from_json_str(
            r#"{"fields": [
                {"name": "a", "label": "A", "type": "string"},
                {"name": "a", "label": "A", "type": "string"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Parse { format: "json", .. }));
        assert!(err.to_string().contains("Duplicate field"));
    }

    #[test]
    fn test_from_toml() {
        let schema = FilterSchema::from_toml_str(
            r#"
[[fields]]
name = "model"
label = "Model"
type = "string"

[[fields]]
name = "year"
label = "Year"
type = "number"
operators = ["gt"]
"#,
        )
        .unwrap();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.operators_for_name("year"), &[Operator::Gt]);
        assert_eq!(
            schema.operators_for_name("model"),
            default_operators(FieldType::String)
        );
    }

    #[test]
    fn test_serialize_round_trip() {
        let schema = people().with_operators_by_type(default_operators_by_type());
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("operatorsByType"));
        let back = FilterSchema::from_json_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
