//! Enum types for filter schemas and trees

use crate::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// FIELD TYPES
// ============================================================================

/// Data type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
}

impl FieldType {
    pub const ALL: [FieldType; 4] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Date,
    ];

    /// Wire and config spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("field type", s))
    }
}

// ============================================================================
// OPERATORS
// ============================================================================

/// Comparison operator of a condition.
///
/// Which operators apply to which field type is decided by the schema,
/// not by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Contains,
    StartsWith,
    EndsWith,
    Gt,
    Lt,
    Gte,
    Lte,
    Between,
    Before,
    After,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub const ALL: [Operator; 16] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::Between,
        Operator::Before,
        Operator::After,
        Operator::In,
        Operator::NotIn,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::Between => "between",
            Operator::Before => "before",
            Operator::After => "after",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
        }
    }

    /// Human-readable label for pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Eq => "equals",
            Operator::Neq => "not equals",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts with",
            Operator::EndsWith => "ends with",
            Operator::Gt => "greater than",
            Operator::Lt => "less than",
            Operator::Gte => "greater than or equal",
            Operator::Lte => "less than or equal",
            Operator::Between => "between",
            Operator::Before => "before",
            Operator::After => "after",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
        }
    }

    /// False for the null checks, which never carry a value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// True for operators whose value is a list.
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::Between | Operator::In | Operator::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("operator", s))
    }
}

// ============================================================================
// COMBINATORS
// ============================================================================

/// Boolean join of a group's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    /// Wire key of a group using this combinator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Combinator::And => Combinator::Or,
            Combinator::Or => Combinator::And,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Combinator {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(Combinator::And),
            "or" => Ok(Combinator::Or),
            other => Err(ParseEnumError::new("combinator", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_wire_names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>(), Ok(op));
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.as_str()));
        }
    }

    #[test]
    fn test_operator_parse_rejects_unknown() {
        let err = "like".parse::<Operator>().unwrap_err();
        assert!(err.to_string().contains("like"));
    }

    #[test]
    fn test_null_operators_take_no_value() {
        assert!(!Operator::IsNull.takes_value());
        assert!(!Operator::IsNotNull.takes_value());
        assert!(Operator::Eq.takes_value());
        assert!(Operator::Between.takes_list());
        assert!(!Operator::Gt.takes_list());
    }

    #[test]
    fn test_operator_labels() {
        assert_eq!(Operator::Neq.label(), "not equals");
        assert_eq!(Operator::IsNotNull.label(), "is not null");
    }

    #[test]
    fn test_field_type_lowercase_spelling() {
        assert_eq!(serde_json::to_string(&FieldType::Boolean).unwrap(), "\"boolean\"");
        assert_eq!("date".parse::<FieldType>(), Ok(FieldType::Date));
        assert!("Date".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_combinator_default_and_toggle() {
        assert_eq!(Combinator::default(), Combinator::And);
        assert_eq!(Combinator::And.toggled(), Combinator::Or);
        assert_eq!("or".parse::<Combinator>(), Ok(Combinator::Or));
    }
}
