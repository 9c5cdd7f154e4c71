//! Wire format for filters
//!
//! The minimal JSON shape used in query strings and request bodies:
//!
//! ```text
//! Condition: {"field": "age", "operator": "gt", "value": 30}
//! Group:     {"and": [Filter, ...]}  or  {"or": [Filter, ...]}
//! ```
//!
//! Telling a group from a condition happens in exactly one place,
//! [`Filter::from_json`]. Everything past that boundary works on the enum.

use crate::{Combinator, FilterError, Operator};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A leaf test on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    /// Shape is checked by the validator, not here.
    pub value: Option<Value>,
}

/// Child filters joined by one combinator.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub combinator: Combinator,
    pub filters: Vec<Filter>,
}

/// A condition or a nested group.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Condition(Condition),
    Group(Group),
}

/// The top of a complete filter is always a group.
pub type FilterRoot = Group;

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: Option<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Condition with a value.
    pub fn with(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::new(field, operator, Some(value.into()))
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::IsNull, None)
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::IsNotNull, None)
    }
}

impl Group {
    pub fn new(combinator: Combinator, filters: Vec<Filter>) -> Self {
        Self {
            combinator,
            filters,
        }
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::new(Combinator::And, filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::new(Combinator::Or, filters)
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Filter::Condition(condition)
    }
}

impl From<Group> for Filter {
    fn from(group: Group) -> Self {
        Filter::Group(group)
    }
}

// ============================================================================
// TO JSON
// ============================================================================

impl Condition {
    /// `value` is omitted for null checks and when absent.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("field".to_string(), Value::String(self.field.clone()));
        object.insert(
            "operator".to_string(),
            Value::String(self.operator.as_str().to_string()),
        );
        if self.operator.takes_value() {
            if let Some(value) = &self.value {
                object.insert("value".to_string(), value.clone());
            }
        }
        Value::Object(object)
    }
}

impl Group {
    pub fn to_json(&self) -> Value {
        let children = self.filters.iter().map(Filter::to_json).collect();
        let mut object = Map::new();
        object.insert(self.combinator.as_str().to_string(), Value::Array(children));
        Value::Object(object)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Parse a filter root; a bare condition is rejected.
    pub fn from_json(value: &Value) -> Result<Self, FilterError> {
        match Filter::from_json(value)? {
            Filter::Group(group) => Ok(group),
            Filter::Condition(_) => Err(malformed(ROOT, "filter root must be a group")),
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, FilterError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json(&value)
    }
}

impl Filter {
    pub fn to_json(&self) -> Value {
        match self {
            Filter::Condition(condition) => condition.to_json(),
            Filter::Group(group) => group.to_json(),
        }
    }
}

// ============================================================================
// FROM JSON
// ============================================================================

const ROOT: &str = "$";

fn malformed(path: &str, reason: impl Into<String>) -> FilterError {
    FilterError::Malformed {
        path: path.to_string(),
        reason: reason.into(),
    }
}

impl Filter {
    /// Classify and parse a wire value.
    ///
    /// Objects with an `and` or `or` key are groups, any other object is a
    /// condition. Anything that fits neither shape is rejected with the
    /// path of the offending value.
    pub fn from_json(value: &Value) -> Result<Self, FilterError> {
        parse_filter(value, ROOT)
    }

    pub fn from_json_str(input: &str) -> Result<Self, FilterError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json(&value)
    }
}

fn parse_filter(value: &Value, path: &str) -> Result<Filter, FilterError> {
    let object = value
        .as_object()
        .ok_or_else(|| malformed(path, "expected an object"))?;

    match (object.get("and"), object.get("or")) {
        (Some(_), Some(_)) => Err(malformed(path, "group has both \"and\" and \"or\"")),
        (Some(children), None) => parse_group(Combinator::And, children, path).map(Filter::Group),
        (None, Some(children)) => parse_group(Combinator::Or, children, path).map(Filter::Group),
        (None, None) => parse_condition(object, path).map(Filter::Condition),
    }
}

fn parse_group(combinator: Combinator, children: &Value, path: &str) -> Result<Group, FilterError> {
    let key = combinator.as_str();
    let items = children
        .as_array()
        .ok_or_else(|| malformed(path, format!("\"{}\" must be an array", key)))?;

    let filters = items
        .iter()
        .enumerate()
        .map(|(i, child)| parse_filter(child, &format!("{}.{}[{}]", path, key, i)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Group::new(combinator, filters))
}

fn parse_condition(object: &Map<String, Value>, path: &str) -> Result<Condition, FilterError> {
    let field = match object.get("field") {
        Some(Value::String(field)) => field.clone(),
        Some(_) => return Err(malformed(path, "\"field\" must be a string")),
        None => return Err(malformed(path, "missing \"field\"")),
    };

    let operator = match object.get("operator") {
        Some(Value::String(op)) => op
            .parse::<Operator>()
            .map_err(|e| malformed(path, e.to_string()))?,
        Some(_) => return Err(malformed(path, "\"operator\" must be a string")),
        None => return Err(malformed(path, "missing \"operator\"")),
    };

    Ok(Condition {
        field,
        operator,
        value: object.get("value").cloned(),
    })
}

// ============================================================================
// SERDE
// ============================================================================

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Filter::from_json(&value).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Group {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Group::from_json(&value).map_err(D::Error::custom)
    }
}
