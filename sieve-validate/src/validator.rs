//! Tree validation against a schema
//!
//! A recursive descent that collects every violation instead of stopping at
//! the first one, so an editor can flag all offending nodes at once.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sieve_core::{
    ConditionNode, FieldDefinition, FieldType, FilterSchema, GroupNode, NodeId, Operator,
    TreeNode,
};

// ============================================================================
// VALIDATION TYPES
// ============================================================================

/// Category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Condition references a field the schema does not define
    UnknownField,
    /// Operator not in the field's resolved operator list
    OperatorNotAllowed,
    /// Value absent, null or empty string
    MissingValue,
    /// List value with the wrong number of elements
    WrongArity,
    /// Value does not fit the field type
    WrongType,
    /// Group without children
    EmptyGroup,
}

/// One violation, keyed to the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub node_id: NodeId,
    /// Field name; empty for group-level errors.
    pub field: String,
    pub message: String,
    pub kind: IssueKind,
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Errors attached to one node.
    pub fn errors_for<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| &e.node_id == node_id)
    }

    pub fn has_kind(&self, kind: IssueKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Validate any node and its subtree.
pub fn validate(node: &TreeNode, schema: &FilterSchema) -> ValidationResult {
    let mut errors = Vec::new();
    check_node(node, schema, &mut errors);
    ValidationResult::from_errors(errors)
}

/// Validate a whole filter tree.
pub fn validate_root(root: &GroupNode, schema: &FilterSchema) -> ValidationResult {
    let mut errors = Vec::new();
    check_group(root, schema, &mut errors);
    tracing::debug!(
        root_id = %root.id,
        error_count = errors.len(),
        "Validated filter tree"
    );
    ValidationResult::from_errors(errors)
}

fn check_node(node: &TreeNode, schema: &FilterSchema, errors: &mut Vec<ValidationError>) {
    match node {
        TreeNode::Condition(condition) => check_condition(condition, schema, errors),
        TreeNode::Group(group) => check_group(group, schema, errors),
    }
}

fn check_group(group: &GroupNode, schema: &FilterSchema, errors: &mut Vec<ValidationError>) {
    if group.children.is_empty() {
        errors.push(ValidationError {
            node_id: group.id.clone(),
            field: String::new(),
            message: "Group must have at least one condition or child group".to_string(),
            kind: IssueKind::EmptyGroup,
        });
        return;
    }
    for child in &group.children {
        check_node(child, schema, errors);
    }
}

fn check_condition(node: &ConditionNode, schema: &FilterSchema, errors: &mut Vec<ValidationError>) {
    let issue = |kind: IssueKind, message: String| ValidationError {
        node_id: node.id.clone(),
        field: node.field.clone(),
        message,
        kind,
    };

    // Without a field definition the remaining checks have nothing to go on.
    let Some(field) = schema.field(&node.field) else {
        errors.push(issue(
            IssueKind::UnknownField,
            format!("Field \"{}\" not found in schema", node.field),
        ));
        return;
    };

    if !schema.operators_for(field).contains(&node.operator) {
        errors.push(issue(
            IssueKind::OperatorNotAllowed,
            format!(
                "Operator \"{}\" not allowed for field type \"{}\"",
                node.operator, field.field_type
            ),
        ));
    }

    if let Some((kind, message)) = check_value(node.operator, node.value.as_ref(), field) {
        errors.push(issue(kind, message));
    }
}

// ============================================================================
// VALUE RULES
// ============================================================================

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn check_value(
    operator: Operator,
    value: Option<&Value>,
    field: &FieldDefinition,
) -> Option<(IssueKind, String)> {
    if !operator.takes_value() {
        return None;
    }

    let value = match value {
        Some(value) if !is_missing(Some(value)) => value,
        _ => {
            return Some((
                IssueKind::MissingValue,
                format!("Value is required for operator \"{}\"", operator),
            ))
        }
    };

    match operator {
        Operator::Between => match value.as_array() {
            Some(bounds) if bounds.len() == 2 => bounds
                .iter()
                .find_map(|bound| check_type(bound, field.field_type))
                .map(|message| (IssueKind::WrongType, message)),
            _ => Some((
                IssueKind::WrongArity,
                "Operator \"between\" requires exactly two values".to_string(),
            )),
        },
        // Elements of in/not_in lists are intentionally not type-checked.
        Operator::In | Operator::NotIn => match value.as_array() {
            Some(items) if !items.is_empty() => None,
            _ => Some((
                IssueKind::WrongArity,
                format!(
                    "Operator \"{}\" requires an array of at least one value",
                    operator
                ),
            )),
        },
        _ => check_type(value, field.field_type).map(|message| (IssueKind::WrongType, message)),
    }
}

/// Single-value type rule. Returns the error message on mismatch.
pub fn check_type(value: &Value, field_type: FieldType) -> Option<String> {
    match field_type {
        FieldType::String => (!value.is_string()).then(|| "Value must be a string".to_string()),
        FieldType::Number => match value {
            // serde_json numbers are always finite.
            Value::Number(_) | Value::Array(_) => None,
            _ => Some("Value must be a number".to_string()),
        },
        FieldType::Boolean => (!value.is_boolean()).then(|| "Value must be a boolean".to_string()),
        FieldType::Date => match value {
            Value::String(s) if parse_date(s) => None,
            Value::String(_) => Some("Value must be a valid date string".to_string()),
            _ => Some("Value must be a date".to_string()),
        },
    }
}

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// True if `s` names a real calendar date, with or without a time part.
pub fn parse_date(s: &str) -> bool {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s).is_ok()
        || DateTime::parse_from_rfc2822(s).is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(s, "%Y/%m/%d").is_ok()
        || DATE_TIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sieve_core::Combinator;

    fn schema() -> FilterSchema {
        FilterSchema::new(vec![
            FieldDefinition::new("age", "Age", FieldType::Number),
            FieldDefinition::new("email", "Email", FieldType::String),
            FieldDefinition::new("isActive", "Is Active", FieldType::Boolean),
            FieldDefinition::new("createdAt", "Created At", FieldType::Date),
        ])
        .unwrap()
    }

    fn condition(field: &str, operator: Operator, value: Option<Value>) -> ConditionNode {
        ConditionNode {
            id: NodeId::generate(),
            field: field.to_string(),
            operator,
            value,
        }
    }

    fn single(node: ConditionNode) -> GroupNode {
        GroupNode::empty().add_condition("").set_child(0, node.into()).unwrap()
    }

    fn messages(root: &GroupNode) -> Vec<String> {
        validate_root(root, &schema())
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    #[test]
    fn test_empty_group_single_error() {
        let root = GroupNode::empty();
        let result = validate_root(&root, &schema());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        let error = &result.errors[0];
        assert_eq!(error.node_id, root.id);
        assert_eq!(error.field, "");
        assert!(error.message.contains("at least one condition"));
        assert_eq!(error.kind, IssueKind::EmptyGroup);
    }

    #[test]
    fn test_unknown_field_stops_node_checks() {
        let root = single(condition("nope", Operator::Between, None));
        let result = validate_root(&root, &schema());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Field \"nope\" not found in schema");
        assert_eq!(result.errors[0].field, "nope");
    }

    #[test]
    fn test_disallowed_operator_and_bad_value_both_reported() {
        let root = single(condition("isActive", Operator::Gt, Some(json!("yes"))));
        assert_eq!(
            messages(&root),
            vec![
                "Operator \"gt\" not allowed for field type \"boolean\"".to_string(),
                "Value must be a boolean".to_string(),
            ]
        );
    }

    #[test]
    fn test_number_rejects_string() {
        let root = single(condition("age", Operator::Eq, Some(json!("abc"))));
        assert_eq!(messages(&root), vec!["Value must be a number".to_string()]);
    }

    #[test]
    fn test_missing_values() {
        for value in [None, Some(Value::Null), Some(json!(""))] {
            let root = single(condition("email", Operator::Contains, value));
            assert_eq!(
                messages(&root),
                vec!["Value is required for operator \"contains\"".to_string()]
            );
        }
    }

    #[test]
    fn test_null_checks_need_no_value() {
        let root = single(condition("email", Operator::IsNull, Some(json!(42))));
        assert!(validate_root(&root, &schema()).valid);
    }

    #[test]
    fn test_between_arity_and_types() {
        let ok = single(condition("age", Operator::Between, Some(json!([18, 65]))));
        assert!(validate_root(&ok, &schema()).valid);

        let short = single(condition("age", Operator::Between, Some(json!([30]))));
        assert_eq!(
            messages(&short),
            vec!["Operator \"between\" requires exactly two values".to_string()]
        );

        let scalar = single(condition("age", Operator::Between, Some(json!(30))));
        assert!(messages(&scalar)[0].contains("exactly two values"));

        let typed = single(condition("age", Operator::Between, Some(json!([1, "x"]))));
        assert_eq!(messages(&typed), vec!["Value must be a number".to_string()]);
    }

    #[test]
    fn test_in_requires_non_empty_list_without_element_checks() {
        let empty = single(condition("age", Operator::In, Some(json!([]))));
        assert_eq!(
            messages(&empty),
            vec!["Operator \"in\" requires an array of at least one value".to_string()]
        );

        let mixed = single(condition("age", Operator::NotIn, Some(json!(["a", true]))));
        assert!(validate_root(&mixed, &schema()).valid);
    }

    #[test]
    fn test_number_accepts_array_for_scalar_operator() {
        let root = single(condition("age", Operator::Eq, Some(json!([1, 2]))));
        assert!(validate_root(&root, &schema()).valid);
    }

    #[test]
    fn test_date_rules() {
        let valid = ["2024-01-31", "2024-01-31T10:00:00Z", "2024-01-31T10:00:00", "2024/02/29"];
        for text in valid {
            let root = single(condition("createdAt", Operator::After, Some(json!(text))));
            assert!(validate_root(&root, &schema()).valid, "{} should parse", text);
        }

        let bad = single(condition("createdAt", Operator::After, Some(json!("2023-02-30"))));
        assert_eq!(messages(&bad), vec!["Value must be a valid date string".to_string()]);

        let number = single(condition("createdAt", Operator::Before, Some(json!(17))));
        assert_eq!(messages(&number), vec!["Value must be a date".to_string()]);
    }

    #[test]
    fn test_errors_collected_across_subtrees() {
        let root = GroupNode::empty()
            .add_condition("missing")
            .add_group()
            .update_group_at(&[1], |g| Ok(g.with_combinator(Combinator::Or).add_group()))
            .unwrap();
        let result = validate_root(&root, &schema());
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].kind, IssueKind::UnknownField);
        assert_eq!(result.errors[1].kind, IssueKind::EmptyGroup);
        let nested_id = root.node_at(&[1, 0]).unwrap().id();
        assert_eq!(result.errors_for(nested_id).count(), 1);
    }

    #[test]
    fn test_validate_single_condition_node() {
        let node: TreeNode = condition("email", Operator::Eq, Some(json!("a@b.c"))).into();
        assert!(validate(&node, &schema()).valid);
    }

    #[test]
    fn test_error_serializes_camel_case() {
        let root = GroupNode::with_id(NodeId::new("root"));
        let json = serde_json::to_value(validate_root(&root, &schema())).unwrap();
        assert_eq!(json["errors"][0]["nodeId"], json!("root"));
        assert_eq!(json["errors"][0]["kind"], json!("empty_group"));
        assert_eq!(json["valid"], json!(false));
    }
}
