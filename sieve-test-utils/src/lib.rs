//! Sieve Test Utilities
//!
//! Shared test infrastructure for the Sieve workspace:
//! - Proptest generators for operators, values and whole filter trees
//! - Fixture schemas and example filters
//! - Assertions for tree shape and validation results

pub use sieve_core::{
    Combinator, Condition, ConditionNode, FieldDefinition, FieldType, Filter, FilterError,
    FilterRoot, FilterSchema, Group, GroupNode, NodeId, Operator, OperatorsByType, TreeNode,
};
pub use sieve_validate::{ValidationError, ValidationResult};

use serde_json::Value;

// ============================================================================
// TREE RECIPES
// ============================================================================

/// Description of a tree, built into a [`GroupNode`] only through the
/// public edit operations so generated trees are reachable by real editors.
#[derive(Debug, Clone)]
pub enum TreeRecipe {
    Condition {
        field: String,
        operator: Operator,
        value: Option<Value>,
    },
    Group {
        combinator: Combinator,
        children: Vec<TreeRecipe>,
    },
}

/// Build a root group from a combinator and child recipes.
pub fn build_root(combinator: Combinator, children: &[TreeRecipe]) -> GroupNode {
    let mut group = GroupNode::empty().with_combinator(combinator);
    for child in children {
        group = append_recipe(&group, child);
    }
    group
}

fn append_recipe(group: &GroupNode, recipe: &TreeRecipe) -> GroupNode {
    match recipe {
        TreeRecipe::Condition {
            field,
            operator,
            value,
        } => {
            let appended = group.add_condition(field.clone());
            let index = appended.children.len() - 1;
            let condition = appended.children[index]
                .as_condition()
                .expect("add_condition appends a condition")
                .with_operator(*operator);
            let condition = match value {
                Some(value) => condition.with_value(value.clone()),
                None => condition,
            };
            appended
                .set_child(index, condition.into())
                .expect("index of appended child is in range")
        }
        TreeRecipe::Group {
            combinator,
            children,
        } => {
            let appended = group.add_group();
            let index = appended.children.len() - 1;
            let mut inner = appended.children[index]
                .as_group()
                .expect("add_group appends a group")
                .with_combinator(*combinator);
            for child in children {
                inner = append_recipe(&inner, child);
            }
            appended
                .set_child(index, inner.into())
                .expect("index of appended child is in range")
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Sieve types.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_field_type() -> impl Strategy<Value = FieldType> {
        prop_oneof![
            Just(FieldType::String),
            Just(FieldType::Number),
            Just(FieldType::Boolean),
            Just(FieldType::Date),
        ]
    }

    pub fn arb_operator() -> impl Strategy<Value = Operator> {
        proptest::sample::select(Operator::ALL.to_vec())
    }

    pub fn arb_combinator() -> impl Strategy<Value = Combinator> {
        prop_oneof![Just(Combinator::And), Just(Combinator::Or)]
    }

    pub fn arb_field_name() -> impl Strategy<Value = String> {
        "[a-z][a-zA-Z0-9_]{0,11}"
    }

    /// JSON scalar that survives a text round trip unchanged.
    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            "[ -~]{0,12}".prop_map(Value::String),
            any::<i64>().prop_map(Value::from),
            // quarter steps print and parse back exactly
            (-4_000_000i64..4_000_000).prop_map(|n| Value::from(n as f64 / 4.0)),
            any::<bool>().prop_map(Value::Bool),
        ]
    }

    /// A value shaped for the operator: none for null checks, a pair for
    /// `between`, a list for `in`/`not_in`, a scalar otherwise.
    pub fn arb_value_for(operator: Operator) -> BoxedStrategy<Option<Value>> {
        match operator {
            Operator::IsNull | Operator::IsNotNull => Just(None).boxed(),
            Operator::Between => (arb_scalar(), arb_scalar())
                .prop_map(|(a, b)| Some(Value::Array(vec![a, b])))
                .boxed(),
            Operator::In | Operator::NotIn => prop::collection::vec(arb_scalar(), 1..5)
                .prop_map(|items| Some(Value::Array(items)))
                .boxed(),
            _ => prop::option::of(arb_scalar()).boxed(),
        }
    }

    pub fn arb_condition_recipe() -> impl Strategy<Value = TreeRecipe> {
        (arb_field_name(), arb_operator()).prop_flat_map(|(field, operator)| {
            arb_value_for(operator).prop_map(move |value| TreeRecipe::Condition {
                field: field.clone(),
                operator,
                value,
            })
        })
    }

    pub fn arb_recipe() -> impl Strategy<Value = TreeRecipe> {
        arb_condition_recipe().prop_recursive(3, 32, 4, |inner| {
            (arb_combinator(), prop::collection::vec(inner, 0..4)).prop_map(
                |(combinator, children)| TreeRecipe::Group {
                    combinator,
                    children,
                },
            )
        })
    }

    /// Root group built through the edit operations.
    pub fn arb_tree() -> impl Strategy<Value = GroupNode> {
        (arb_combinator(), prop::collection::vec(arb_recipe(), 0..5))
            .prop_map(|(combinator, children)| build_root(combinator, &children))
    }

    /// Wire filter root.
    pub fn arb_filter_root() -> impl Strategy<Value = FilterRoot> {
        arb_tree().prop_map(|tree| sieve_core::serialize_root(&tree))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Example schemas and filters.

    use super::*;
    use serde_json::json;

    fn table(entries: [(FieldType, Vec<Operator>); 4]) -> OperatorsByType {
        entries.into_iter().collect()
    }

    /// Users: age, email, role, isActive, createdAt, score.
    pub fn users_schema() -> FilterSchema {
        use Operator::*;
        FilterSchema::new(vec![
            FieldDefinition::new("age", "Age", FieldType::Number),
            FieldDefinition::new("email", "Email", FieldType::String),
            FieldDefinition::new("role", "Role", FieldType::String),
            FieldDefinition::new("isActive", "Is Active", FieldType::Boolean),
            FieldDefinition::new("createdAt", "Created At", FieldType::Date),
            FieldDefinition::new("score", "Score", FieldType::Number),
        ])
        .expect("users schema has unique fields")
        .with_operators_by_type(table([
            (
                FieldType::String,
                vec![Eq, Neq, Contains, StartsWith, EndsWith, In, NotIn, IsNull, IsNotNull],
            ),
            (
                FieldType::Number,
                vec![Eq, Neq, Gt, Lt, Gte, Lte, Between, In, NotIn, IsNull, IsNotNull],
            ),
            (FieldType::Boolean, vec![Eq, Neq, IsNull, IsNotNull]),
            (
                FieldType::Date,
                vec![Eq, Neq, Before, After, Between, IsNull, IsNotNull],
            ),
        ]))
    }

    pub fn users_example_filter() -> FilterRoot {
        FilterRoot::from_json(&json!({
            "and": [
                {"field": "age", "operator": "gt", "value": 30},
                {"or": [
                    {"field": "role", "operator": "eq", "value": "admin"},
                    {"field": "isActive", "operator": "eq", "value": true}
                ]}
            ]
        }))
        .expect("users example is well formed")
    }

    /// Products: narrower operator table without null checks.
    pub fn products_schema() -> FilterSchema {
        use Operator::*;
        FilterSchema::new(vec![
            FieldDefinition::new("name", "Product Name", FieldType::String),
            FieldDefinition::new("price", "Price", FieldType::Number),
            FieldDefinition::new("category", "Category", FieldType::String),
            FieldDefinition::new("inStock", "In Stock", FieldType::Boolean),
            FieldDefinition::new("releaseDate", "Release Date", FieldType::Date),
            FieldDefinition::new("rating", "Rating", FieldType::Number),
        ])
        .expect("products schema has unique fields")
        .with_operators_by_type(table([
            (
                FieldType::String,
                vec![Eq, Neq, Contains, StartsWith, EndsWith, In, NotIn],
            ),
            (FieldType::Number, vec![Eq, Neq, Gt, Lt, Gte, Lte, Between]),
            (FieldType::Boolean, vec![Eq, Neq]),
            (FieldType::Date, vec![Eq, Neq, Before, After, Between]),
        ]))
    }

    pub fn products_example_filter() -> FilterRoot {
        FilterRoot::from_json(&json!({
            "and": [
                {"field": "price", "operator": "between", "value": [10, 100]},
                {"field": "inStock", "operator": "eq", "value": true},
                {"or": [
                    {"field": "category", "operator": "eq", "value": "electronics"},
                    {"field": "category", "operator": "eq", "value": "books"}
                ]}
            ]
        }))
        .expect("products example is well formed")
    }

    /// Cars: two fields, empty boolean/date tables.
    pub fn cars_schema() -> FilterSchema {
        use Operator::*;
        FilterSchema::new(vec![
            FieldDefinition::new("model", "Model", FieldType::String),
            FieldDefinition::new("year", "Year", FieldType::Number),
        ])
        .expect("cars schema has unique fields")
        .with_operators_by_type(table([
            (FieldType::String, vec![Eq, Neq, Contains, EndsWith]),
            (FieldType::Number, vec![Eq, Neq, Gt]),
            (FieldType::Boolean, vec![]),
            (FieldType::Date, vec![]),
        ]))
    }

    pub fn cars_example_filter() -> FilterRoot {
        FilterRoot::from_json(&json!({
            "and": [
                {"field": "model", "operator": "eq", "value": "Hyundai"},
                {"field": "year", "operator": "gt", "value": 2019}
            ]
        }))
        .expect("cars example is well formed")
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for Sieve-specific checks.

    use super::*;

    /// Assert two groups match ignoring node ids.
    #[track_caller]
    pub fn assert_same_shape(actual: &GroupNode, expected: &GroupNode) {
        assert!(
            actual.same_shape(expected),
            "Trees differ in shape:\n actual: {:?}\n expected: {:?}",
            sieve_core::serialize_root(actual).to_json(),
            sieve_core::serialize_root(expected).to_json(),
        );
    }

    #[track_caller]
    pub fn assert_valid(result: &ValidationResult) {
        assert!(result.valid, "Expected valid, got errors: {:?}", result.errors);
    }

    /// Assert exactly one issue exists and its message contains `needle`.
    #[track_caller]
    pub fn assert_single_issue(result: &ValidationResult, needle: &str) -> ValidationError {
        assert!(!result.valid, "Expected invalid result");
        assert_eq!(result.errors.len(), 1, "Expected one issue, got: {:?}", result.errors);
        let issue = result.errors[0].clone();
        assert!(
            issue.message.contains(needle),
            "Issue {:?} does not mention {:?}",
            issue.message,
            needle
        );
        issue
    }

    #[track_caller]
    pub fn assert_malformed<T: std::fmt::Debug>(result: &Result<T, FilterError>) {
        match result {
            Err(FilterError::Malformed { .. }) => {}
            other => panic!("Expected Malformed error, got: {:?}", other),
        }
    }
}
