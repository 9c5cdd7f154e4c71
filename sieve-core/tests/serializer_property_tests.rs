//! Property-Based Tests for Tree/Wire Round-Trip
//!
//! For any tree built through the edit operations, serializing and then
//! deserializing SHALL produce a tree of the same shape, and the wire JSON
//! SHALL survive a text round trip unchanged.

use proptest::prelude::*;
use serde_json::{json, Value};
use sieve_core::{deserialize_root, serialize_root, FilterRoot, NodeId};
use sieve_test_utils::assertions::{assert_malformed, assert_same_shape};
use sieve_test_utils::fixtures::users_example_filter;
use sieve_test_utils::generators::{arb_filter_root, arb_tree};
use sieve_test_utils::{Filter, Operator};

fn conditions(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Object(map) if map.contains_key("field") => out.push(value.clone()),
        Value::Object(map) => {
            for children in map.values().filter_map(Value::as_array) {
                for child in children {
                    conditions(child, out);
                }
            }
        }
        _ => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn tree_round_trips_through_wire(tree in arb_tree()) {
        let wire = serialize_root(&tree);
        let rebuilt = deserialize_root(&wire, Some(tree.id.clone()));
        assert_same_shape(&rebuilt, &tree);
        prop_assert_eq!(&rebuilt.id, &tree.id);
    }

    #[test]
    fn wire_json_round_trips_through_text(root in arb_filter_root()) {
        let text = root.to_json_string();
        let parsed = FilterRoot::from_json_str(&text).unwrap();
        prop_assert_eq!(parsed, root);
    }

    #[test]
    fn null_checks_never_carry_a_value(root in arb_filter_root()) {
        let mut found = Vec::new();
        conditions(&root.to_json(), &mut found);
        for condition in found {
            let operator: Operator = condition["operator"].as_str().unwrap().parse().unwrap();
            if !operator.takes_value() {
                prop_assert!(condition.get("value").is_none());
            }
            let keys = condition.as_object().unwrap().len();
            prop_assert!(keys == 2 || keys == 3);
        }
    }

    #[test]
    fn deserialized_ids_are_fresh(root in arb_filter_root()) {
        let a = deserialize_root(&root, None);
        let b = deserialize_root(&root, None);
        prop_assert_ne!(a.id, b.id);
    }

    #[test]
    fn non_object_root_is_rejected(n in any::<i64>()) {
        assert_malformed(&FilterRoot::from_json(&json!(n)));
        assert_malformed(&Filter::from_json(&json!([n])));
    }
}

#[test]
fn example_filter_keeps_nesting_and_order() {
    let root = users_example_filter();
    let tree = deserialize_root(&root, Some(NodeId::new("root")));
    assert_eq!(tree.id.as_str(), "root");
    assert_eq!(tree.children.len(), 2);
    assert!(tree.children[0].as_condition().is_some());
    let nested = tree.children[1].as_group().unwrap();
    assert_eq!(nested.children.len(), 2);
    assert_eq!(serialize_root(&tree), root);
}

#[test]
fn malformed_inputs_point_at_offender() {
    let cases = [
        json!({"and": [{"field": "age"}]}),
        json!({"and": [1]}),
        json!({"and": [], "or": []}),
        json!({"or": {"field": "a", "operator": "eq"}}),
        json!({"and": [{"field": 3, "operator": "eq"}]}),
        json!({"and": [{"field": "a", "operator": "like"}]}),
    ];
    for case in cases {
        assert_malformed(&FilterRoot::from_json(&case));
    }
}
