//! Mapping between the editable tree and the wire format
//!
//! `serialize` drops node ids and `deserialize` mints fresh ones, so
//! `deserialize(serialize(t))` has the same shape as `t` but new ids.

use crate::{
    Condition, ConditionNode, Filter, FilterError, FilterRoot, Group, GroupNode, NodeId, TreeNode,
};
use serde_json::Value;

/// Convert any tree node to its wire form.
pub fn serialize(node: &TreeNode) -> Filter {
    match node {
        TreeNode::Condition(condition) => Filter::Condition(serialize_condition(condition)),
        TreeNode::Group(group) => Filter::Group(serialize_group(group)),
    }
}

/// Convert the root group to a [`FilterRoot`].
pub fn serialize_root(root: &GroupNode) -> FilterRoot {
    serialize_group(root)
}

fn serialize_condition(node: &ConditionNode) -> Condition {
    let value = if node.operator.takes_value() {
        node.value.clone()
    } else {
        None
    };
    Condition::new(node.field.clone(), node.operator, value)
}

fn serialize_group(node: &GroupNode) -> Group {
    Group::new(
        node.combinator,
        node.children.iter().map(serialize).collect(),
    )
}

/// Rebuild a tree from its wire form. Every node gets a fresh id, except
/// the top node, which takes `root_id` when given.
pub fn deserialize(filter: &Filter, root_id: Option<NodeId>) -> TreeNode {
    match filter {
        Filter::Condition(condition) => TreeNode::Condition(ConditionNode {
            id: root_id.unwrap_or_else(NodeId::generate),
            field: condition.field.clone(),
            operator: condition.operator,
            value: condition.value.clone(),
        }),
        Filter::Group(group) => TreeNode::Group(deserialize_root(group, root_id)),
    }
}

/// Rebuild the root group from a [`FilterRoot`].
pub fn deserialize_root(root: &FilterRoot, root_id: Option<NodeId>) -> GroupNode {
    GroupNode {
        id: root_id.unwrap_or_else(NodeId::generate),
        combinator: root.combinator,
        children: root.filters.iter().map(|f| deserialize(f, None)).collect(),
    }
}

/// Parse raw wire JSON straight into a root group.
pub fn deserialize_root_json(value: &Value, root_id: Option<NodeId>) -> Result<GroupNode, FilterError> {
    let root = Group::from_json(value)?;
    Ok(deserialize_root(&root, root_id))
}
