//! Editable filter tree
//!
//! The in-memory form mirrors the wire form, plus a [`NodeId`] on every node.
//! Every edit takes `&self` and returns a new value; nothing is mutated in
//! place. Applying a leaf edit means rebuilding each ancestor up to the root,
//! which [`GroupNode::update_group_at`] does for callers.

use crate::{Combinator, FilterSchema, NodeId, Operator, TreeError};
use serde_json::Value;

/// Editable leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionNode {
    pub id: NodeId,
    pub field: String,
    pub operator: Operator,
    pub value: Option<Value>,
}

/// Editable group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub id: NodeId,
    pub combinator: Combinator,
    pub children: Vec<TreeNode>,
}

/// Either kind of editable node.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Condition(ConditionNode),
    Group(GroupNode),
}

impl TreeNode {
    pub fn id(&self) -> &NodeId {
        match self {
            TreeNode::Condition(c) => &c.id,
            TreeNode::Group(g) => &g.id,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            TreeNode::Group(g) => Some(g),
            TreeNode::Condition(_) => None,
        }
    }

    pub fn as_condition(&self) -> Option<&ConditionNode> {
        match self {
            TreeNode::Condition(c) => Some(c),
            TreeNode::Group(_) => None,
        }
    }

    /// Structural equality that ignores node ids.
    pub fn same_shape(&self, other: &TreeNode) -> bool {
        match (self, other) {
            (TreeNode::Condition(a), TreeNode::Condition(b)) => a.same_shape(b),
            (TreeNode::Group(a), TreeNode::Group(b)) => a.same_shape(b),
            _ => false,
        }
    }
}

impl From<ConditionNode> for TreeNode {
    fn from(node: ConditionNode) -> Self {
        TreeNode::Condition(node)
    }
}

impl From<GroupNode> for TreeNode {
    fn from(node: GroupNode) -> Self {
        TreeNode::Group(node)
    }
}

// ============================================================================
// CONDITION EDITS
// ============================================================================

impl ConditionNode {
    /// New condition with operator `eq` and no value.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            field: field.into(),
            operator: Operator::Eq,
            value: None,
        }
    }

    pub fn with_field(&self, field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..self.clone()
        }
    }

    /// Change the operator. Clears the value.
    pub fn with_operator(&self, operator: Operator) -> Self {
        Self {
            operator,
            value: None,
            ..self.clone()
        }
    }

    pub fn with_value(&self, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..self.clone()
        }
    }

    pub fn without_value(&self) -> Self {
        Self {
            value: None,
            ..self.clone()
        }
    }

    /// Move to another field, keeping the operator only if the new field
    /// allows it. Falls back to the field's first operator, then `eq`.
    /// The value is always cleared.
    pub fn change_field(&self, schema: &FilterSchema, field: &str) -> Self {
        let allowed = schema.operators_for_name(field);
        let operator = if allowed.contains(&self.operator) {
            self.operator
        } else {
            allowed.first().copied().unwrap_or(Operator::Eq)
        };
        Self {
            id: self.id.clone(),
            field: field.to_string(),
            operator,
            value: None,
        }
    }

    pub fn same_shape(&self, other: &ConditionNode) -> bool {
        self.field == other.field && self.operator == other.operator && self.value == other.value
    }
}

// ============================================================================
// GROUP EDITS
// ============================================================================

impl Default for GroupNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl GroupNode {
    /// Empty AND group with a fresh id.
    pub fn empty() -> Self {
        Self::with_id(NodeId::generate())
    }

    /// Empty AND group with a caller-chosen id (e.g. a stable root key).
    pub fn with_id(id: NodeId) -> Self {
        Self {
            id,
            combinator: Combinator::And,
            children: Vec::new(),
        }
    }

    fn with_children(&self, children: Vec<TreeNode>) -> Self {
        Self {
            id: self.id.clone(),
            combinator: self.combinator,
            children,
        }
    }

    /// Append a condition on `default_field` with operator `eq` and no value.
    pub fn add_condition(&self, default_field: impl Into<String>) -> Self {
        let mut children = self.children.clone();
        children.push(ConditionNode::new(default_field).into());
        self.with_children(children)
    }

    /// Append an empty AND group.
    pub fn add_group(&self) -> Self {
        let mut children = self.children.clone();
        children.push(GroupNode::empty().into());
        self.with_children(children)
    }

    /// Replace `children[index]`. An out-of-range index is a caller bug.
    pub fn set_child(&self, index: usize, child: TreeNode) -> Result<Self, TreeError> {
        if index >= self.children.len() {
            return Err(TreeError::ChildIndexOutOfRange {
                group_id: self.id.clone(),
                index,
                len: self.children.len(),
            });
        }
        let mut children = self.children.clone();
        children[index] = child;
        Ok(self.with_children(children))
    }

    /// Remove `children[index]`; out of range returns an unchanged copy.
    pub fn remove_child(&self, index: usize) -> Self {
        let mut children = self.children.clone();
        if index < children.len() {
            children.remove(index);
        }
        self.with_children(children)
    }

    pub fn with_combinator(&self, combinator: Combinator) -> Self {
        Self {
            combinator,
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn same_shape(&self, other: &GroupNode) -> bool {
        self.combinator == other.combinator
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
    }

    // ------------------------------------------------------------------------
    // Path addressing: a path is a list of child indexes from this group.
    // ------------------------------------------------------------------------

    pub fn node_at(&self, path: &[usize]) -> Option<&TreeNode> {
        let (first, rest) = path.split_first()?;
        let child = self.children.get(*first)?;
        if rest.is_empty() {
            return Some(child);
        }
        child.as_group()?.node_at(rest)
    }

    /// Rebuild this group with the group at `path` replaced by `edit(group)`.
    /// An empty path edits this group itself.
    pub fn update_group_at<F>(&self, path: &[usize], edit: F) -> Result<Self, TreeError>
    where
        F: FnOnce(&GroupNode) -> Result<GroupNode, TreeError>,
    {
        let Some((first, rest)) = path.split_first() else {
            return edit(self);
        };
        let child = self
            .children
            .get(*first)
            .ok_or_else(|| TreeError::PathNotFound {
                path: path.to_vec(),
            })?;
        let group = match child {
            TreeNode::Group(group) => group,
            TreeNode::Condition(c) => {
                return Err(TreeError::NotAGroup {
                    node_id: c.id.clone(),
                })
            }
        };
        let updated = group.update_group_at(rest, edit)?;
        self.set_child(*first, updated.into())
    }

    /// Replace the node at a non-empty `path`.
    pub fn replace_at(&self, path: &[usize], node: TreeNode) -> Result<Self, TreeError> {
        let (last, parent) = path.split_last().ok_or(TreeError::PathNotFound { path: vec![] })?;
        self.update_group_at(parent, |group| {
            group.set_child(*last, node).map_err(|_| TreeError::PathNotFound {
                path: path.to_vec(),
            })
        })
    }

    /// Remove the node at a non-empty `path`.
    pub fn remove_at(&self, path: &[usize]) -> Result<Self, TreeError> {
        let (last, parent) = path.split_last().ok_or(TreeError::PathNotFound { path: vec![] })?;
        self.update_group_at(parent, |group| Ok(group.remove_child(*last)))
    }

    /// Path of the node with `id`; empty for this group itself.
    pub fn path_of(&self, id: &NodeId) -> Option<Vec<usize>> {
        if &self.id == id {
            return Some(Vec::new());
        }
        for (i, child) in self.children.iter().enumerate() {
            match child {
                TreeNode::Condition(c) if &c.id == id => return Some(vec![i]),
                TreeNode::Group(g) => {
                    if let Some(mut rest) = g.path_of(id) {
                        rest.insert(0, i);
                        return Some(rest);
                    }
                }
                TreeNode::Condition(_) => {}
            }
        }
        None
    }
}
