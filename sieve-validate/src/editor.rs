//! Headless filter editing session
//!
//! Holds a schema and the current root, applies pure tree edits, and keeps
//! the validation result and serialized filter in sync with the tree.

use crate::validator::{validate_root, ValidationResult};
use sieve_core::{
    deserialize_root, serialize_root, FilterRoot, FilterSchema, GroupNode, NodeId, TreeError,
};
use std::fmt;

/// Id given to the root group of every editor session.
pub const ROOT_ID: &str = "root";

type ChangeListener = Box<dyn FnMut(&FilterRoot, bool) + Send>;

pub struct FilterEditor {
    schema: FilterSchema,
    root: GroupNode,
    filter: FilterRoot,
    validation: ValidationResult,
    listener: Option<ChangeListener>,
}

impl fmt::Debug for FilterEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEditor")
            .field("root", &self.root)
            .field("valid", &self.validation.valid)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl FilterEditor {
    /// Session with an empty root group.
    pub fn new(schema: FilterSchema) -> Self {
        Self::from_root(schema, GroupNode::with_id(NodeId::new(ROOT_ID)))
    }

    /// Session seeded from an existing wire filter.
    pub fn with_initial(schema: FilterSchema, initial: &FilterRoot) -> Self {
        let root = deserialize_root(initial, Some(NodeId::new(ROOT_ID)));
        Self::from_root(schema, root)
    }

    fn from_root(schema: FilterSchema, root: GroupNode) -> Self {
        let filter = serialize_root(&root);
        let validation = validate_root(&root, &schema);
        Self {
            schema,
            root,
            filter,
            validation,
            listener: None,
        }
    }

    /// Register a callback invoked with `(filter, valid)` after every change.
    pub fn on_change<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&FilterRoot, bool) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    pub fn root(&self) -> &GroupNode {
        &self.root
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn filter(&self) -> &FilterRoot {
        &self.filter
    }

    pub fn is_valid(&self) -> bool {
        self.validation.valid
    }

    /// Replace the root with the result of a pure edit.
    ///
    /// A failed edit leaves the session untouched and does not notify.
    pub fn apply<F>(&mut self, edit: F) -> Result<(), TreeError>
    where
        F: FnOnce(&GroupNode) -> Result<GroupNode, TreeError>,
    {
        let next = edit(&self.root)?;
        self.replace_root(next);
        Ok(())
    }

    /// Reset to an empty root, keeping the root id.
    pub fn clear(&mut self) {
        let root = GroupNode::with_id(self.root.id.clone());
        self.replace_root(root);
    }

    /// The current filter, only if the tree validates.
    pub fn submit(&self) -> Option<FilterRoot> {
        self.validation.valid.then(|| self.filter.clone())
    }

    fn replace_root(&mut self, root: GroupNode) {
        self.filter = serialize_root(&root);
        self.validation = validate_root(&root, &self.schema);
        self.root = root;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.filter, self.validation.valid);
        }
    }
}
