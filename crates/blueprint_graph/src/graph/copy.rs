//! Deep copies with reference migration

use log::debug;

use super::Graph;
use crate::error::{Diagnostic, GraphError, GraphResult};
use crate::foundation::collections::{IndexMap, NodeId};
use crate::migration::Migration;
use crate::node::NodeData;
use crate::value::Value;

/// Values replacing those of the copied root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    label: Option<String>,
    fields: IndexMap<String, Value>,
    children: IndexMap<String, Vec<NodeId>>,
}

impl Overrides {
    /// No overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Give the copy another label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Give the copy another field value
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Fill a role of the copy with copies of `nodes` instead of the original children
    pub fn children(mut self, role: impl Into<String>, nodes: Vec<NodeId>) -> Self {
        self.children.insert(role.into(), nodes);
        self
    }

    /// Whether nothing is overridden
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.fields.is_empty() && self.children.is_empty()
    }
}

/// Outcome of a copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Copied {
    /// Root of the new standalone subtree
    pub root: NodeId,
    /// References that pointed outside the copied region and were dropped
    pub diagnostics: Vec<Diagnostic>,
}

impl Graph {
    /// Deep-copy `node` and its subtree into a new standalone tree
    pub fn copy(&mut self, node: NodeId) -> GraphResult<Copied> {
        self.copy_with(node, &Overrides::new())
    }

    /// Deep-copy `node`, replacing some of the root's label, fields or children
    ///
    /// Reference slots inside the copied subtree are rewired to the copies,
    /// every referenced node being copied exactly once. Shared resources are
    /// not duplicated; each copy becomes another owner.
    pub fn copy_with(&mut self, node: NodeId, overrides: &Overrides) -> GraphResult<Copied> {
        let copied = self.copy_region(node, overrides)?;
        self.report(&copied.diagnostics);
        Ok(copied)
    }

    pub(crate) fn copy_region(&mut self, node: NodeId, overrides: &Overrides) -> GraphResult<Copied> {
        self.validate_overrides(node, overrides)?;

        let region = self.subtree(node)?;
        let mut migration = Migration::plan(self, &region);
        let mut created = Vec::with_capacity(region.len());

        let outcome = self
            .copy_walk(node, Some(overrides), &mut migration, &mut created)
            .and_then(|root| {
                let diagnostics = migration.finish(self)?;
                self.register_names(root)?;
                Ok((root, diagnostics))
            });

        match outcome {
            Ok((root, diagnostics)) => {
                debug!(
                    "Copied '{}' ({} node(s), {} dropped reference(s))",
                    self.nodes[node].label,
                    created.len(),
                    diagnostics.len()
                );
                Ok(Copied { root, diagnostics })
            }
            Err(error) => {
                // Children are only linked once their own walk returns.
                for partial in created {
                    self.remove_subtree(partial);
                }
                Err(error)
            }
        }
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    fn validate_overrides(&self, node: NodeId, overrides: &Overrides) -> GraphResult<()> {
        let kind = self.kind_of(node)?;
        let unknown = |attribute: &String| GraphError::UnknownAttribute {
            kind: kind.name.clone(),
            attribute: attribute.clone(),
        };

        if let Some(field) = overrides.fields.keys().find(|field| kind.default_of(field).is_none()) {
            return Err(unknown(field));
        }
        for (role, items) in &overrides.children {
            let spec = kind.roles.get(role).ok_or_else(|| unknown(role))?;
            for &item in items {
                let item_kind = self.kind_of(item)?;
                if !spec.accepts.accepts(item_kind) {
                    return Err(GraphError::TypeMismatch {
                        parent: node,
                        parent_kind: kind.name.clone(),
                        item,
                        item_kind: item_kind.name.clone(),
                        roles: vec![role.clone()],
                    });
                }
            }
        }
        Ok(())
    }

    fn copy_walk(
        &mut self,
        original: NodeId,
        overrides: Option<&Overrides>,
        migration: &mut Migration,
        created: &mut Vec<NodeId>,
    ) -> GraphResult<NodeId> {
        let source = self.node(original)?.clone();
        let label = overrides
            .and_then(|o| o.label.clone())
            .unwrap_or_else(|| source.label.clone());

        let data = NodeData::new(self.kind(source.kind)?, label);
        let copy = self.nodes.insert(data);
        created.push(copy);
        migration.adopt(original, copy);

        for (name, value) in &source.fields {
            if overrides.is_some_and(|o| o.fields.contains_key(name)) {
                continue;
            }
            let kind = self.kind(source.kind)?;
            if kind.default_of(name) == Some(value) {
                continue;
            }
            if kind.is_resource_slot(name) {
                if let Value::Resource(resource) = value {
                    self.attach_owner(*resource, copy, name)?;
                }
                continue;
            }
            self.nodes[copy].fields.insert(name.clone(), value.clone());
        }
        if let Some(overrides) = overrides {
            for (name, value) in &overrides.fields {
                self.set_field(copy, name, value.clone())?;
            }
        }

        for (slot, targets) in &source.references {
            for (index, target) in targets.iter().enumerate() {
                migration.request(original, copy, slot, index, *target)?;
            }
        }

        for (role, children) in &source.roles {
            if let Some(replacement) = overrides.and_then(|o| o.children.get(role)) {
                for &item in replacement {
                    let nested = self.copy_region(item, &Overrides::new())?;
                    migration.absorb(nested.diagnostics);
                    self.link(copy, role, nested.root);
                }
                continue;
            }
            for &child in children {
                let child_copy = self.copy_walk(child, None, migration, created)?;
                self.link(copy, role, child_copy);
            }
        }
        Ok(copy)
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
