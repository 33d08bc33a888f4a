//! Node records stored in the graph arena

use crate::foundation::collections::{IndexMap, KindId, NodeId};
use crate::kind::KindDescriptor;
use crate::value::Value;

/// One node of the graph
///
/// Child collections and reference slots are created empty for every role and
/// slot the kind declares, so lookups by declared name never miss. Fields start
/// at the kind defaults.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: KindId,
    pub(crate) label: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) roles: IndexMap<String, Vec<NodeId>>,
    pub(crate) references: IndexMap<String, Vec<NodeId>>,
    pub(crate) fields: IndexMap<String, Value>,
    pub(crate) exposed: Option<String>,
    pub(crate) finalized: bool,
}

impl NodeData {
    pub(crate) fn new(kind: &KindDescriptor, label: String) -> Self {
        Self {
            kind: kind.id,
            label,
            parent: None,
            roles: kind.roles.keys().map(|role| (role.clone(), Vec::new())).collect(),
            references: kind.references.keys().map(|slot| (slot.clone(), Vec::new())).collect(),
            fields: kind.defaults.clone(),
            exposed: None,
            finalized: false,
        }
    }

    /// Kind handle
    pub const fn kind(&self) -> KindId {
        self.kind
    }

    /// User label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name given by the name authority, or the label when unregistered
    pub fn name(&self) -> &str {
        self.exposed.as_deref().unwrap_or(&self.label)
    }

    /// Owning parent
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child collections by role
    pub const fn roles(&self) -> &IndexMap<String, Vec<NodeId>> {
        &self.roles
    }

    /// Reference slots
    pub const fn references(&self) -> &IndexMap<String, Vec<NodeId>> {
        &self.references
    }

    /// Field values
    pub const fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Children of every role, in role declaration order
    pub fn all_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roles.values().flatten().copied()
    }

    /// Role currently holding `child`
    pub fn role_of(&self, child: NodeId) -> Option<&str> {
        self.roles
            .iter()
            .find(|(_, children)| children.contains(&child))
            .map(|(role, _)| role.as_str())
    }
}
