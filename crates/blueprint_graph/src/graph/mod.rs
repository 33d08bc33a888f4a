//! # Graph
//!
//! The [`Graph`] is the session object of the crate. It owns every node, every
//! shared resource and every kind table, and all operations go through it.
//!
//! ## Structure
//!
//! Nodes form trees through owning edges: a node has at most one parent and
//! sits in exactly one role collection of that parent. On top of the trees,
//! reference slots hold non-owning pointers to other nodes of the same tree.
//!
//! ## Templates
//!
//! A freshly created node is a standalone template. [`Graph::attach`] inserts a
//! deep copy by default, so one template can be instantiated many times:
//!
//! ```rust
//! use blueprint_graph::prelude::*;
//!
//! let mut graph = Graph::with_standard_kinds(GraphConfig::default())?;
//! let world = graph.create("world", None)?;
//! let leg = graph.create("body", Some("leg"))?;
//!
//! graph.attach(world, [leg, leg], AttachOptions::default())?;
//! let legs = graph.children(world, "bodies")?.to_vec();
//! assert_eq!(graph.name(legs[0])?, "leg_(0)");
//! assert_eq!(graph.name(legs[1])?, "leg_(1)");
//! assert!(graph.parent(leg)?.is_none());
//! # Ok::<(), GraphError>(())
//! ```

use log::{debug, info, warn};

use crate::catalog;
use crate::config::GraphConfig;
use crate::error::{Diagnostic, GraphError, GraphResult};
use crate::foundation::collections::{dedup_ordered, IndexMap, KindId, NodeId, ResourceId, SlotMap};
use crate::kind::{KindBuilder, KindDescriptor};
use crate::node::NodeData;
use crate::resource::SharedResource;
use crate::value::Value;
use crate::view::{AllView, View};

mod attributes;
mod copy;
mod placement;
mod references;
mod structure;

pub use attributes::Attribute;
pub use copy::{Copied, Overrides};
pub use structure::{AttachOptions, Attached, Item};

/// Arena of nodes, resources and kinds
#[derive(Debug)]
pub struct Graph {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    pub(crate) resources: SlotMap<ResourceId, SharedResource>,
    kinds: SlotMap<KindId, KindDescriptor>,
    kind_names: IndexMap<String, KindId>,
    config: GraphConfig,
    diagnostics: Vec<Diagnostic>,
}

impl Graph {
    /// Create an empty graph without any kinds
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph with explicit configuration
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            resources: SlotMap::with_key(),
            kinds: SlotMap::with_key(),
            kind_names: IndexMap::new(),
            config,
            diagnostics: Vec::new(),
        }
    }

    /// Create a graph with the standard catalog of kinds registered
    pub fn with_standard_kinds(config: GraphConfig) -> GraphResult<Self> {
        let mut graph = Self::with_config(config);
        catalog::register_standard(&mut graph)?;
        Ok(graph)
    }

    /// Session configuration
    pub const fn config(&self) -> &GraphConfig {
        &self.config
    }

    // ========================================================================
    // KINDS
    // ========================================================================

    /// Register a kind table
    pub fn register_kind(&mut self, builder: KindBuilder) -> GraphResult<KindId> {
        if self.kind_names.contains_key(builder.name()) {
            return Err(GraphError::DuplicateKind(builder.name().to_string()));
        }
        builder.validate()?;
        let id = self.kinds.insert_with_key(|id| builder.build(id));
        let name = self.kinds[id].name.clone();
        debug!("Registered kind '{}'", name);
        self.kind_names.insert(name, id);
        Ok(id)
    }

    /// Handle of the kind registered under `name`
    pub fn kind_id(&self, name: &str) -> GraphResult<KindId> {
        self.kind_names
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownKind(name.to_string()))
    }

    /// Kind table by handle
    pub fn kind(&self, id: KindId) -> GraphResult<&KindDescriptor> {
        self.kinds
            .get(id)
            .ok_or_else(|| GraphError::UnknownKind(format!("{id:?}")))
    }

    /// Kind table by name
    pub fn kind_named(&self, name: &str) -> GraphResult<&KindDescriptor> {
        self.kind(self.kind_id(name)?)
    }

    /// Kind table of a node
    pub fn kind_of(&self, node: NodeId) -> GraphResult<&KindDescriptor> {
        self.kind(self.node(node)?.kind)
    }

    /// Names of all registered kinds, in registration order
    pub fn kind_names(&self) -> impl Iterator<Item = &str> {
        self.kind_names.keys().map(String::as_str)
    }

    // ========================================================================
    // NODES
    // ========================================================================

    /// Create a standalone node of kind `kind`
    ///
    /// Without a label the node is labelled `<prefix>_<kind>`.
    pub fn create(&mut self, kind: &str, label: Option<&str>) -> GraphResult<NodeId> {
        let descriptor = self.kind_named(kind)?;
        let label = label.map_or_else(
            || self.config.naming.anonymous_label(descriptor.name()),
            str::to_string,
        );
        let data = NodeData::new(descriptor, label);
        let node = self.nodes.insert(data);
        debug!("Created {} '{}'", kind, self.nodes[node].label);
        Ok(node)
    }

    /// Create a standalone node and set some of its fields
    ///
    /// Nothing is created if a field is unknown or a value does not fit.
    pub fn create_with<I, S>(&mut self, kind: &str, label: Option<&str>, fields: I) -> GraphResult<NodeId>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let node = self.create(kind, label)?;
        for (field, value) in fields {
            if let Err(error) = self.set_field(node, field.as_ref(), value) {
                self.remove_subtree(node);
                return Err(error);
            }
        }
        Ok(node)
    }

    /// Node record by handle
    pub fn node(&self, id: NodeId) -> GraphResult<&NodeData> {
        self.nodes.get(id).ok_or(GraphError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(GraphError::UnknownNode(id))
    }

    /// Whether the handle refers to a live node
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// User label of a node
    pub fn label(&self, node: NodeId) -> GraphResult<&str> {
        Ok(self.node(node)?.label())
    }

    /// Exposed name of a node, or its label if the name authority never saw it
    pub fn name(&self, node: NodeId) -> GraphResult<&str> {
        Ok(self.node(node)?.name())
    }

    /// Change the user label and re-resolve names in the node's tree
    ///
    /// If the names do not converge the old label and names are kept.
    pub fn set_label(&mut self, node: NodeId, label: impl Into<String>) -> GraphResult<()> {
        self.ensure_mutable(node, "relabel")?;
        let root = self.root(node)?;
        let checkpoint = self.checkpoint(&[root])?;
        self.nodes[node].label = label.into();
        let registered = self.register_names(root);
        if registered.is_err() {
            self.restore(checkpoint);
        }
        registered
    }

    /// Current value of a field
    pub fn field(&self, node: NodeId, field: &str) -> GraphResult<&Value> {
        let data = self.node(node)?;
        data.fields.get(field).ok_or_else(|| GraphError::UnknownAttribute {
            kind: self.kinds.get(data.kind).map(|kind| kind.name.clone()).unwrap_or_default(),
            attribute: field.to_string(),
        })
    }

    /// Set a field
    ///
    /// Resource slots accept a [`Value::Resource`] (the node becomes an owner)
    /// or [`Value::None`] (ownership is released). Plain fields never hold
    /// node or resource handles.
    pub fn set_field(&mut self, node: NodeId, field: &str, value: impl Into<Value>) -> GraphResult<()> {
        let value = self.checked_field(node, field, value.into())?;
        if self.kind_of(node)?.is_resource_slot(field) {
            return match value {
                Value::Resource(resource) => self.attach_owner(resource, node, field),
                _ => self.release_slot(node, field),
            };
        }
        self.node_mut(node)?.fields.insert(field.to_string(), value);
        Ok(())
    }

    /// Value `set_field` would store, or the reason it refuses
    pub(crate) fn checked_field(&self, node: NodeId, field: &str, value: Value) -> GraphResult<Value> {
        let default = self.field_default(node, field)?;

        if self.kind_of(node)?.is_resource_slot(field) {
            return match value {
                Value::Resource(resource) => {
                    self.resource(resource)?;
                    Ok(value)
                }
                Value::None => Ok(value),
                other => Err(GraphError::invalid(
                    field,
                    format!("expected a resource, got {}", other.type_name()),
                )),
            };
        }

        if value.holds_handle() {
            return Err(GraphError::invalid(
                field,
                "node and resource handles belong in reference or resource slots",
            ));
        }
        let type_name = value.type_name();
        value.coerce_like(&default).ok_or_else(|| {
            GraphError::invalid(field, format!("expected {}, got {}", default.type_name(), type_name))
        })
    }

    /// Restore a field to its kind default
    pub fn reset_field(&mut self, node: NodeId, field: &str) -> GraphResult<()> {
        let default = self.field_default(node, field)?;
        self.set_field(node, field, default)
    }

    /// Restore every field of a node to its kind default
    pub fn reset_fields(&mut self, node: NodeId) -> GraphResult<()> {
        let fields: Vec<String> = self.kind_of(node)?.defaults.keys().cloned().collect();
        for field in fields {
            self.reset_field(node, &field)?;
        }
        Ok(())
    }

    fn field_default(&self, node: NodeId, field: &str) -> GraphResult<Value> {
        let kind = self.kind_of(node)?;
        kind.default_of(field)
            .cloned()
            .ok_or_else(|| GraphError::UnknownAttribute {
                kind: kind.name.clone(),
                attribute: field.to_string(),
            })
    }

    // ========================================================================
    // TRAVERSAL
    // ========================================================================

    /// Owning parent
    pub fn parent(&self, node: NodeId) -> GraphResult<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    /// Top of the node's tree (the node itself when standalone)
    pub fn root(&self, node: NodeId) -> GraphResult<NodeId> {
        let mut current = node;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Chain of nodes from the root down to `node`, both included
    pub fn path(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.node(current)?.parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Children in one role
    pub fn children(&self, node: NodeId, role: &str) -> GraphResult<&[NodeId]> {
        let data = self.node(node)?;
        data.roles
            .get(role)
            .map(Vec::as_slice)
            .ok_or_else(|| GraphError::UnknownAttribute {
                kind: self.kinds.get(data.kind).map(|kind| kind.name.clone()).unwrap_or_default(),
                attribute: role.to_string(),
            })
    }

    /// Children of every role, in role declaration order
    pub fn all_children(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        Ok(self.node(node)?.all_children().collect())
    }

    /// Descendants grouped by the role they are reached through
    ///
    /// Every role of `node` contributes its direct children first; the
    /// descendants of each child are then merged in, role by role. Lists are
    /// free of duplicates.
    pub fn descendants(&self, node: NodeId) -> GraphResult<IndexMap<String, Vec<NodeId>>> {
        let data = self.node(node)?;
        let mut grouped: IndexMap<String, Vec<NodeId>> = data
            .roles
            .iter()
            .map(|(role, children)| (role.clone(), children.clone()))
            .collect();

        for child in data.all_children() {
            for (role, nodes) in self.descendants(child)? {
                grouped.entry(role).or_default().extend(nodes);
            }
        }

        for nodes in grouped.values_mut() {
            *nodes = crate::foundation::collections::dedup_ordered(nodes.iter().copied());
        }
        Ok(grouped)
    }

    /// Every descendant once, in the order of [`Graph::descendants`]
    pub fn descendant_list(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        let grouped = self.descendants(node)?;
        Ok(crate::foundation::collections::dedup_ordered(grouped.into_values().flatten()))
    }

    /// `node` and everything it owns, depth first
    pub fn subtree(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut visited = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let data = self.node(current)?;
            visited.push(current);
            let children: Vec<NodeId> = data.all_children().collect();
            stack.extend(children.into_iter().rev());
        }
        Ok(visited)
    }

    /// Whether `node` lies in the subtree owned by `ancestor`
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> GraphResult<bool> {
        Ok(self.path(node)?.contains(&ancestor))
    }

    // ========================================================================
    // FINALIZATION
    // ========================================================================

    /// Mark the tree containing `node` as finalized (or not)
    ///
    /// While finalized, structural mutation and label edits fail.
    pub fn set_finalized(&mut self, node: NodeId, finalized: bool) -> GraphResult<()> {
        let root = self.root(node)?;
        self.node_mut(root)?.finalized = finalized;
        info!("Tree '{}' {}", self.nodes[root].label, if finalized { "finalized" } else { "reopened" });
        Ok(())
    }

    /// Whether the tree containing `node` is finalized
    pub fn is_finalized(&self, node: NodeId) -> GraphResult<bool> {
        Ok(self.node(self.root(node)?)?.finalized)
    }

    pub(crate) fn ensure_mutable(&self, node: NodeId, operation: &'static str) -> GraphResult<()> {
        if self.is_finalized(node)? {
            return Err(GraphError::Finalized { node, operation });
        }
        Ok(())
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    /// Soft degradations collected since the last [`Graph::take_diagnostics`]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the collected diagnostics
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub(crate) fn report(&mut self, diagnostics: &[Diagnostic]) {
        if self.config.diagnostics.log_dropped_references {
            for diagnostic in diagnostics {
                warn!("{}", diagnostic);
            }
        }
        self.diagnostics.extend_from_slice(diagnostics);
    }

    // ========================================================================
    // VIEWS
    // ========================================================================

    /// View over the children of one role
    pub fn view(&self, node: NodeId, role: &str) -> GraphResult<View> {
        let children = self.children(node, role)?.to_vec();
        Ok(View::new(children, role, node))
    }

    /// View over every descendant of `node`
    pub fn all(&self, node: NodeId) -> GraphResult<AllView> {
        AllView::new(self, node)
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    /// Drop a subtree from the arena without any checks, releasing resources
    ///
    /// Children already gone from the arena are skipped.
    pub(crate) fn remove_subtree(&mut self, node: NodeId) {
        let mut members = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.get(current) {
                members.push(current);
                stack.extend(data.all_children());
            }
        }
        self.remove_nodes(&members);
    }

    /// Drop the listed nodes from the arena, releasing resources
    pub(crate) fn remove_nodes(&mut self, members: &[NodeId]) {
        for &member in members {
            let Some(data) = self.nodes.remove(member) else {
                continue;
            };
            for resource in data.fields.values().filter_map(Value::as_resource) {
                self.release_owner(resource, member);
            }
        }
    }

    /// Save the node records of the trees rooted at `roots`
    pub(crate) fn checkpoint(&self, roots: &[NodeId]) -> GraphResult<Checkpoint> {
        let mut saved = Vec::new();
        for root in dedup_ordered(roots.iter().copied()) {
            for node in self.subtree(root)? {
                saved.push((node, self.nodes[node].clone()));
            }
        }
        Ok(Checkpoint { saved })
    }

    /// Put saved node records back in place
    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        for (node, data) in checkpoint.saved {
            if let Some(slot) = self.nodes.get_mut(node) {
                *slot = data;
            }
        }
    }
}

/// Node records saved before a structural edit
pub(crate) struct Checkpoint {
    saved: Vec<(NodeId, NodeData)>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::NamingConfig;
    use crate::kind::KindFilter;

    pub(crate) fn create_test_graph() -> Graph {
        let mut graph = Graph::new();
        graph
            .register_kind(
                KindBuilder::new("tree")
                    .role("leaves", KindFilter::kind("leaf"))
                    .role("branches", KindFilter::kind("tree")),
            )
            .unwrap();
        graph
            .register_kind(KindBuilder::new("leaf").spatial().field("value", 1_i64))
            .unwrap();
        graph
    }

    /// Pile of rocks whose names took two rounds, now capped at one round
    pub(crate) fn create_rock_pile() -> (Graph, NodeId, Vec<NodeId>) {
        let mut graph = Graph::new();
        graph.register_kind(KindBuilder::new("rock")).unwrap();
        graph
            .register_kind(KindBuilder::new("pile").role("rocks", KindFilter::kind("rock")))
            .unwrap();
        let pile = graph.create("pile", Some("pile")).unwrap();
        let rocks: Vec<NodeId> = ["rock", "rock", "rock_(1)"]
            .iter()
            .map(|label| graph.create("rock", Some(label)).unwrap())
            .collect();
        graph.attach(pile, rocks.clone(), AttachOptions::moving()).unwrap();
        graph.config.naming.max_rounds = 1;
        (graph, pile, rocks)
    }

    #[test]
    fn test_create_uses_defaults_and_anonymous_label() {
        let mut graph = create_test_graph();
        let leaf = graph.create("leaf", None).unwrap();

        assert_eq!(graph.label(leaf).unwrap(), "anonymous_leaf");
        assert_eq!(graph.field(leaf, "value").unwrap(), &Value::Int(1));
        assert!(graph.parent(leaf).unwrap().is_none());
        assert_eq!(graph.root(leaf).unwrap(), leaf);
    }

    #[test]
    fn test_unknown_kind() {
        let mut graph = create_test_graph();
        assert!(matches!(graph.create("stone", None), Err(GraphError::UnknownKind(_))));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut graph = create_test_graph();
        let result = graph.register_kind(KindBuilder::new("leaf"));
        assert!(matches!(result, Err(GraphError::DuplicateKind(_))));
    }

    #[test]
    fn test_invalid_kind_not_registered() {
        let mut graph = create_test_graph();
        let result = graph.register_kind(KindBuilder::new("broken").field("x", 1.0_f32).field("x", 2.0_f32));
        assert!(result.is_err());
        assert!(graph.kind_id("broken").is_err());
        assert_eq!(graph.kind_names().count(), 2);
    }

    #[test]
    fn test_set_field_checks_type() {
        let mut graph = create_test_graph();
        let leaf = graph.create("leaf", Some("leaf")).unwrap();

        graph.set_field(leaf, "value", 5_i64).unwrap();
        assert_eq!(graph.field(leaf, "value").unwrap(), &Value::Int(5));

        let result = graph.set_field(leaf, "value", "five");
        assert!(matches!(result, Err(GraphError::InvalidValue { .. })));

        let result = graph.set_field(leaf, "missing", 1_i64);
        assert!(matches!(result, Err(GraphError::UnknownAttribute { .. })));

        graph.reset_field(leaf, "value").unwrap();
        assert_eq!(graph.field(leaf, "value").unwrap(), &Value::Int(1));
    }

    #[test]
    fn test_plain_fields_refuse_handles() {
        let mut graph = create_test_graph();
        graph.register_kind(KindBuilder::new("holder").field("anchor", Value::None)).unwrap();
        let holder = graph.create("holder", Some("holder")).unwrap();
        let elsewhere = graph.create("leaf", Some("elsewhere")).unwrap();

        let result = graph.set_field(holder, "anchor", Value::Node(elsewhere));
        assert!(matches!(result, Err(GraphError::InvalidValue { .. })));
        let result = graph.set_field(holder, "anchor", Value::List(vec![Value::Node(elsewhere)]));
        assert!(matches!(result, Err(GraphError::InvalidValue { .. })));
        assert_eq!(graph.field(holder, "anchor").unwrap(), &Value::None);

        graph.set_field(holder, "anchor", "free text").unwrap();
        let copy = graph.copy(holder).unwrap().root;
        assert_eq!(graph.field(copy, "anchor").unwrap(), &Value::Text("free text".into()));
    }

    #[test]
    fn test_relabel_kept_when_names_do_not_converge() {
        let config = GraphConfig::new().with_naming(NamingConfig::new().with_max_rounds(1));
        let mut graph = Graph::with_config(config);
        graph.register_kind(KindBuilder::new("rock")).unwrap();
        graph
            .register_kind(KindBuilder::new("pile").role("rocks", KindFilter::kind("rock")))
            .unwrap();
        let pile = graph.create("pile", Some("pile")).unwrap();
        let rocks: Vec<NodeId> = ["rock", "stone", "rock_(1)"]
            .iter()
            .map(|label| graph.create("rock", Some(label)).unwrap())
            .collect();
        graph.attach(pile, rocks.clone(), AttachOptions::moving()).unwrap();

        let result = graph.set_label(rocks[1], "rock");
        assert!(matches!(result, Err(GraphError::NamingDidNotConverge { .. })));
        assert_eq!(graph.label(rocks[1]).unwrap(), "stone");
        let names: Vec<&str> = rocks.iter().map(|rock| graph.name(*rock).unwrap()).collect();
        assert_eq!(names, vec!["rock", "stone", "rock_(1)"]);
    }

    #[test]
    fn test_create_with_is_all_or_nothing() {
        let mut graph = create_test_graph();
        let before = graph.node_count();
        let result = graph.create_with("leaf", None, [("value", Value::Text("bad".into()))]);
        assert!(result.is_err());
        assert_eq!(graph.node_count(), before);

        let leaf = graph.create_with("leaf", None, [("value", Value::Int(3))]).unwrap();
        assert_eq!(graph.field(leaf, "value").unwrap(), &Value::Int(3));
    }

    #[test]
    fn test_path_root_and_descendants() {
        let mut graph = create_test_graph();
        let root = graph.create("tree", Some("root")).unwrap();
        let branch = graph.create("tree", Some("branch")).unwrap();
        let leaf = graph.create("leaf", Some("leaf")).unwrap();

        let moving = AttachOptions::moving();
        graph.attach(branch, [leaf], moving).unwrap();
        graph.attach(root, [branch], moving).unwrap();

        assert_eq!(graph.path(leaf).unwrap(), vec![root, branch, leaf]);
        assert_eq!(graph.root(leaf).unwrap(), root);
        assert!(graph.contains(root, leaf).unwrap());
        assert!(!graph.contains(leaf, root).unwrap());

        let grouped = graph.descendants(root).unwrap();
        assert_eq!(grouped["branches"], vec![branch]);
        assert_eq!(grouped["leaves"], vec![leaf]);
        assert_eq!(graph.subtree(root).unwrap(), vec![root, branch, leaf]);
    }

    #[test]
    fn test_finalized_blocks_structure_and_labels() {
        let mut graph = create_test_graph();
        let root = graph.create("tree", Some("root")).unwrap();
        let leaf = graph.create("leaf", Some("leaf")).unwrap();
        let attached = graph.attach(root, [leaf], AttachOptions::default()).unwrap();
        let child = attached.nodes[0];

        graph.set_finalized(child, true).unwrap();
        assert!(graph.is_finalized(root).unwrap());

        assert!(matches!(
            graph.attach(root, [leaf], AttachOptions::default()),
            Err(GraphError::Finalized { .. })
        ));
        assert!(matches!(graph.detach(root, [child]), Err(GraphError::Finalized { .. })));
        assert!(matches!(graph.set_label(child, "other"), Err(GraphError::Finalized { .. })));

        graph.set_finalized(root, false).unwrap();
        graph.set_label(child, "other").unwrap();
        assert_eq!(graph.name(child).unwrap(), "other");
    }
}
