//! Attach, detach and discard
//!
//! Multi-item operations validate every item before touching the graph;
//! copies are built as standalone temporaries and discarded again if a later
//! step fails.

use log::debug;

use super::Graph;
use crate::error::{Diagnostic, GraphError, GraphResult};
use crate::foundation::collections::{dedup_ordered, NodeId};
use crate::lattice::Lattice;
use crate::view::{LatticeView, View};

/// Something that can be attached: a node, or every member of a view
#[derive(Debug, Clone)]
pub enum Item {
    /// A single node
    Node(NodeId),
    /// Members of a view, in view order
    View(View),
    /// Cells of a lattice view, row-major
    Lattice(LatticeView),
}

impl Item {
    fn into_nodes(self) -> Vec<NodeId> {
        match self {
            Self::Node(node) => vec![node],
            Self::View(view) => view.elements().to_vec(),
            Self::Lattice(lattice) => lattice.nodes(),
        }
    }
}

impl From<NodeId> for Item {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<&NodeId> for Item {
    fn from(node: &NodeId) -> Self {
        Self::Node(*node)
    }
}

impl From<View> for Item {
    fn from(view: View) -> Self {
        Self::View(view)
    }
}

impl From<&View> for Item {
    fn from(view: &View) -> Self {
        Self::View(view.clone())
    }
}

impl From<LatticeView> for Item {
    fn from(lattice: LatticeView) -> Self {
        Self::Lattice(lattice)
    }
}

impl From<&Lattice> for Item {
    fn from(lattice: &Lattice) -> Self {
        Self::Lattice(lattice.view())
    }
}

/// How [`Graph::attach`] inserts its items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOptions {
    /// Insert deep copies instead of the items themselves
    pub copy: bool,
    /// Keep the absolute placement of spatial items
    pub globally: bool,
}

impl AttachOptions {
    /// Copying, local placement
    pub const fn new() -> Self {
        Self {
            copy: true,
            globally: false,
        }
    }

    /// Relink the items themselves
    pub const fn moving() -> Self {
        Self {
            copy: false,
            globally: false,
        }
    }

    /// Set whether items are copied
    pub const fn with_copy(mut self, copy: bool) -> Self {
        self.copy = copy;
        self
    }

    /// Set whether absolute placement is preserved
    pub const fn with_globally(mut self, globally: bool) -> Self {
        self.globally = globally;
        self
    }
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of an attach
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attached {
    /// Nodes now linked under the receiver, in item order
    pub nodes: Vec<NodeId>,
    /// References dropped or decoupled on the way
    pub diagnostics: Vec<Diagnostic>,
}

enum Target<'a> {
    FirstAccepting,
    Replace(&'a str),
}

impl Graph {
    /// Attach items under `parent`
    ///
    /// Each item goes into the first role of `parent` (declaration order) that
    /// accepts its kind. With `copy` (the default) a deep copy is inserted and
    /// the item stays untouched; otherwise the item is moved, leaving its
    /// previous parent first.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if the tree is finalized, an item is
    /// rejected by every role ([`GraphError::TypeMismatch`]) or a moved item is
    /// `parent` or one of its ancestors ([`GraphError::CircularAttachment`]).
    /// The same holds when the names of an affected tree do not converge.
    pub fn attach<I>(&mut self, parent: NodeId, items: I, options: AttachOptions) -> GraphResult<Attached>
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        let nodes = items.into_iter().flat_map(|item| item.into().into_nodes()).collect();
        self.attach_into(parent, nodes, options, &Target::FirstAccepting)
    }

    /// Replace the children of `role` by moving `items` into it
    pub fn replace_children<I>(&mut self, node: NodeId, role: &str, items: I) -> GraphResult<Attached>
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        self.replace_children_with(node, role, items, AttachOptions::moving())
    }

    /// Replace the children of `role` with `items`, copied or moved per `options`
    pub fn replace_children_with<I>(
        &mut self,
        node: NodeId,
        role: &str,
        items: I,
        options: AttachOptions,
    ) -> GraphResult<Attached>
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        self.children(node, role)?;
        let nodes = items.into_iter().flat_map(|item| item.into().into_nodes()).collect();
        self.attach_into(node, nodes, options, &Target::Replace(role))
    }

    /// Detach children of `parent`
    ///
    /// Every item becomes the root of its own tree. References between the
    /// detached subtrees and the remaining tree are cleared and reported.
    ///
    /// # Errors
    ///
    /// [`GraphError::Finalized`] if the tree is finalized and
    /// [`GraphError::NotAChild`] if an item is not a child of `parent`; nothing
    /// is detached in either case, nor when renaming an affected tree fails.
    pub fn detach<I>(&mut self, parent: NodeId, items: I) -> GraphResult<Vec<Diagnostic>>
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        self.ensure_mutable(parent, "detach")?;
        let nodes = dedup_ordered(items.into_iter().flat_map(|item| item.into().into_nodes()));
        for &item in &nodes {
            if self.node(item)?.parent != Some(parent) {
                return Err(GraphError::NotAChild { parent, item });
            }
        }

        let root = self.root(parent)?;
        let checkpoint = self.checkpoint(&[root])?;
        let diagnostics = match self.unlink_items(parent, root, &nodes) {
            Ok(diagnostics) => diagnostics,
            Err(error) => {
                self.restore(checkpoint);
                return Err(error);
            }
        };
        self.report(&diagnostics);

        debug!("Detached {} node(s) from '{}'", nodes.len(), self.nodes[parent].label);
        Ok(diagnostics)
    }

    /// Detach `node` from whatever parent it has
    pub fn detach_from_parent(&mut self, node: NodeId) -> GraphResult<Vec<Diagnostic>> {
        match self.parent(node)? {
            Some(parent) => self.detach(parent, [node]),
            None => Ok(Vec::new()),
        }
    }

    /// Delete a standalone node and its subtree from the arena
    ///
    /// Ownership of shared resources is released; resources left without
    /// owners are reclaimed.
    pub fn discard(&mut self, node: NodeId) -> GraphResult<()> {
        if self.node(node)?.parent.is_some() {
            return Err(GraphError::NotStandalone { node });
        }
        debug!("Discarding '{}'", self.nodes[node].label);
        self.remove_subtree(node);
        Ok(())
    }

    /// Check that `replace_children_with` would accept `nodes` for `role`
    pub(crate) fn check_replace(
        &self,
        node: NodeId,
        role: &str,
        nodes: &[NodeId],
        options: AttachOptions,
    ) -> GraphResult<()> {
        self.children(node, role)?;
        self.ensure_mutable(node, "attach")?;
        let nodes = if options.copy { nodes.to_vec() } else { dedup_ordered(nodes.iter().copied()) };
        self.plan_attach(node, &nodes, options, &Target::Replace(role)).map(drop)
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    fn attach_into(
        &mut self,
        parent: NodeId,
        nodes: Vec<NodeId>,
        options: AttachOptions,
        target: &Target<'_>,
    ) -> GraphResult<Attached> {
        self.ensure_mutable(parent, "attach")?;
        let nodes = if options.copy { nodes } else { dedup_ordered(nodes) };
        let planned = self.plan_attach(parent, &nodes, options, target)?;

        let mut diagnostics = Vec::new();
        let mut staged: Vec<(NodeId, String)> = Vec::with_capacity(planned.len());
        for (item, role) in planned {
            if !options.copy {
                staged.push((item, role));
                continue;
            }
            match self.copy_region(item, &super::Overrides::new()) {
                Ok(copied) => {
                    diagnostics.extend(copied.diagnostics);
                    staged.push((copied.root, role));
                }
                Err(error) => {
                    for (temporary, _) in staged {
                        self.remove_subtree(temporary);
                    }
                    return Err(error);
                }
            }
        }

        let new_root = self.root(parent)?;
        let mut touched = vec![new_root];
        if !options.copy {
            for (child, _) in &staged {
                touched.push(self.root(*child)?);
            }
        }
        let checkpoint = self.checkpoint(&touched)?;
        match self.link_staged(parent, new_root, &staged, options, target) {
            Ok(decoupled) => diagnostics.extend(decoupled),
            Err(error) => {
                self.restore(checkpoint);
                if options.copy {
                    for (temporary, _) in &staged {
                        self.remove_subtree(*temporary);
                    }
                }
                return Err(error);
            }
        }
        self.report(&diagnostics);

        debug!(
            "Attached {} node(s) to '{}' ({})",
            staged.len(),
            self.nodes[parent].label,
            if options.copy { "copied" } else { "moved" }
        );
        Ok(Attached {
            nodes: staged.into_iter().map(|(child, _)| child).collect(),
            diagnostics,
        })
    }

    fn plan_attach(
        &self,
        parent: NodeId,
        nodes: &[NodeId],
        options: AttachOptions,
        target: &Target<'_>,
    ) -> GraphResult<Vec<(NodeId, String)>> {
        let lineage = self.path(parent)?;
        let parent_kind = self.kind_of(parent)?;
        let mut planned = Vec::with_capacity(nodes.len());

        for &item in nodes {
            let item_kind = self.kind_of(item)?;
            let role = match target {
                Target::FirstAccepting => parent_kind.accepting_role(item_kind),
                Target::Replace(role) => parent_kind
                    .roles
                    .get(*role)
                    .filter(|spec| spec.accepts.accepts(item_kind))
                    .map(|_| *role),
            };
            let role = role.ok_or_else(|| GraphError::TypeMismatch {
                parent,
                parent_kind: parent_kind.name.clone(),
                item,
                item_kind: item_kind.name.clone(),
                roles: parent_kind.roles.keys().cloned().collect(),
            })?;

            if !options.copy {
                if lineage.contains(&item) {
                    return Err(GraphError::CircularAttachment { item, parent });
                }
                if self.nodes[item].parent.is_some() {
                    self.ensure_mutable(item, "move")?;
                }
            }
            planned.push((item, role.to_string()));
        }
        Ok(planned)
    }

    /// Link staged children under `parent`, then decouple and rename the affected trees
    fn link_staged(
        &mut self,
        parent: NodeId,
        new_root: NodeId,
        staged: &[(NodeId, String)],
        options: AttachOptions,
        target: &Target<'_>,
    ) -> GraphResult<Vec<Diagnostic>> {
        let mut released = Vec::new();
        if let Target::Replace(role) = target {
            let current = self.node_mut(parent)?.roles.get_mut(*role).map(std::mem::take).unwrap_or_default();
            for child in current {
                let data = self.node_mut(child)?;
                data.parent = None;
                data.exposed = None;
                released.push(child);
            }
        }

        let mut old_roots = Vec::new();
        for (child, role) in staged {
            let absolute = if options.globally && self.kind_of(*child)?.is_spatial() {
                Some(self.global_transform(*child)?)
            } else {
                None
            };
            if let Some(old_parent) = self.nodes[*child].parent {
                let old_root = self.root(old_parent)?;
                self.unlink(old_parent, *child);
                if old_root != new_root {
                    old_roots.push(old_root);
                }
            }
            self.link(parent, role, *child);
            if let Some(absolute) = absolute {
                self.set_global_transform(*child, &absolute)?;
            }
        }

        let released: Vec<NodeId> = released
            .into_iter()
            .filter(|child| self.nodes[*child].parent.is_none())
            .collect();
        let mut diagnostics = Vec::new();
        for root in dedup_ordered(old_roots.into_iter().chain(released)) {
            diagnostics.extend(self.decouple(root)?);
            self.register_names(root)?;
        }
        diagnostics.extend(self.decouple(new_root)?);
        self.register_names(new_root)?;
        Ok(diagnostics)
    }

    /// Unlink `nodes` from `parent`, then decouple and rename both sides
    fn unlink_items(&mut self, parent: NodeId, root: NodeId, nodes: &[NodeId]) -> GraphResult<Vec<Diagnostic>> {
        for &item in nodes {
            self.unlink(parent, item);
        }

        let mut diagnostics = self.decouple(root)?;
        for &item in nodes {
            diagnostics.extend(self.decouple(item)?);
            self.register_names(item)?;
        }
        self.register_names(root)?;
        Ok(diagnostics)
    }

    pub(crate) fn link(&mut self, parent: NodeId, role: &str, child: NodeId) {
        if let Some(children) = self.nodes[parent].roles.get_mut(role) {
            children.push(child);
            self.nodes[child].parent = Some(parent);
        }
    }

    pub(crate) fn unlink(&mut self, parent: NodeId, child: NodeId) {
        for children in self.nodes[parent].roles.values_mut() {
            children.retain(|existing| *existing != child);
        }
        let data = &mut self.nodes[child];
        data.parent = None;
        data.exposed = None;
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
