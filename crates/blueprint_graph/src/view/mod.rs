//! # Broadcast Views
//!
//! A [`View`] is an ordered, duplicate-free snapshot of node handles. Reading
//! an attribute through a view gathers it from every member; writing one
//! broadcasts the value.
//!
//! ## Reading
//!
//! - roles and reference slots gather into a new [`View`] over the union of
//!   the members' children or targets
//! - operations gather into a [`FunctionHandle`]
//! - plain values gather into a list, or a [`View`] when every value is a node
//!
//! ## Writing
//!
//! The value's nesting shape is compared with what every member currently
//! holds. If the value is a list with one matching entry per member, entries
//! are assigned one-to-one; otherwise the whole value is assigned to every
//! member. Assigning a role one-to-many attaches copies to each member.
//!
//! A view is a snapshot: structural changes made after it was taken are not
//! reflected in it.

use std::fmt::Write as _;
use std::ops::{Bound, RangeBounds};

use crate::error::{Diagnostic, GraphError, GraphResult};
use crate::foundation::collections::{dedup_ordered, NodeId};
use crate::graph::{AttachOptions, Attribute, Graph};
use crate::value::Value;

mod all;
mod function;
mod lattice;

pub use all::AllView;
pub use function::{FunctionHandle, Outcome};
pub use lattice::{Grid, Index, LatticeView, Selection};

/// Result of reading an attribute through a view
#[derive(Debug, Clone, PartialEq)]
pub enum Gathered {
    /// Nodes reached from the members
    View(View),
    /// One value per member, or a nested list for lattices
    Values(Vec<Value>),
    /// Operation to broadcast
    Function(FunctionHandle),
}

impl Gathered {
    /// The gathered view, if nodes were gathered
    pub fn into_view(self) -> Option<View> {
        match self {
            Self::View(view) => Some(view),
            _ => None,
        }
    }

    /// The gathered values, if plain values were gathered
    pub fn into_values(self) -> Option<Vec<Value>> {
        match self {
            Self::Values(values) => Some(values),
            _ => None,
        }
    }

    /// The gathered operation, if an operation was gathered
    pub fn into_function(self) -> Option<FunctionHandle> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }
}

/// Ordered, duplicate-free snapshot of nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    elements: Vec<NodeId>,
    name: String,
    anchor: NodeId,
}

impl View {
    /// Create a view; later duplicates are dropped
    pub fn new<I>(elements: I, name: impl Into<String>, anchor: NodeId) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        Self {
            elements: dedup_ordered(elements),
            name: name.into(),
            anchor,
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the view has no members
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Members in order
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    /// Iterate the members
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.elements.iter().copied()
    }

    /// Member at `index`
    pub fn get_node(&self, index: usize) -> Option<NodeId> {
        self.elements.get(index).copied()
    }

    /// Whether `node` is a member
    pub fn contains(&self, node: NodeId) -> bool {
        self.elements.contains(&node)
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node the view was taken from
    pub const fn anchor(&self) -> NodeId {
        self.anchor
    }

    /// Sub-view over a range of positions, clamped to the view
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Self {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(start) => *start,
            Bound::Excluded(start) => start + 1,
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(end) => end + 1,
            Bound::Excluded(end) => *end,
            Bound::Unbounded => len,
        }
        .clamp(start, len);
        Self {
            elements: self.elements[start..end].to_vec(),
            name: self.name.clone(),
            anchor: self.anchor,
        }
    }

    /// Sub-view of the members carrying the user label `label`
    pub fn filter_label(&self, graph: &Graph, label: &str) -> GraphResult<Self> {
        let mut elements = Vec::new();
        for node in self.iter() {
            if graph.label(node)? == label {
                elements.push(node);
            }
        }
        Ok(Self {
            elements,
            name: self.name.clone(),
            anchor: self.anchor,
        })
    }

    /// `View[<len>|<anchor name>.<view name>]`
    pub fn display(&self, graph: &Graph) -> String {
        let mut text = String::new();
        let anchor = graph.name(self.anchor).unwrap_or("?");
        let _ = write!(text, "View[{}|{}.{}]", self.len(), anchor, self.name);
        text
    }

    /// Gather `attr` from every member
    ///
    /// # Errors
    ///
    /// [`GraphError::EmptyView`] on an empty view, the lookup error of the
    /// first member lacking `attr`, and [`GraphError::HeterogeneousAttribute`]
    /// when members disagree on what `attr` is.
    pub fn get(&self, graph: &Graph, attr: &str) -> GraphResult<Gathered> {
        let child_name = format!("{}.{}", self.name, attr);
        Ok(match classify(graph, &self.elements, attr, &self.name)? {
            Gather::Edges(nodes) => Gathered::View(Self::new(nodes, child_name, self.anchor)),
            Gather::Operations => Gathered::Function(FunctionHandle::new(
                self.elements.clone(),
                attr,
                child_name,
                self.anchor,
            )),
            Gather::Values(values) => match values.iter().map(Value::as_node).collect::<Option<Vec<_>>>() {
                Some(nodes) => Gathered::View(Self::new(nodes, child_name, self.anchor)),
                None => Gathered::Values(values),
            },
        })
    }

    /// Broadcast `value` into `attr` of every member
    pub fn set(&self, graph: &mut Graph, attr: &str, value: impl Into<Value>) -> GraphResult<()> {
        let value = value.into();
        let (current, edges) = current_values(graph, &self.elements, attr, &self.name)?;

        let writes: Vec<(NodeId, Value, bool)> = match value {
            Value::List(items) if matches_members(&current, &items, edges) => self
                .elements
                .iter()
                .zip(items)
                .map(|(node, item)| (*node, item, false))
                .collect(),
            value => self.elements.iter().map(|node| (*node, value.clone(), true)).collect(),
        };
        assign_all(graph, attr, writes)
    }

    /// Call `f` on every member
    ///
    /// Returns `None` when every call returned [`Value::None`].
    pub fn apply<F>(&self, graph: &mut Graph, mut f: F) -> GraphResult<Option<Vec<Value>>>
    where
        F: FnMut(&mut Graph, NodeId) -> GraphResult<Value>,
    {
        let mut results = Vec::with_capacity(self.len());
        for node in self.iter() {
            results.push(f(graph, node)?);
        }
        if results.iter().all(Value::is_none) {
            Ok(None)
        } else {
            Ok(Some(results))
        }
    }

    /// Detach every member from its parent
    pub fn detach_all(&self, graph: &mut Graph) -> GraphResult<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        for node in self.iter() {
            diagnostics.extend(graph.detach_from_parent(node)?);
        }
        Ok(diagnostics)
    }
}

impl<'a> IntoIterator for &'a View {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter().copied()
    }
}

impl From<&View> for Value {
    fn from(view: &View) -> Self {
        Self::from(view.elements.clone())
    }
}

impl From<View> for Value {
    fn from(view: View) -> Self {
        Self::from(view.elements)
    }
}

// ============================================================================
// SHARED GATHER / ASSIGN HELPERS
// ============================================================================

pub(crate) enum Gather {
    Edges(Vec<NodeId>),
    Operations,
    Values(Vec<Value>),
}

/// Resolve `attr` on every element and check they agree on its nature
pub(crate) fn classify(graph: &Graph, elements: &[NodeId], attr: &str, view: &str) -> GraphResult<Gather> {
    let attributes = resolve(graph, elements, attr, view)?;
    if attributes.iter().all(Attribute::is_edge) {
        let targets = attributes.into_iter().flat_map(|attribute| match attribute {
            Attribute::Role(nodes) | Attribute::Reference { targets: nodes, .. } => nodes,
            _ => Vec::new(),
        });
        return Ok(Gather::Edges(dedup_ordered(targets)));
    }
    if attributes.iter().all(|attribute| matches!(attribute, Attribute::Operation(_))) {
        return Ok(Gather::Operations);
    }
    if attributes.iter().all(|attribute| matches!(attribute, Attribute::Value(_))) {
        return Ok(Gather::Values(attributes.iter().map(Attribute::to_value).collect()));
    }
    Err(GraphError::HeterogeneousAttribute {
        view: view.to_string(),
        attribute: attr.to_string(),
    })
}

/// Current value of `attr` on every element, and whether `attr` is an edge
pub(crate) fn current_values(
    graph: &Graph,
    elements: &[NodeId],
    attr: &str,
    view: &str,
) -> GraphResult<(Vec<Value>, bool)> {
    let attributes = resolve(graph, elements, attr, view)?;
    let edges = attributes.iter().all(Attribute::is_edge);
    let values = attributes
        .iter()
        .all(|attribute| matches!(attribute, Attribute::Value(_)));
    if !edges && !values {
        return Err(GraphError::HeterogeneousAttribute {
            view: view.to_string(),
            attribute: attr.to_string(),
        });
    }
    Ok((attributes.iter().map(Attribute::to_value).collect(), edges))
}

fn resolve(graph: &Graph, elements: &[NodeId], attr: &str, view: &str) -> GraphResult<Vec<Attribute>> {
    if elements.is_empty() {
        return Err(GraphError::EmptyView(view.to_string()));
    }
    elements.iter().map(|node| graph.attribute(*node, attr)).collect()
}

/// Whether `item` has the nesting shape of `current`
///
/// Edge entries only need to be nodes and agree on being a list.
pub(crate) fn shaped_like(current: &Value, item: &Value, edges: bool) -> bool {
    if edges {
        item.to_nodes().is_some() && matches!(current, Value::List(_)) == matches!(item, Value::List(_))
    } else {
        current.shape() == item.shape()
    }
}

fn matches_members(current: &[Value], items: &[Value], edges: bool) -> bool {
    current.len() == items.len()
        && current
            .iter()
            .zip(items)
            .all(|(current, item)| shaped_like(current, item, edges))
}

/// Write broadcast entries `(member, value, fan_out)` once every one of them checks out
pub(crate) fn assign_all(graph: &mut Graph, attr: &str, writes: Vec<(NodeId, Value, bool)>) -> GraphResult<()> {
    for (node, value, fan_out) in &writes {
        let options = if *fan_out { AttachOptions::new() } else { AttachOptions::moving() };
        graph.check_attribute(*node, attr, value, options)?;
    }
    for (node, value, fan_out) in writes {
        assign(graph, node, attr, value, fan_out)?;
    }
    Ok(())
}

/// Write one broadcast entry; `fan_out` marks the same value going to every member
fn assign(graph: &mut Graph, node: NodeId, attr: &str, value: Value, fan_out: bool) -> GraphResult<()> {
    if fan_out {
        if let Attribute::Role(_) = graph.attribute(node, attr)? {
            let nodes = value
                .to_nodes()
                .ok_or_else(|| GraphError::invalid(attr, format!("expected nodes, got {}", value.type_name())))?;
            graph.replace_children_with(node, attr, nodes, AttachOptions::new())?;
            return Ok(());
        }
    }
    graph.set_attribute(node, attr, value)
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::kind::{KindBuilder, KindFilter};

    pub(crate) fn create_test_forest() -> (Graph, NodeId, Vec<NodeId>) {
        let mut graph = Graph::new();
        graph
            .register_kind(
                KindBuilder::new("leaf")
                    .spatial()
                    .field("value", 1_i64)
                    .field("color", "green")
                    .operation("grow", |graph, node, args| {
                        let by = args.first().and_then(|arg| match arg {
                            Value::Int(by) => Some(*by),
                            _ => None,
                        });
                        let current = match graph.field(node, "value")? {
                            Value::Int(value) => *value,
                            _ => 0,
                        };
                        graph.set_field(node, "value", current + by.unwrap_or(1))?;
                        Ok(Value::None)
                    }),
            )
            .unwrap();
        graph
            .register_kind(
                KindBuilder::new("tree")
                    .role("leaves", KindFilter::kind("leaf"))
                    .role("trees", KindFilter::kind("tree"))
                    .reference("favourite", KindFilter::kind("leaf"), false),
            )
            .unwrap();

        let forest = graph.create("tree", Some("forest")).unwrap();
        let template = graph.create("tree", Some("tree")).unwrap();
        let leaf = graph.create("leaf", Some("leaf")).unwrap();
        graph.attach(template, [leaf, leaf], AttachOptions::default()).unwrap();
        let trees = graph
            .attach(forest, [template, template, template], AttachOptions::default())
            .unwrap()
            .nodes;
        (graph, forest, trees)
    }

    #[test]
    fn test_new_removes_duplicates() {
        let (graph, forest, trees) = create_test_forest();
        let view = View::new([trees[0], trees[1], trees[0]], "trees", forest);
        assert_eq!(view.len(), 2);
        assert_eq!(view.display(&graph), "View[2|forest.trees]");
    }

    #[test]
    fn test_get_role_flattens() {
        let (graph, forest, _) = create_test_forest();
        let trees = graph.view(forest, "trees").unwrap();
        let leaves = trees.get(&graph, "leaves").unwrap().into_view().unwrap();
        assert_eq!(leaves.len(), 6);
        assert_eq!(leaves.name(), "trees.leaves");
    }

    #[test]
    fn test_get_values_and_set_idempotent() {
        let (mut graph, forest, _) = create_test_forest();
        let trees = graph.view(forest, "trees").unwrap();
        let leaves = trees.get(&graph, "leaves").unwrap().into_view().unwrap();

        let values = leaves.get(&graph, "value").unwrap().into_values().unwrap();
        assert_eq!(values, vec![Value::Int(1); 6]);

        leaves.set(&mut graph, "value", Value::List(values.clone())).unwrap();
        assert_eq!(leaves.get(&graph, "value").unwrap().into_values().unwrap(), values);
    }

    #[test]
    fn test_one_to_many_and_one_to_one() {
        let (mut graph, forest, trees) = create_test_forest();
        let view = graph.view(forest, "trees").unwrap();
        let leaves = view.get(&graph, "leaves").unwrap().into_view().unwrap();

        leaves.set(&mut graph, "value", 5_i64).unwrap();
        for leaf in &leaves {
            assert_eq!(graph.field(leaf, "value").unwrap(), &Value::Int(5));
        }

        let first_leaves = graph.view(trees[0], "leaves").unwrap();
        first_leaves
            .set(&mut graph, "value", Value::List(vec![Value::Int(7), Value::Int(8)]))
            .unwrap();
        assert_eq!(graph.field(first_leaves.elements()[0], "value").unwrap(), &Value::Int(7));
        assert_eq!(graph.field(first_leaves.elements()[1], "value").unwrap(), &Value::Int(8));

        let result = leaves.set(&mut graph, "value", Value::List(vec![Value::Int(1), Value::Int(2)]));
        assert!(matches!(result, Err(GraphError::InvalidValue { .. })));
    }

    #[test]
    fn test_rejected_member_leaves_view_untouched() {
        let (mut graph, forest, trees) = create_test_forest();
        let leaves = graph.view(forest, "trees").unwrap().get(&graph, "leaves").unwrap().into_view().unwrap();
        let mut values = vec![Value::Int(7); 5];
        values.push(Value::Text("seven".into()));

        let result = leaves.set(&mut graph, "value", Value::List(values));
        assert!(matches!(result, Err(GraphError::InvalidValue { .. })));
        assert_eq!(leaves.get(&graph, "value").unwrap().into_values().unwrap(), vec![Value::Int(1); 6]);

        let view = graph.view(forest, "trees").unwrap();
        let stray = graph.create("leaf", Some("stray")).unwrap();
        let mut favourites: Vec<Value> = trees[..2]
            .iter()
            .map(|tree| Value::Node(graph.children(*tree, "leaves").unwrap()[0]))
            .collect();
        favourites.push(Value::Node(stray));

        let result = view.set(&mut graph, "favourite", Value::List(favourites));
        assert!(matches!(result, Err(GraphError::CrossRootReference { .. })));
        assert!(trees.iter().all(|tree| graph.reference(*tree, "favourite").unwrap().is_none()));
    }

    #[test]
    fn test_set_role_one_to_many_copies() {
        let (mut graph, forest, _) = create_test_forest();
        let trees = graph.view(forest, "trees").unwrap();
        let fresh = graph.create("leaf", Some("fresh")).unwrap();

        trees.set(&mut graph, "leaves", Value::Node(fresh)).unwrap();
        for tree in &trees {
            let leaves = graph.children(tree, "leaves").unwrap();
            assert_eq!(leaves.len(), 1);
            assert_ne!(leaves[0], fresh);
        }
        assert!(graph.parent(fresh).unwrap().is_none());
    }

    #[test]
    fn test_heterogeneous_and_missing_attributes() {
        let (graph, forest, trees) = create_test_forest();
        let leaf = graph.children(trees[0], "leaves").unwrap()[0];
        let mixed = View::new([trees[0], leaf], "mixed", forest);

        assert!(matches!(mixed.get(&graph, "value"), Err(GraphError::UnknownAttribute { .. })));
        let both_values = mixed.get(&graph, "label").unwrap().into_values().unwrap();
        assert_eq!(both_values.len(), 2);

        let empty = View::new([], "empty", forest);
        assert!(matches!(empty.get(&graph, "label"), Err(GraphError::EmptyView(_))));
    }

    #[test]
    fn test_slice_and_filter() {
        let (mut graph, forest, trees) = create_test_forest();
        graph.set_label(trees[1], "oak").unwrap();
        let view = graph.view(forest, "trees").unwrap();

        assert_eq!(view.slice(1..).elements(), &trees[1..]);
        assert_eq!(view.slice(..10).len(), 3);
        assert_eq!(view.slice(2..1).len(), 0);
        assert_eq!(view.filter_label(&graph, "oak").unwrap().elements(), &[trees[1]]);
    }

    #[test]
    fn test_apply_and_detach_all() {
        let (mut graph, forest, _) = create_test_forest();
        let trees = graph.view(forest, "trees").unwrap();

        let nothing = trees.apply(&mut graph, |_, _| Ok(Value::None)).unwrap();
        assert!(nothing.is_none());
        let labels = trees
            .apply(&mut graph, |graph, node| Ok(Value::Text(graph.label(node)?.to_string())))
            .unwrap()
            .unwrap();
        assert_eq!(labels.len(), 3);

        trees.detach_all(&mut graph).unwrap();
        assert!(graph.children(forest, "trees").unwrap().is_empty());
    }

    #[test]
    fn test_reference_gathers_view() {
        let (mut graph, forest, trees) = create_test_forest();
        let view = graph.view(forest, "trees").unwrap();
        let leaves = view.get(&graph, "leaves").unwrap().into_view().unwrap();
        let favourites: Vec<Value> = trees
            .iter()
            .map(|tree| Value::Node(graph.children(*tree, "leaves").unwrap()[1]))
            .collect();

        view.set(&mut graph, "favourite", Value::List(favourites)).unwrap();
        let gathered = view.get(&graph, "favourite").unwrap().into_view().unwrap();
        assert_eq!(gathered.len(), 3);
        assert!(gathered.iter().all(|leaf| leaves.contains(leaf)));
    }
}
