//! N-dimensional views over lattice grids

use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull};

use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::NodeId;
use crate::graph::Graph;
use crate::value::Value;

use super::{assign_all, classify, shaped_like, FunctionHandle, Gather, Gathered, View};

/// Nested grid of nodes; every axis of one depth has the same length
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grid {
    /// A single node
    Cell(NodeId),
    /// One axis of sub-grids
    Axis(Vec<Grid>),
}

impl Grid {
    /// Number of axes
    pub fn n_dim(&self) -> usize {
        match self {
            Self::Cell(_) => 0,
            Self::Axis(items) => 1 + items.first().map_or(0, Self::n_dim),
        }
    }

    /// Length of every axis
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut current = self;
        while let Self::Axis(items) = current {
            shape.push(items.len());
            match items.first() {
                Some(first) => current = first,
                None => break,
            }
        }
        shape
    }

    /// Cells in row-major order
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        self.collect_into(&mut nodes);
        nodes
    }

    /// Grid of the same structure with every cell replaced by `f(cell)`
    pub fn try_map<F>(&self, f: &mut F) -> GraphResult<Self>
    where
        F: FnMut(NodeId) -> GraphResult<NodeId>,
    {
        Ok(match self {
            Self::Cell(node) => Self::Cell(f(*node)?),
            Self::Axis(items) => Self::Axis(items.iter().map(|item| item.try_map(f)).collect::<GraphResult<_>>()?),
        })
    }

    fn collect_into(&self, nodes: &mut Vec<NodeId>) {
        match self {
            Self::Cell(node) => nodes.push(*node),
            Self::Axis(items) => items.iter().for_each(|item| item.collect_into(nodes)),
        }
    }

    fn values<F>(&self, f: &mut F) -> GraphResult<Value>
    where
        F: FnMut(NodeId) -> GraphResult<Value>,
    {
        match self {
            Self::Cell(node) => f(*node),
            Self::Axis(items) => Ok(Value::List(
                items.iter().map(|item| item.values(f)).collect::<GraphResult<_>>()?,
            )),
        }
    }

    fn select(&self, keys: &[Index]) -> GraphResult<Self> {
        let Some((key, rest)) = keys.split_first() else {
            return Ok(self.clone());
        };
        let Self::Axis(items) = self else {
            return Err(GraphError::TooManyIndices {
                given: keys.len(),
                dims: 0,
            });
        };
        match *key {
            Index::At(index) => items
                .get(index)
                .ok_or(GraphError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                })?
                .select(rest),
            Index::Span { start, end, step } => {
                let end = end.unwrap_or(items.len()).min(items.len());
                let selected = items
                    .get(start.min(end)..end)
                    .unwrap_or_default()
                    .iter()
                    .step_by(step.max(1))
                    .map(|item| item.select(rest))
                    .collect::<GraphResult<_>>()?;
                Ok(Self::Axis(selected))
            }
        }
    }
}

/// One key of a lattice index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    /// A single position; removes the axis
    At(usize),
    /// Every `step`-th position of `start..end`; keeps the axis
    Span {
        /// First position
        start: usize,
        /// Position past the last one; `None` runs to the end of the axis
        end: Option<usize>,
        /// Distance between selected positions
        step: usize,
    },
}

impl Index {
    /// The whole axis
    pub const fn all() -> Self {
        Self::Span {
            start: 0,
            end: None,
            step: 1,
        }
    }

    /// The same span taking every `step`-th position
    #[must_use]
    pub const fn with_step(self, step: usize) -> Self {
        match self {
            Self::At(index) => Self::At(index),
            Self::Span { start, end, .. } => Self::Span { start, end, step },
        }
    }
}

impl From<usize> for Index {
    fn from(index: usize) -> Self {
        Self::At(index)
    }
}

impl From<Range<usize>> for Index {
    fn from(range: Range<usize>) -> Self {
        Self::Span {
            start: range.start,
            end: Some(range.end),
            step: 1,
        }
    }
}

impl From<RangeFrom<usize>> for Index {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::Span {
            start: range.start,
            end: None,
            step: 1,
        }
    }
}

impl From<RangeFull> for Index {
    fn from(_: RangeFull) -> Self {
        Self::all()
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(index) => write!(f, "{index}"),
            Self::Span { start, end, step } => {
                write!(f, "{start}:")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                if *step != 1 {
                    write!(f, ":{step}")?;
                }
                Ok(())
            }
        }
    }
}

/// Result of indexing a lattice view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every axis was indexed with a position
    Node(NodeId),
    /// Sub-grid
    View(LatticeView),
}

/// Broadcast view shaped like a grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeView {
    grid: Grid,
    keys: Option<String>,
    anchor: NodeId,
}

impl LatticeView {
    /// View over `grid`; gathered views are anchored at `anchor`
    pub const fn new(grid: Grid, anchor: NodeId) -> Self {
        Self {
            grid,
            keys: None,
            anchor,
        }
    }

    /// Underlying grid
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of axes
    pub fn n_dim(&self) -> usize {
        self.grid.n_dim()
    }

    /// Length of every axis
    pub fn shape(&self) -> Vec<usize> {
        self.grid.shape()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Whether some axis is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells in row-major order
    pub fn nodes(&self) -> Vec<NodeId> {
        self.grid.nodes()
    }

    /// Cells as a flat [`View`]
    pub fn as_view(&self) -> View {
        View::new(self.nodes(), "lattice", self.anchor)
    }

    /// `LatticeView[<keys>]`, or `LatticeView` when not indexed
    pub fn display(&self) -> String {
        match &self.keys {
            Some(keys) => format!("LatticeView[{keys}]"),
            None => "LatticeView".to_string(),
        }
    }

    /// Select part of the grid
    ///
    /// Indexing every axis with [`Index::At`] yields the node in that cell.
    ///
    /// # Errors
    ///
    /// [`GraphError::TooManyIndices`] when more keys than axes are given,
    /// [`GraphError::IndexOutOfBounds`] for a position past an axis.
    pub fn index(&self, keys: &[Index]) -> GraphResult<Selection> {
        let dims = self.n_dim();
        if keys.len() > dims {
            return Err(GraphError::TooManyIndices {
                given: keys.len(),
                dims,
            });
        }
        let selected = self.grid.select(keys)?;
        if let Grid::Cell(node) = selected {
            return Ok(Selection::Node(node));
        }
        let keys = keys.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        Ok(Selection::View(Self {
            grid: selected,
            keys: Some(keys),
            anchor: self.anchor,
        }))
    }

    /// Gather `attr` from every cell
    ///
    /// Plain values come back nested with the grid's shape.
    pub fn get(&self, graph: &Graph, attr: &str) -> GraphResult<Gathered> {
        let cells = self.nodes();
        let name = format!("lattice.{attr}");
        Ok(match classify(graph, &cells, attr, &self.display())? {
            Gather::Edges(nodes) => Gathered::View(View::new(nodes, name, self.anchor)),
            Gather::Operations => Gathered::Function(FunctionHandle::new(cells, attr, name, self.anchor)),
            Gather::Values(values) if values.iter().all(|value| value.as_node().is_some()) => {
                Gathered::View(View::new(values.iter().filter_map(Value::as_node), name, self.anchor))
            }
            Gather::Values(_) => match self.current(graph, attr)? {
                Value::List(rows) => Gathered::Values(rows),
                single => Gathered::Values(vec![single]),
            },
        })
    }

    /// Broadcast `value` into `attr` of every cell
    ///
    /// A value nested exactly like the current values is assigned cell by
    /// cell; anything else is assigned to every cell.
    pub fn set(&self, graph: &mut Graph, attr: &str, value: impl Into<Value>) -> GraphResult<()> {
        let value = value.into();
        let cells = self.nodes();
        let (_, edges) = super::current_values(graph, &cells, attr, &self.display())?;
        let current = self.current(graph, attr)?;

        let writes = if Self::aligned(&self.grid, &current, &value, edges) {
            let mut writes = Vec::with_capacity(cells.len());
            Self::zipped_writes(&self.grid, attr, value, &mut writes)?;
            writes
        } else {
            cells.into_iter().map(|cell| (cell, value.clone(), true)).collect()
        };
        assign_all(graph, attr, writes)
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    fn current(&self, graph: &Graph, attr: &str) -> GraphResult<Value> {
        self.grid
            .values(&mut |cell| graph.attribute(cell, attr).map(|attribute| attribute.to_value()))
    }

    fn aligned(grid: &Grid, current: &Value, value: &Value, edges: bool) -> bool {
        match (grid, current, value) {
            (Grid::Cell(_), current, value) => shaped_like(current, value, edges),
            (Grid::Axis(items), Value::List(currents), Value::List(values)) => {
                items.len() == values.len()
                    && items
                        .iter()
                        .zip(currents)
                        .zip(values)
                        .all(|((item, current), value)| Self::aligned(item, current, value, edges))
            }
            _ => false,
        }
    }

    fn zipped_writes(
        grid: &Grid,
        attr: &str,
        value: Value,
        writes: &mut Vec<(NodeId, Value, bool)>,
    ) -> GraphResult<()> {
        match (grid, value) {
            (Grid::Cell(cell), value) => {
                writes.push((*cell, value, false));
                Ok(())
            }
            (Grid::Axis(items), Value::List(values)) => {
                for (item, value) in items.iter().zip(values) {
                    Self::zipped_writes(item, attr, value, writes)?;
                }
                Ok(())
            }
            (_, other) => Err(GraphError::invalid(attr, format!("expected a list, got {}", other.type_name()))),
        }
    }
}

impl From<&LatticeView> for Value {
    fn from(lattice: &LatticeView) -> Self {
        Self::from(lattice.nodes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::KindBuilder;

    fn create_test_grid() -> (Graph, LatticeView) {
        let mut graph = Graph::new();
        graph
            .register_kind(KindBuilder::new("cell").spatial().field("value", 0_i64))
            .unwrap();
        let anchor = graph.create("cell", Some("anchor")).unwrap();
        let rows = (0..2)
            .map(|_| {
                Grid::Axis(
                    (0..3)
                        .map(|_| Grid::Cell(graph.create("cell", None).unwrap()))
                        .collect(),
                )
            })
            .collect();
        (graph, LatticeView::new(Grid::Axis(rows), anchor))
    }

    #[test]
    fn test_shape_and_order() {
        let (_, lattice) = create_test_grid();
        assert_eq!(lattice.n_dim(), 2);
        assert_eq!(lattice.shape(), vec![2, 3]);
        assert_eq!(lattice.len(), 6);
        assert_eq!(lattice.display(), "LatticeView");
    }

    #[test]
    fn test_index() {
        let (_, lattice) = create_test_grid();
        let nodes = lattice.nodes();

        assert_eq!(lattice.index(&[1.into(), 2.into()]).unwrap(), Selection::Node(nodes[5]));

        let Selection::View(row) = lattice.index(&[1.into()]).unwrap() else {
            panic!("expected a view");
        };
        assert_eq!(row.shape(), vec![3]);
        assert_eq!(row.nodes(), nodes[3..].to_vec());
        assert_eq!(row.display(), "LatticeView[1]");

        let Selection::View(column) = lattice.index(&[Index::all(), 0.into()]).unwrap() else {
            panic!("expected a view");
        };
        assert_eq!(column.nodes(), vec![nodes[0], nodes[3]]);

        let Selection::View(stepped) = lattice.index(&[Index::all(), Index::all().with_step(2)]).unwrap() else {
            panic!("expected a view");
        };
        assert_eq!(stepped.shape(), vec![2, 2]);
    }

    #[test]
    fn test_index_errors() {
        let (_, lattice) = create_test_grid();
        assert_eq!(
            lattice.index(&[0.into(), 0.into(), 0.into()]),
            Err(GraphError::TooManyIndices { given: 3, dims: 2 })
        );
        assert_eq!(
            lattice.index(&[2.into()]),
            Err(GraphError::IndexOutOfBounds { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_get_nests_values() {
        let (graph, lattice) = create_test_grid();
        let values = lattice.get(&graph, "value").unwrap().into_values().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], Value::List(vec![Value::Int(0); 3]));
    }

    #[test]
    fn test_set_zips_matching_shape() {
        let (mut graph, lattice) = create_test_grid();
        let rows = Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Value::List(vec![Value::Int(4), Value::Int(5), Value::Int(6)]),
        ]);
        lattice.set(&mut graph, "value", rows.clone()).unwrap();
        assert_eq!(Value::List(lattice.get(&graph, "value").unwrap().into_values().unwrap()), rows);

        lattice.set(&mut graph, "value", 9_i64).unwrap();
        for cell in lattice.nodes() {
            assert_eq!(graph.field(cell, "value").unwrap(), &Value::Int(9));
        }
    }

    #[test]
    fn test_rejected_cell_leaves_grid_untouched() {
        let (mut graph, lattice) = create_test_grid();
        let rows = Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Value::List(vec![Value::Int(4), Value::Int(5), Value::Text("six".into())]),
        ]);
        let result = lattice.set(&mut graph, "value", rows);
        assert!(matches!(result, Err(GraphError::InvalidValue { .. })));
        for cell in lattice.nodes() {
            assert_eq!(graph.field(cell, "value").unwrap(), &Value::Int(0));
        }
    }
}
