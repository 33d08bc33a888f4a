//! # Lattices
//!
//! A lattice repeats a spatial template along a set of directions. The cell
//! at index `(i_0, .., i_n)` is a copy of the template shifted by
//! `i_0 * d_0 + .. + i_n * d_n`. Lattices nest: wrapping a lattice repeats
//! its whole grid, and the outer axes come first.
//!
//! Cells are standalone nodes until attached; attaching a lattice attaches
//! its cells in row-major order.

use log::debug;

use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;
use crate::graph::Graph;
use crate::view::{Grid, Index, LatticeView, Selection};

/// Grid of shifted copies of a spatial template
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    template: NodeId,
    directions: Vec<Vec3>,
    repetitions: Vec<usize>,
    grid: Grid,
}

impl Lattice {
    /// Repeat `template` `repetitions[i]` times along `directions[i]`
    ///
    /// The template is copied first, so later edits to it do not leak into
    /// the lattice.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotSpatial`] for a non-spatial template, and
    /// [`GraphError::InvalidLattice`] when the directions and repetitions are
    /// empty, differ in length or contain a zero repetition.
    pub fn new(graph: &mut Graph, template: NodeId, directions: Vec<Vec3>, repetitions: Vec<usize>) -> GraphResult<Self> {
        graph.require_spatial(template)?;
        Self::check_axes(&directions, &repetitions)?;

        let template = graph.copy(template)?.root;
        let mut created = Vec::new();
        let grid = Grid::Cell(template);
        match Self::repeat(graph, &grid, &directions, &repetitions, &mut created) {
            Ok(grid) => {
                debug!(
                    "Built lattice of '{}' with shape {:?}",
                    graph.label(template)?,
                    repetitions
                );
                Ok(Self {
                    template,
                    directions,
                    repetitions,
                    grid,
                })
            }
            Err(error) => {
                Self::discard_all(graph, created.into_iter().chain([template]));
                Err(error)
            }
        }
    }

    /// Repeat the whole grid of `inner` along further directions
    pub fn wrap(graph: &mut Graph, inner: &Self, directions: Vec<Vec3>, repetitions: Vec<usize>) -> GraphResult<Self> {
        Self::check_axes(&directions, &repetitions)?;

        let mut created = Vec::new();
        let grid = match Self::repeat(graph, &inner.grid, &directions, &repetitions, &mut created) {
            Ok(grid) => grid,
            Err(error) => {
                Self::discard_all(graph, created);
                return Err(error);
            }
        };

        Ok(Self {
            template: inner.template,
            directions: directions.into_iter().chain(inner.directions.iter().copied()).collect(),
            repetitions: repetitions.into_iter().chain(inner.repetitions.iter().copied()).collect(),
            grid,
        })
    }

    /// Private copy of the template the cells were made from
    pub const fn template(&self) -> NodeId {
        self.template
    }

    /// Direction of every axis
    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    /// Repetitions along every axis
    pub fn repetitions(&self) -> &[usize] {
        &self.repetitions
    }

    /// Number of axes
    pub fn n_dim(&self) -> usize {
        self.repetitions.len()
    }

    /// Length of every axis
    pub fn shape(&self) -> Vec<usize> {
        self.grid.shape()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.repetitions.iter().product()
    }

    /// Always false; axes have at least one repetition
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells in row-major order
    pub fn nodes(&self) -> Vec<NodeId> {
        self.grid.nodes()
    }

    /// Broadcast view over the whole grid
    pub fn view(&self) -> LatticeView {
        LatticeView::new(self.grid.clone(), self.template)
    }

    /// See [`LatticeView::index`]
    pub fn index(&self, keys: &[Index]) -> GraphResult<Selection> {
        self.view().index(keys)
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    fn check_axes(directions: &[Vec3], repetitions: &[usize]) -> GraphResult<()> {
        if directions.is_empty() {
            return Err(GraphError::InvalidLattice("at least one direction is required".to_string()));
        }
        if directions.len() != repetitions.len() {
            return Err(GraphError::InvalidLattice(format!(
                "{} directions but {} repetitions",
                directions.len(),
                repetitions.len()
            )));
        }
        if repetitions.contains(&0) {
            return Err(GraphError::InvalidLattice("repetitions must be positive".to_string()));
        }
        Ok(())
    }

    /// Shifted copies of `unit` for every index of the given axes
    fn repeat(
        graph: &mut Graph,
        unit: &Grid,
        directions: &[Vec3],
        repetitions: &[usize],
        created: &mut Vec<NodeId>,
    ) -> GraphResult<Grid> {
        Self::repeat_axis(graph, unit, directions, repetitions, Vec3::zeros(), created)
    }

    fn repeat_axis(
        graph: &mut Graph,
        unit: &Grid,
        directions: &[Vec3],
        repetitions: &[usize],
        offset: Vec3,
        created: &mut Vec<NodeId>,
    ) -> GraphResult<Grid> {
        let (Some((direction, directions)), Some((count, repetitions))) =
            (directions.split_first(), repetitions.split_first())
        else {
            return unit.try_map(&mut |cell| {
                let copy = graph.shifted_copy(cell, offset)?.root;
                created.push(copy);
                Ok(copy)
            });
        };

        let mut items = Vec::with_capacity(*count);
        for step in 0..*count {
            #[allow(clippy::cast_precision_loss)]
            let shift = offset + direction * step as f32;
            items.push(Self::repeat_axis(graph, unit, directions, repetitions, shift, created)?);
        }
        Ok(Grid::Axis(items))
    }

    fn discard_all<I: IntoIterator<Item = NodeId>>(graph: &mut Graph, nodes: I) {
        for node in nodes {
            if graph.discard(node).is_err() {
                debug!("Lattice cell already gone during cleanup");
            }
        }
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
