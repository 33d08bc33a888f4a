//! # Blueprint Graph
//!
//! Scene-graph construction for simulation models. Nodes are created as
//! standalone templates and instantiated by attaching copies under a parent.
//!
//! ## Features
//!
//! - **Copy-on-attach**: templates stay untouched and can be reused
//! - **Typed roles**: each kind declares which kinds its child collections accept
//! - **References**: non-owning pointers between nodes of one tree, carried
//!   over by copies when the target is copied too
//! - **Names**: unique names per kind within each tree, with stable suffixes
//! - **Broadcast views**: read and write an attribute across many nodes at once
//! - **Lattices**: grids of shifted copies of a spatial template
//! - **Shared resources**: copy-on-write payloads bound to several nodes
//!
//! ## Quick Start
//!
//! ```rust
//! use blueprint_graph::prelude::*;
//!
//! let mut graph = Graph::with_standard_kinds(GraphConfig::default())?;
//! let world = graph.create("world", Some("arena"))?;
//! let body = graph.create("body", Some("crate"))?;
//! let geom = graph.create("geom", None)?;
//! graph.attach(body, [geom], AttachOptions::moving())?;
//!
//! let crates = Lattice::new(&mut graph, body, vec![Vec3::x(), Vec3::y()], vec![2, 2])?;
//! graph.attach(world, [&crates], AttachOptions::moving())?;
//!
//! let bodies = graph.view(world, "bodies")?;
//! let geoms = bodies.get(&graph, "geoms")?.into_view().unwrap();
//! geoms.set(&mut graph, "mass", 2.5_f32)?;
//! assert_eq!(geoms.len(), 4);
//! # Ok::<(), GraphError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod error;
pub mod value;
pub mod kind;
pub mod node;
pub mod graph;
pub mod resource;
pub mod naming;
pub mod view;
pub mod lattice;
pub mod catalog;
pub mod outline;

mod migration;

#[cfg(test)]
mod tests;

pub use error::{Diagnostic, GraphError, GraphResult};
pub use graph::Graph;

/// Common imports for graph users
pub mod prelude {
    pub use crate::{
        config::{Config, GraphConfig},
        error::{Diagnostic, GraphError, GraphResult},
        foundation::{
            collections::{KindId, NodeId, ResourceId},
            math::{Quat, Transform, Vec3},
        },
        graph::{AttachOptions, Attribute, Graph, Overrides},
        kind::{Capabilities, KindBuilder, KindFilter},
        lattice::Lattice,
        outline::Outline,
        value::Value,
        view::{AllView, FunctionHandle, Gathered, Index, LatticeView, Outcome, Selection, View},
    };
}
