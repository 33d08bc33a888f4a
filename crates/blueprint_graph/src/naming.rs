//! Name authority
//!
//! User labels need not be unique; exposed names must be, among nodes of the
//! same kind in one tree. Resolution groups the descendants of a root by kind,
//! then by current name, and suffixes every member of a group larger than one
//! with its position in the group: `rock`, `rock` become `rock_(0)`,
//! `rock_(1)`. A suffixed name can collide with an existing label, so the pass
//! repeats on the new names until every group has a single member.

use log::{trace, warn};

use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::{IndexMap, KindId, NodeId};
use crate::graph::Graph;

/// Outcome of a resolution run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Names in input order
    pub names: Vec<String>,
    /// Renaming rounds performed
    pub rounds: u32,
    /// Whether every name is unique within its kind
    pub converged: bool,
}

/// Resolve unique names for `(kind, label)` entries given in descendant order
pub fn resolve(entries: &[(KindId, String)], max_rounds: u32) -> Resolution {
    let mut names: Vec<String> = entries.iter().map(|(_, label)| label.clone()).collect();
    let mut rounds = 0;

    loop {
        let mut groups: IndexMap<(KindId, &str), Vec<usize>> = IndexMap::new();
        for (index, (kind, _)) in entries.iter().enumerate() {
            groups.entry((*kind, names[index].as_str())).or_default().push(index);
        }
        let conflicts: Vec<Vec<usize>> = groups
            .into_values()
            .filter(|members| members.len() > 1)
            .collect();

        if conflicts.is_empty() {
            return Resolution { names, rounds, converged: true };
        }
        if rounds == max_rounds {
            return Resolution { names, rounds, converged: false };
        }

        for members in conflicts {
            for (position, index) in members.into_iter().enumerate() {
                names[index] = format!("{}_({})", names[index], position);
            }
        }
        rounds += 1;
        trace!("Naming round {} complete", rounds);
    }
}

impl Graph {
    /// Recompute the exposed names of every descendant of `root`
    ///
    /// The root keeps its label. On [`GraphError::NamingDidNotConverge`] the
    /// names of the last round stay in place.
    pub fn register_names(&mut self, root: NodeId) -> GraphResult<()> {
        let descendants = self.descendant_list(root)?;
        let entries: Vec<(KindId, String)> = descendants
            .iter()
            .map(|node| (self.nodes[*node].kind, self.nodes[*node].label.clone()))
            .collect();

        let resolution = resolve(&entries, self.config().naming.max_rounds);
        self.node_mut(root)?.exposed = None;
        for (node, name) in descendants.into_iter().zip(resolution.names) {
            self.nodes[node].exposed = Some(name);
        }

        if resolution.converged {
            Ok(())
        } else {
            warn!("Names under '{}' still collide after {} rounds", self.nodes[root].label, resolution.rounds);
            Err(GraphError::NamingDidNotConverge {
                root,
                rounds: resolution.rounds,
            })
        }
    }

    /// Clear the exposed names of `root` and its descendants
    pub fn unregister_names(&mut self, root: NodeId) -> GraphResult<()> {
        for node in self.subtree(root)? {
            self.nodes[node].exposed = None;
        }
        Ok(())
    }

    /// Node of kind `kind` exposed as `name` in the tree of `root`
    pub fn find_by_name(&self, root: NodeId, kind: &str, name: &str) -> GraphResult<Option<NodeId>> {
        let kind = self.kind_id(kind)?;
        Ok(self
            .descendant_list(root)?
            .into_iter()
            .find(|node| self.nodes[*node].kind == kind && self.nodes[*node].name() == name))
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
