//! Cross-reference migration
//!
//! When a subtree is deep-copied, reference slots inside it have to point at
//! the copies of their targets, not at the originals. A [`Migration`] lives
//! for exactly one copy:
//!
//! 1. [`Migration::plan`] counts, for every node of the copied region, how many
//!    references held inside the region point at it.
//! 2. While the copy walk runs, [`Migration::adopt`] records each new node and
//!    [`Migration::request`] resolves each reference, either immediately or
//!    once the target's copy exists.
//! 3. [`Migration::finish`] writes the rewired slots into the copies and checks
//!    that every planned target was reached.
//!
//! References whose target lies outside the region are dropped from the copy
//! and reported as [`Diagnostic::DroppedReference`].

use std::collections::{HashMap, HashSet};

use log::trace;

use crate::error::{Diagnostic, GraphError, GraphResult};
use crate::foundation::collections::{IndexMap, NodeId};
use crate::graph::Graph;

/// Bookkeeping for one deep copy
#[derive(Debug, Default)]
pub(crate) struct Migration {
    region: HashSet<NodeId>,
    expected: HashMap<NodeId, usize>,
    observed: HashMap<NodeId, usize>,
    copies: HashMap<NodeId, NodeId>,
    pending: HashMap<NodeId, Vec<(NodeId, String, usize)>>,
    migrated: HashSet<(NodeId, String, usize)>,
    staged: IndexMap<(NodeId, String), Vec<Option<NodeId>>>,
    completed: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Migration {
    /// Count the references held inside `region` that target `region`
    pub(crate) fn plan(graph: &Graph, region: &[NodeId]) -> Self {
        let mut migration = Self {
            region: region.iter().copied().collect(),
            ..Self::default()
        };
        for node in region {
            let Some(data) = graph.nodes.get(*node) else {
                continue;
            };
            for target in data.references.values().flatten() {
                if migration.region.contains(target) {
                    *migration.expected.entry(*target).or_default() += 1;
                }
            }
        }
        trace!(
            "Migration planned: {} node(s), {} referenced target(s)",
            region.len(),
            migration.expected.len()
        );
        migration
    }

    /// Record `copy` as the single copy of `original`
    pub(crate) fn adopt(&mut self, original: NodeId, copy: NodeId) {
        self.copies.insert(original, copy);
        if let Some(requests) = self.pending.remove(&original) {
            for (holder, slot, index) in requests {
                self.stage(holder, &slot, index, copy);
                self.observe(original);
            }
        }
    }

    /// Resolve entry `index` of `slot`, held by `original_holder` and copied
    /// into `copy_holder`
    pub(crate) fn request(
        &mut self,
        original_holder: NodeId,
        copy_holder: NodeId,
        slot: &str,
        index: usize,
        target: NodeId,
    ) -> GraphResult<()> {
        if !self.migrated.insert((original_holder, slot.to_string(), index)) {
            return Err(GraphError::DoubleMigration {
                holder: original_holder,
                slot: slot.to_string(),
                index,
            });
        }

        let entries = self.staged.entry((copy_holder, slot.to_string())).or_default();
        if entries.len() <= index {
            entries.resize(index + 1, None);
        }

        if !self.region.contains(&target) {
            self.diagnostics.push(Diagnostic::DroppedReference {
                holder: original_holder,
                copy: copy_holder,
                slot: slot.to_string(),
                target,
            });
            return Ok(());
        }

        if let Some(copy) = self.copies.get(&target).copied() {
            self.stage(copy_holder, slot, index, copy);
            self.observe(target);
        } else {
            trace!("Deferring {}[{}] until its target is copied", slot, index);
            self.pending
                .entry(target)
                .or_default()
                .push((copy_holder, slot.to_string(), index));
        }
        Ok(())
    }

    /// Absorb diagnostics from a nested copy
    pub(crate) fn absorb(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Whether `original` has had all its planned references rewired
    #[cfg(test)]
    pub(crate) fn is_migrated(&self, original: NodeId) -> bool {
        self.copies.contains_key(&original) && !self.expected.contains_key(&original)
    }

    /// Write the rewired slots and check every planned target was reached
    pub(crate) fn finish(&mut self, graph: &mut Graph) -> GraphResult<Vec<Diagnostic>> {
        if !self.expected.is_empty() || !self.pending.is_empty() {
            return Err(GraphError::IncompleteMigration {
                remaining: self.expected.len().max(self.pending.len()),
            });
        }
        for ((holder, slot), entries) in std::mem::take(&mut self.staged) {
            let targets: Vec<NodeId> = entries.into_iter().flatten().collect();
            graph.node_mut(holder)?.references.insert(slot, targets);
        }
        trace!("Migration finished: {} target(s) fully migrated", self.completed);
        Ok(std::mem::take(&mut self.diagnostics))
    }

    fn stage(&mut self, holder: NodeId, slot: &str, index: usize, target: NodeId) {
        if let Some(entry) = self
            .staged
            .get_mut(&(holder, slot.to_string()))
            .and_then(|entries| entries.get_mut(index))
        {
            *entry = Some(target);
        }
    }

    fn observe(&mut self, original: NodeId) {
        let observed = self.observed.entry(original).or_default();
        *observed += 1;
        let done = self.expected.get(&original).is_some_and(|expected| *observed >= *expected);
        if done {
            self.expected.remove(&original);
            self.observed.remove(&original);
            self.completed += 1;
            trace!("Target {:?} fully migrated", original);
        }
    }
}
