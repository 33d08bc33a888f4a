//! Reference slots
//!
//! A reference is only valid while holder and target share a root. Setting one
//! across trees is rejected, and structural changes clear references that stop
//! satisfying the rule.

use std::collections::HashSet;

use log::trace;

use super::Graph;
use crate::error::{Diagnostic, GraphError, GraphResult};
use crate::foundation::collections::NodeId;
use crate::kind::ReferenceSpec;

impl Graph {
    /// Point a slot at `target`, or clear it with `None`
    ///
    /// On a multi-valued slot this replaces every entry.
    pub fn set_reference(&mut self, holder: NodeId, slot: &str, target: Option<NodeId>) -> GraphResult<()> {
        self.set_references(holder, slot, target.into_iter().collect())
    }

    /// Replace every entry of a slot
    pub fn set_references(&mut self, holder: NodeId, slot: &str, targets: Vec<NodeId>) -> GraphResult<()> {
        self.check_references(holder, slot, &targets)?;
        trace!("{}.{} -> {} target(s)", self.nodes[holder].label, slot, targets.len());
        self.node_mut(holder)?.references.insert(slot.to_string(), targets);
        Ok(())
    }

    /// Append to a multi-valued slot, or replace a single-valued one
    pub fn add_reference(&mut self, holder: NodeId, slot: &str, target: NodeId) -> GraphResult<()> {
        let spec = self.reference_spec(holder, slot)?;
        self.check_target(holder, slot, &spec, target)?;
        let entries = self
            .node_mut(holder)?
            .references
            .entry(slot.to_string())
            .or_default();
        if !spec.many {
            entries.clear();
        }
        entries.push(target);
        Ok(())
    }

    /// Every entry of a slot
    pub fn references(&self, holder: NodeId, slot: &str) -> GraphResult<&[NodeId]> {
        self.reference_spec(holder, slot)?;
        Ok(self.nodes[holder].references.get(slot).map_or(&[][..], Vec::as_slice))
    }

    /// First entry of a slot
    pub fn reference(&self, holder: NodeId, slot: &str) -> GraphResult<Option<NodeId>> {
        Ok(self.references(holder, slot)?.first().copied())
    }

    /// Holders (and slots) in the target's tree that point at `target`
    pub fn referrers(&self, target: NodeId) -> GraphResult<Vec<(NodeId, String)>> {
        let root = self.root(target)?;
        let mut found = Vec::new();
        for holder in self.subtree(root)? {
            for (slot, targets) in &self.nodes[holder].references {
                if targets.contains(&target) {
                    found.push((holder, slot.clone()));
                }
            }
        }
        Ok(found)
    }

    /// Clear every reference in the tree of `root` whose target lives elsewhere
    pub(crate) fn decouple(&mut self, root: NodeId) -> GraphResult<Vec<Diagnostic>> {
        let members = self.subtree(root)?;
        let inside: HashSet<NodeId> = members.iter().copied().collect();
        let mut diagnostics = Vec::new();

        for holder in members {
            for (slot, targets) in &mut self.nodes[holder].references {
                targets.retain(|target| {
                    let keep = inside.contains(target);
                    if !keep {
                        diagnostics.push(Diagnostic::DecoupledReference {
                            holder,
                            slot: slot.clone(),
                            target: *target,
                        });
                    }
                    keep
                });
            }
        }
        Ok(diagnostics)
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    fn reference_spec(&self, holder: NodeId, slot: &str) -> GraphResult<ReferenceSpec> {
        let kind = self.kind_of(holder)?;
        kind.references
            .get(slot)
            .cloned()
            .ok_or_else(|| GraphError::UnknownSlot {
                kind: kind.name.clone(),
                slot: slot.to_string(),
            })
    }

    pub(crate) fn check_references(&self, holder: NodeId, slot: &str, targets: &[NodeId]) -> GraphResult<()> {
        let spec = self.reference_spec(holder, slot)?;
        if !spec.many && targets.len() > 1 {
            return Err(GraphError::invalid(slot, "slot holds a single reference"));
        }
        for &target in targets {
            self.check_target(holder, slot, &spec, target)?;
        }
        Ok(())
    }

    fn check_target(&self, holder: NodeId, slot: &str, spec: &ReferenceSpec, target: NodeId) -> GraphResult<()> {
        let target_kind = self.kind_of(target)?;
        if !spec.accepts.accepts(target_kind) {
            return Err(GraphError::ReferenceTypeMismatch {
                slot: slot.to_string(),
                target_kind: target_kind.name.clone(),
            });
        }
        if self.root(holder)? != self.root(target)? {
            return Err(GraphError::CrossRootReference {
                holder,
                slot: slot.to_string(),
                target,
            });
        }
        Ok(())
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
