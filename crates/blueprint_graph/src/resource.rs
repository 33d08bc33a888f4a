//! Shared resources with copy-on-write
//!
//! Heavy payloads (mesh data, height fields) are stored once and bound to any
//! number of nodes through resource slots. Copying a node adds an owner instead
//! of duplicating the payload. Mutation goes through
//! [`Graph::modify_resource`], which first splits the resource off if other
//! owners would observe the change.
//!
//! A frozen resource is mutated in place regardless of its owner count, which
//! lets a multi-step construction avoid a copy per step.

use log::{debug, trace};

use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::{IndexMap, IndexSet, NodeId, ResourceId};
use crate::graph::Graph;
use crate::value::Value;

/// Payload of a shared resource
pub type Payload = IndexMap<String, Value>;

/// Deduplicated, owner-tracked payload
#[derive(Debug, Clone, PartialEq)]
pub struct SharedResource {
    payload: Payload,
    owners: IndexSet<NodeId>,
    frozen: bool,
}

impl SharedResource {
    fn new(payload: Payload) -> Self {
        Self {
            payload,
            owners: IndexSet::new(),
            frozen: false,
        }
    }

    /// Payload entries
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// One payload entry
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Nodes bound to this resource, in binding order
    pub const fn owners(&self) -> &IndexSet<NodeId> {
        &self.owners
    }

    /// Number of owners
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Whether copy-on-write is suspended
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }
}

impl Graph {
    /// Store a payload; it has no owners until bound with [`Graph::attach_owner`]
    pub fn create_resource(&mut self, payload: Payload) -> ResourceId {
        let id = self.resources.insert(SharedResource::new(payload));
        debug!("Created resource {:?}", id);
        id
    }

    /// Resource by handle
    pub fn resource(&self, id: ResourceId) -> GraphResult<&SharedResource> {
        self.resources.get(id).ok_or(GraphError::UnknownResource(id))
    }

    /// Bind `resource` to the resource slot `slot` of `node`
    ///
    /// A resource previously bound in that slot loses `node` as an owner.
    pub fn attach_owner(&mut self, resource: ResourceId, node: NodeId, slot: &str) -> GraphResult<()> {
        self.resource(resource)?;
        self.check_resource_slot(node, slot)?;

        let previous = self.field(node, slot)?.as_resource();
        if let Some(previous) = previous {
            if previous == resource {
                return Ok(());
            }
            self.release_owner(previous, node);
        }
        if let Some(shared) = self.resources.get_mut(resource) {
            shared.owners.insert(node);
        }
        self.node_mut(node)?.fields.insert(slot.to_string(), Value::Resource(resource));
        trace!("{:?} now owns {:?} through '{}'", node, resource, slot);
        Ok(())
    }

    /// Unbind `resource` from every slot of `node`
    pub fn remove_owner(&mut self, resource: ResourceId, node: NodeId) -> GraphResult<()> {
        self.resource(resource)?;
        let slots: Vec<String> = self
            .node(node)?
            .fields
            .iter()
            .filter(|(_, value)| value.as_resource() == Some(resource))
            .map(|(slot, _)| slot.clone())
            .collect();
        if slots.is_empty() {
            return Err(GraphError::NotAnOwner {
                node,
                slot: String::new(),
            });
        }
        for slot in slots {
            self.node_mut(node)?.fields.insert(slot, Value::None);
        }
        self.release_owner(resource, node);
        Ok(())
    }

    /// Make the resource in `slot` safe for `node` to mutate
    ///
    /// Returns the bound resource when `node` is its only owner or it is
    /// frozen. Otherwise the payload is cloned into a fresh resource, `node`
    /// is moved over to it, and the clone is returned.
    pub fn prepare_for_mutation(&mut self, node: NodeId, slot: &str) -> GraphResult<ResourceId> {
        self.check_resource_slot(node, slot)?;
        let resource = self
            .field(node, slot)?
            .as_resource()
            .ok_or_else(|| GraphError::NotAnOwner {
                node,
                slot: slot.to_string(),
            })?;
        let shared = self.resource(resource)?;
        if !shared.owners.contains(&node) {
            return Err(GraphError::NotAnOwner {
                node,
                slot: slot.to_string(),
            });
        }
        if shared.frozen || shared.owner_count() <= 1 {
            return Ok(resource);
        }

        let payload = shared.payload.clone();
        let clone = self.create_resource(payload);
        self.attach_owner(clone, node, slot)?;
        debug!("Split {:?} off {:?} for {:?}", clone, resource, node);
        Ok(clone)
    }

    /// Mutate the payload bound in `slot` of `node`, splitting it first if shared
    pub fn modify_resource<F>(&mut self, node: NodeId, slot: &str, modify: F) -> GraphResult<ResourceId>
    where
        F: FnOnce(&mut Payload),
    {
        let resource = self.prepare_for_mutation(node, slot)?;
        let shared = self
            .resources
            .get_mut(resource)
            .ok_or(GraphError::UnknownResource(resource))?;
        modify(&mut shared.payload);
        Ok(resource)
    }

    /// Suspend copy-on-write
    pub fn freeze(&mut self, resource: ResourceId) -> GraphResult<()> {
        self.set_frozen(resource, true)
    }

    /// Resume copy-on-write
    pub fn unfreeze(&mut self, resource: ResourceId) -> GraphResult<()> {
        self.set_frozen(resource, false)
    }

    /// Number of live resources
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    fn set_frozen(&mut self, resource: ResourceId, frozen: bool) -> GraphResult<()> {
        let shared = self
            .resources
            .get_mut(resource)
            .ok_or(GraphError::UnknownResource(resource))?;
        shared.frozen = frozen;
        Ok(())
    }

    fn check_resource_slot(&self, node: NodeId, slot: &str) -> GraphResult<()> {
        let kind = self.kind_of(node)?;
        if kind.is_resource_slot(slot) {
            Ok(())
        } else {
            Err(GraphError::UnknownSlot {
                kind: kind.name.clone(),
                slot: slot.to_string(),
            })
        }
    }

    /// Clear a resource slot, releasing whatever it held
    pub(crate) fn release_slot(&mut self, node: NodeId, slot: &str) -> GraphResult<()> {
        self.check_resource_slot(node, slot)?;
        if let Some(resource) = self.field(node, slot)?.as_resource() {
            self.node_mut(node)?.fields.insert(slot.to_string(), Value::None);
            let still_bound = self.nodes[node]
                .fields
                .values()
                .any(|value| value.as_resource() == Some(resource));
            if !still_bound {
                self.release_owner(resource, node);
            }
        }
        Ok(())
    }

    /// Drop `node` from the owners; reclaim the resource once nobody owns it
    pub(crate) fn release_owner(&mut self, resource: ResourceId, node: NodeId) {
        let Some(shared) = self.resources.get_mut(resource) else {
            return;
        };
        shared.owners.shift_remove(&node);
        if shared.owners.is_empty() {
            self.resources.remove(resource);
            debug!("Reclaimed resource {:?}", resource);
        }
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
