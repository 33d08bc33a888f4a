//! Rigid placement of spatial nodes
//!
//! A spatial node stores its pose relative to its parent in the `pos` and
//! `quat` fields. Non-spatial ancestors contribute the identity.

use super::{Copied, Graph, Overrides};
use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::kind::{POSITION_FIELD, ROTATION_FIELD};
use crate::value::Value;

impl Graph {
    /// Pose relative to the parent; identity for non-spatial nodes
    pub fn local_transform(&self, node: NodeId) -> GraphResult<Transform> {
        if !self.kind_of(node)?.is_spatial() {
            return Ok(Transform::identity());
        }
        let position = self.field(node, POSITION_FIELD)?.as_vec3().unwrap_or_else(Vec3::zeros);
        let rotation = self.field(node, ROTATION_FIELD)?.as_quat().unwrap_or_else(Quat::identity);
        Ok(Transform::from_position_rotation(position, rotation))
    }

    /// Pose relative to the root of the tree
    pub fn global_transform(&self, node: NodeId) -> GraphResult<Transform> {
        let mut absolute = Transform::identity();
        for step in self.path(node)? {
            absolute = absolute.combine(&self.local_transform(step)?);
        }
        Ok(absolute)
    }

    /// Set the pose relative to the parent
    pub fn set_local_transform(&mut self, node: NodeId, transform: &Transform) -> GraphResult<()> {
        self.require_spatial(node)?;
        self.set_field(node, POSITION_FIELD, Value::Vec3(transform.position))?;
        self.set_field(node, ROTATION_FIELD, Value::Quat(transform.rotation))
    }

    /// Set the local pose so that the pose relative to the root becomes `absolute`
    pub fn set_global_transform(&mut self, node: NodeId, absolute: &Transform) -> GraphResult<()> {
        let frame = match self.parent(node)? {
            Some(parent) => self.global_transform(parent)?,
            None => Transform::identity(),
        };
        self.set_local_transform(node, &frame.relative(absolute))
    }

    /// Copy of a spatial node moved by `offset`
    pub fn shifted_copy(&mut self, node: NodeId, offset: Vec3) -> GraphResult<Copied> {
        let position = self.local_transform(node)?.position;
        self.relocated_copy(node, position + offset)
    }

    /// Copy of a spatial node placed at `position`
    pub fn relocated_copy(&mut self, node: NodeId, position: Vec3) -> GraphResult<Copied> {
        self.require_spatial(node)?;
        self.copy_with(node, &Overrides::new().field(POSITION_FIELD, Value::Vec3(position)))
    }

    pub(crate) fn require_spatial(&self, node: NodeId) -> GraphResult<()> {
        let kind = self.kind_of(node)?;
        if kind.is_spatial() {
            Ok(())
        } else {
            Err(GraphError::NotSpatial {
                kind: kind.name.clone(),
            })
        }
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
