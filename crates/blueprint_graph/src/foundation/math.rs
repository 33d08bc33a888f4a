//! Math utilities and types
//!
//! Provides the vector and rotation types stored in node fields, plus the rigid
//! placement used when an attach has to preserve a node's absolute pose.

pub use nalgebra::{
    Isometry3,
    Quaternion,
    Translation3,
    Unit,
    Vector3,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid placement: a position and an orientation, no scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position relative to the parent frame
    pub position: Vec3,

    /// Rotation relative to the parent frame
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with position and rotation
    pub const fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a transform from a translation vector
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to an isometry
    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    /// Create a transform from an isometry
    pub fn from_isometry(isometry: &Isometry3<f32>) -> Self {
        Self {
            position: isometry.translation.vector,
            rotation: isometry.rotation,
        }
    }

    /// Combine this transform with a child transform expressed in its frame
    pub fn combine(&self, other: &Self) -> Self {
        Self::from_isometry(&(self.to_isometry() * other.to_isometry()))
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> Self {
        Self::from_isometry(&self.to_isometry().inverse())
    }

    /// Express an absolute transform relative to `self` as the parent frame
    pub fn relative(&self, absolute: &Self) -> Self {
        self.inverse().combine(absolute)
    }
}
