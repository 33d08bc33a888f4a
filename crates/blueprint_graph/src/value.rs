//! Dynamic field values
//!
//! Every attribute read through the graph is expressed as a [`Value`].
//! Views compare the nesting [`Shape`] of values to decide between one-to-one
//! and one-to-many assignment.

use serde::{Deserialize, Serialize};

use crate::foundation::collections::{NodeId, ResourceId};
use crate::foundation::math::{Quat, Vec3};

/// A field, reference or gathered attribute value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Absent value
    #[default]
    None,
    /// Boolean flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Scalar
    Float(f32),
    /// Text
    Text(String),
    /// 3D vector
    Vec3(Vec3),
    /// Rotation
    Quat(Quat),
    /// Flat numeric array, treated as a single leaf
    Floats(Vec<f32>),
    /// Nested sequence
    List(Vec<Value>),
    /// Handle of a node
    Node(NodeId),
    /// Handle of a shared resource
    Resource(ResourceId),
}

/// Nesting structure of a value
///
/// Everything but [`Value::List`] is a leaf, including text and flat arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Scalar-like value
    Leaf,
    /// Sequence of nested shapes
    Seq(Vec<Shape>),
}

impl Shape {
    /// Number of entries at the top level, `None` for leaves
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Leaf => None,
            Self::Seq(items) => Some(items.len()),
        }
    }
}

impl Value {
    /// Nesting structure of this value
    pub fn shape(&self) -> Shape {
        match self {
            Self::List(items) => Shape::Seq(items.iter().map(Self::shape).collect()),
            _ => Shape::Leaf,
        }
    }

    /// Whether this is [`Value::None`]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short name of the variant, used in error messages
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Vec3(_) => "vec3",
            Self::Quat(_) => "quat",
            Self::Floats(_) => "floats",
            Self::List(_) => "list",
            Self::Node(_) => "node",
            Self::Resource(_) => "resource",
        }
    }

    /// Node handle, if this is one
    pub const fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(node) => Some(*node),
            _ => None,
        }
    }

    /// Resource handle, if this is one
    pub const fn as_resource(&self) -> Option<ResourceId> {
        match self {
            Self::Resource(resource) => Some(*resource),
            _ => None,
        }
    }

    /// Scalar view of numeric values
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f32),
            _ => None,
        }
    }

    /// Vector, if this is one
    pub const fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(value) => Some(*value),
            _ => None,
        }
    }

    /// Rotation, if this is one
    pub const fn as_quat(&self) -> Option<Quat> {
        match self {
            Self::Quat(value) => Some(*value),
            _ => None,
        }
    }

    /// Text, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a node or resource handle appears anywhere in this value
    pub fn holds_handle(&self) -> bool {
        match self {
            Self::Node(_) | Self::Resource(_) => true,
            Self::List(items) => items.iter().any(Self::holds_handle),
            _ => false,
        }
    }

    /// Node handles carried by this value
    ///
    /// A single node, a list made only of nodes (possibly empty) and `None` all
    /// qualify; anything else returns `None`.
    pub fn to_nodes(&self) -> Option<Vec<NodeId>> {
        match self {
            Self::None => Some(Vec::new()),
            Self::Node(node) => Some(vec![*node]),
            Self::List(items) => items.iter().map(Self::as_node).collect(),
            _ => None,
        }
    }

    /// Convert `self` so it can be stored where `default` is the default
    ///
    /// Node and resource handles never qualify. Fields whose default is
    /// `None` accept any other value. Integers widen to floats. Otherwise the
    /// variants must agree.
    #[allow(clippy::cast_precision_loss)]
    pub fn coerce_like(self, default: &Self) -> Option<Self> {
        match (self, default) {
            (value, _) if value.holds_handle() => None,
            (value, Self::None) => Some(value),
            (Self::Int(value), Self::Float(_)) => Some(Self::Float(value as f32)),
            (value, default) if std::mem::discriminant(&value) == std::mem::discriminant(default) => {
                Some(value)
            }
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec3> for Value {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Quat> for Value {
    fn from(value: Quat) -> Self {
        Self::Quat(value)
    }
}

impl From<NodeId> for Value {
    fn from(value: NodeId) -> Self {
        Self::Node(value)
    }
}

impl From<ResourceId> for Value {
    fn from(value: ResourceId) -> Self {
        Self::Resource(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<NodeId>> for Value {
    fn from(value: Vec<NodeId>) -> Self {
        Self::List(value.into_iter().map(Self::Node).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_of_nested_lists() {
        let value = Value::List(vec![
            Value::Float(1.0),
            Value::List(vec![Value::Text("a".into()), Value::Vec3(Vec3::zeros())]),
        ]);
        assert_eq!(
            value.shape(),
            Shape::Seq(vec![Shape::Leaf, Shape::Seq(vec![Shape::Leaf, Shape::Leaf])])
        );
        assert_eq!(Value::Floats(vec![1.0, 2.0]).shape(), Shape::Leaf);
        assert_eq!(value.shape().len(), Some(2));
    }

    #[test]
    fn test_coerce_like() {
        assert_eq!(Value::Int(2).coerce_like(&Value::Float(0.0)), Some(Value::Float(2.0)));
        assert_eq!(Value::Text("x".into()).coerce_like(&Value::None), Some(Value::Text("x".into())));
        assert_eq!(Value::Text("x".into()).coerce_like(&Value::Float(0.0)), None);
        assert_eq!(Value::Float(1.5).coerce_like(&Value::Float(0.0)), Some(Value::Float(1.5)));
    }

    #[test]
    fn test_handles_never_coerce() {
        let node = NodeId::default();
        assert_eq!(Value::Node(node).coerce_like(&Value::None), None);
        assert_eq!(Value::List(vec![Value::Int(1), Value::Node(node)]).coerce_like(&Value::None), None);
        assert_eq!(Value::Resource(ResourceId::default()).coerce_like(&Value::None), None);
        assert!(!Value::List(vec![Value::Int(1)]).holds_handle());
    }

    #[test]
    fn test_to_nodes_rejects_mixed_lists() {
        assert_eq!(Value::List(vec![Value::Float(1.0)]).to_nodes(), None);
        assert_eq!(Value::None.to_nodes(), Some(Vec::new()));
        assert_eq!(Value::Float(1.0).to_nodes(), None);
    }
}
