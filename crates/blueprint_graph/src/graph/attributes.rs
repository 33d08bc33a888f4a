//! Uniform attribute access
//!
//! Views reach into nodes by attribute name. An attribute is one of the
//! built-ins (`name`, `label`, `kind`, `parent`, `root`), a role, a reference
//! slot, a field, or an operation; this module resolves names in that order.

use super::{AttachOptions, Graph, Overrides};
use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::NodeId;
use crate::value::Value;

/// What an attribute name resolves to on one node
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Children owned through a role
    Role(Vec<NodeId>),
    /// Targets of a reference slot
    Reference {
        /// Current targets
        targets: Vec<NodeId>,
        /// Whether the slot is multi-valued
        many: bool,
    },
    /// Field or built-in value
    Value(Value),
    /// Callable operation, by name
    Operation(String),
}

impl Attribute {
    /// The attribute as a plain value
    ///
    /// Roles and multi-valued slots become lists of nodes, single slots a node
    /// or `None`, operations their name.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Role(nodes) | Self::Reference { targets: nodes, many: true } => Value::from(nodes.clone()),
            Self::Reference { targets, many: false } => targets.first().map_or(Value::None, |target| Value::Node(*target)),
            Self::Value(value) => value.clone(),
            Self::Operation(name) => Value::Text(name.clone()),
        }
    }

    /// Whether the attribute is made of graph edges
    pub const fn is_edge(&self) -> bool {
        matches!(self, Self::Role(_) | Self::Reference { .. })
    }
}

impl Graph {
    /// Resolve `name` on `node`
    pub fn attribute(&self, node: NodeId, name: &str) -> GraphResult<Attribute> {
        let data = self.node(node)?;
        let kind = self.kind(data.kind)?;

        let builtin = match name {
            "name" => Some(Value::Text(data.name().to_string())),
            "label" => Some(Value::Text(data.label.clone())),
            "kind" => Some(Value::Text(kind.name.clone())),
            "parent" => Some(data.parent.map_or(Value::None, Value::Node)),
            "root" => Some(Value::Node(self.root(node)?)),
            _ => None,
        };
        if let Some(value) = builtin {
            return Ok(Attribute::Value(value));
        }

        if let Some(children) = data.roles.get(name) {
            return Ok(Attribute::Role(children.clone()));
        }
        if let Some(spec) = kind.references.get(name) {
            return Ok(Attribute::Reference {
                targets: data.references.get(name).cloned().unwrap_or_default(),
                many: spec.many,
            });
        }
        if let Some(value) = data.fields.get(name) {
            return Ok(Attribute::Value(value.clone()));
        }
        if kind.has_operation(name) {
            return Ok(Attribute::Operation(name.to_string()));
        }
        Err(GraphError::UnknownAttribute {
            kind: kind.name.clone(),
            attribute: name.to_string(),
        })
    }

    /// Whether `name` resolves on `node`
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_ok()
    }

    /// Assign `value` to the attribute `name` of `node`
    ///
    /// Roles take a node or a list of nodes, which are moved in place of the
    /// current children. Reference slots take a node, a list of nodes or
    /// `None`. `name` and `label` take text and edit the label.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: Value) -> GraphResult<()> {
        match name {
            "name" | "label" => {
                return match value {
                    Value::Text(label) => self.set_label(node, label),
                    other => Err(GraphError::invalid(name, format!("expected text, got {}", other.type_name()))),
                };
            }
            "kind" | "parent" | "root" => return Err(GraphError::invalid(name, "read-only attribute")),
            _ => {}
        }

        match self.attribute(node, name)? {
            Attribute::Role(_) => {
                let nodes = Self::expect_nodes(name, &value)?;
                self.replace_children(node, name, nodes)?;
                Ok(())
            }
            Attribute::Reference { .. } => {
                let nodes = Self::expect_nodes(name, &value)?;
                self.set_references(node, name, nodes)
            }
            Attribute::Value(_) => self.set_field(node, name, value),
            Attribute::Operation(_) => Err(GraphError::invalid(name, "operations cannot be assigned")),
        }
    }

    /// Check that `set_attribute` would accept `value`, without writing it
    ///
    /// Roles are checked as if filled per `options`. Only name convergence is
    /// left to the write itself.
    pub(crate) fn check_attribute(
        &self,
        node: NodeId,
        name: &str,
        value: &Value,
        options: AttachOptions,
    ) -> GraphResult<()> {
        match name {
            "name" | "label" => {
                return match value {
                    Value::Text(_) => self.ensure_mutable(node, "relabel"),
                    other => Err(GraphError::invalid(name, format!("expected text, got {}", other.type_name()))),
                };
            }
            "kind" | "parent" | "root" => return Err(GraphError::invalid(name, "read-only attribute")),
            _ => {}
        }

        match self.attribute(node, name)? {
            Attribute::Role(_) => self.check_replace(node, name, &Self::expect_nodes(name, value)?, options),
            Attribute::Reference { .. } => self.check_references(node, name, &Self::expect_nodes(name, value)?),
            Attribute::Value(_) => self.checked_field(node, name, value.clone()).map(drop),
            Attribute::Operation(_) => Err(GraphError::invalid(name, "operations cannot be assigned")),
        }
    }

    /// Invoke the operation `name` on `node`
    ///
    /// Built-ins:
    /// - `copy([label])` returns the copy
    /// - `attach(nodes...)` attaches copies
    /// - `detach(nodes...)` detaches children, or the node itself without arguments
    /// - `reset([fields...])` restores defaults
    /// - `shift(offset)` / `locate(position)` return moved copies of spatial nodes
    pub fn call(&mut self, node: NodeId, name: &str, args: &[Value]) -> GraphResult<Value> {
        let kind = self.kind_of(node)?;
        if let Some(operation) = kind.operation(name) {
            return operation(self, node, args);
        }
        let spatial = kind.is_spatial();
        let kind_name = kind.name.clone();

        match (name, args) {
            ("copy", []) => Ok(Value::Node(self.copy(node)?.root)),
            ("copy", [Value::Text(label)]) => {
                Ok(Value::Node(self.copy_with(node, &Overrides::new().label(label.clone()))?.root))
            }
            ("attach", items) => {
                let nodes = Self::nodes_of(name, items)?;
                self.attach(node, nodes, AttachOptions::new())?;
                Ok(Value::None)
            }
            ("detach", []) => {
                self.detach_from_parent(node)?;
                Ok(Value::None)
            }
            ("detach", items) => {
                let nodes = Self::nodes_of(name, items)?;
                self.detach(node, nodes)?;
                Ok(Value::None)
            }
            ("reset", []) => {
                self.reset_fields(node)?;
                Ok(Value::None)
            }
            ("reset", fields) => {
                for field in fields {
                    let field = field
                        .as_text()
                        .ok_or_else(|| GraphError::invalid(name, "expected field names"))?;
                    self.reset_field(node, field)?;
                }
                Ok(Value::None)
            }
            ("shift", [Value::Vec3(offset)]) if spatial => Ok(Value::Node(self.shifted_copy(node, *offset)?.root)),
            ("locate", [Value::Vec3(position)]) if spatial => {
                Ok(Value::Node(self.relocated_copy(node, *position)?.root))
            }
            ("shift" | "locate", _) if spatial => Err(GraphError::invalid(name, "expected one vec3 argument")),
            ("copy", _) => Err(GraphError::invalid(name, "expected no argument or a label")),
            _ => Err(GraphError::UnknownAttribute {
                kind: kind_name,
                attribute: name.to_string(),
            }),
        }
    }

    fn expect_nodes(attribute: &str, value: &Value) -> GraphResult<Vec<NodeId>> {
        value
            .to_nodes()
            .ok_or_else(|| GraphError::invalid(attribute, format!("expected nodes, got {}", value.type_name())))
    }

    fn nodes_of(attribute: &str, args: &[Value]) -> GraphResult<Vec<NodeId>> {
        let mut nodes = Vec::new();
        for arg in args {
            nodes.extend(Self::expect_nodes(attribute, arg)?);
        }
        Ok(nodes)
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::graph::tests::create_test_graph;

    #[test]
    fn test_builtin_attributes() {
        let mut graph = create_test_graph();
        let tree = graph.create("tree", Some("tree")).unwrap();
        let leaf = graph.create("leaf", Some("leaf")).unwrap();
        graph.attach(tree, [leaf], AttachOptions::moving()).unwrap();

        assert_eq!(graph.attribute(leaf, "kind").unwrap(), Attribute::Value(Value::Text("leaf".into())));
        assert_eq!(graph.attribute(leaf, "parent").unwrap(), Attribute::Value(Value::Node(tree)));
        assert_eq!(graph.attribute(tree, "parent").unwrap(), Attribute::Value(Value::None));
        assert_eq!(graph.attribute(tree, "leaves").unwrap(), Attribute::Role(vec![leaf]));
        assert_eq!(graph.attribute(leaf, "shift").unwrap(), Attribute::Operation("shift".into()));
        assert!(!graph.has_attribute(tree, "shift"));
        assert!(!graph.has_attribute(leaf, "missing"));
    }

    #[test]
    fn test_set_attribute_dispatch() {
        let mut graph = create_test_graph();
        let tree = graph.create("tree", Some("tree")).unwrap();
        let leaf = graph.create("leaf", Some("leaf")).unwrap();

        graph.set_attribute(leaf, "value", Value::Int(2)).unwrap();
        assert_eq!(graph.field(leaf, "value").unwrap(), &Value::Int(2));

        graph.set_attribute(tree, "leaves", Value::Node(leaf)).unwrap();
        assert_eq!(graph.parent(leaf).unwrap(), Some(tree));

        graph.set_attribute(leaf, "label", Value::Text("renamed".into())).unwrap();
        assert_eq!(graph.label(leaf).unwrap(), "renamed");

        assert!(graph.set_attribute(leaf, "root", Value::None).is_err());
        assert!(graph.set_attribute(leaf, "shift", Value::None).is_err());
    }

    #[test]
    fn test_builtin_operations() {
        let mut graph = create_test_graph();
        let tree = graph.create("tree", Some("tree")).unwrap();
        let leaf = graph.create("leaf", Some("leaf")).unwrap();

        graph.call(tree, "attach", &[Value::Node(leaf), Value::Node(leaf)]).unwrap();
        assert_eq!(graph.children(tree, "leaves").unwrap().len(), 2);

        let moved = graph.call(leaf, "shift", &[Value::Vec3(Vec3::new(0.0, 1.0, 0.0))]).unwrap();
        let moved = moved.as_node().unwrap();
        assert_eq!(graph.field(moved, "pos").unwrap(), &Value::Vec3(Vec3::new(0.0, 1.0, 0.0)));

        graph.set_field(leaf, "value", 5_i64).unwrap();
        graph.call(leaf, "reset", &[Value::Text("value".into())]).unwrap();
        assert_eq!(graph.field(leaf, "value").unwrap(), &Value::Int(1));

        let first = graph.children(tree, "leaves").unwrap()[0];
        graph.call(first, "detach", &[]).unwrap();
        assert_eq!(graph.children(tree, "leaves").unwrap().len(), 1);

        assert!(graph.call(tree, "shift", &[Value::Vec3(Vec3::zeros())]).is_err());
        assert!(graph.call(leaf, "shift", &[]).is_err());
    }
}
