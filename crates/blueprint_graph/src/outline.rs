//! # Outline
//!
//! Read-only, serializable snapshot of a tree for external writers. Fields
//! equal to their kind default are left out, references are written by the
//! exposed name of their targets and empty roles are skipped.
//!
//! ```
//! use blueprint_graph::prelude::*;
//!
//! let mut graph = Graph::with_standard_kinds(GraphConfig::default()).unwrap();
//! let world = graph.create("world", Some("world")).unwrap();
//! let body = graph.create("body", Some("torso")).unwrap();
//! graph.attach(world, [body], AttachOptions::default()).unwrap();
//!
//! let outline = graph.outline(world).unwrap();
//! assert_eq!(outline.children["bodies"][0].name, "torso");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::foundation::collections::{IndexMap, NodeId};
use crate::graph::Graph;
use crate::resource::Payload;
use crate::value::Value;

/// One node of an outline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outline {
    /// Kind name
    pub kind: String,
    /// Exposed name
    pub name: String,
    /// Fields that differ from the kind default
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, Value>,
    /// Payloads bound through resource slots
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub resources: IndexMap<String, Payload>,
    /// Reference slots by the exposed names of their targets
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub references: IndexMap<String, Vec<String>>,
    /// Non-empty roles
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, Vec<Outline>>,
}

impl Outline {
    /// Number of nodes in the outline
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .flatten()
            .map(Self::node_count)
            .sum::<usize>()
    }
}

impl Graph {
    /// Outline of `node` and its subtree
    pub fn outline(&self, node: NodeId) -> GraphResult<Outline> {
        let data = self.node(node)?;
        let kind = self.kind(data.kind())?;

        let mut fields = IndexMap::new();
        let mut resources = IndexMap::new();
        for (field, value) in data.fields() {
            match value {
                Value::Resource(resource) if kind.is_resource_slot(field) => {
                    resources.insert(field.clone(), self.resource(*resource)?.payload().clone());
                }
                value if kind.default_of(field) != Some(value) => {
                    fields.insert(field.clone(), value.clone());
                }
                _ => {}
            }
        }

        let mut references = IndexMap::new();
        for (slot, targets) in data.references() {
            if targets.is_empty() {
                continue;
            }
            let names = targets
                .iter()
                .map(|target| self.name(*target).map(str::to_string))
                .collect::<GraphResult<Vec<_>>>()?;
            references.insert(slot.clone(), names);
        }

        let mut children = IndexMap::new();
        for (role, nodes) in data.roles() {
            if nodes.is_empty() {
                continue;
            }
            let outlines = nodes
                .iter()
                .map(|child| self.outline(*child))
                .collect::<GraphResult<Vec<_>>>()?;
            children.insert(role.clone(), outlines);
        }

        Ok(Outline {
            kind: kind.name().to_string(),
            name: data.name().to_string(),
            fields,
            resources,
            references,
            children,
        })
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::foundation::math::Vec3;
    use crate::graph::AttachOptions;

    fn create_test_world() -> (Graph, NodeId) {
        let mut graph = Graph::with_standard_kinds(GraphConfig::default()).unwrap();
        let world = graph.create("world", Some("world")).unwrap();
        let body = graph.create("body", Some("body")).unwrap();
        let site = graph.create("site", Some("tip")).unwrap();
        graph.attach(body, [site], AttachOptions::moving()).unwrap();
        graph.attach(world, [body, body], AttachOptions::default()).unwrap();
        (graph, world)
    }

    #[test]
    fn test_defaults_are_omitted() {
        let (mut graph, world) = create_test_world();
        let bodies = graph.children(world, "bodies").unwrap().to_vec();
        graph.set_field(bodies[1], "pos", Vec3::new(0.0, 1.0, 0.0)).unwrap();

        let outline = graph.outline(world).unwrap();
        let outlined = &outline.children["bodies"];
        assert!(outlined[0].fields.is_empty());
        assert_eq!(outlined[1].fields.keys().collect::<Vec<_>>(), vec!["pos"]);
        assert_eq!(outline.node_count(), 5);
        assert!(!outline.children.contains_key("geoms"));
    }

    #[test]
    fn test_references_use_exposed_names() {
        let (mut graph, world) = create_test_world();
        let bodies = graph.children(world, "bodies").unwrap().to_vec();
        let sites: Vec<NodeId> = bodies
            .iter()
            .map(|body| graph.children(*body, "sites").unwrap()[0])
            .collect();
        let tendon = graph.create("tendon", Some("strap")).unwrap();
        graph.attach(world, [tendon], AttachOptions::moving()).unwrap();
        graph.set_references(tendon, "bindings", sites).unwrap();

        let outline = graph.outline(world).unwrap();
        let strap = &outline.children["tendons"][0];
        assert_eq!(strap.references["bindings"], vec!["tip_(0)".to_string(), "tip_(1)".to_string()]);
    }

    #[test]
    fn test_resource_payload_is_written() {
        let mut graph = Graph::with_standard_kinds(GraphConfig::default()).unwrap();
        let mesh = graph.create("mesh_geom", Some("hull")).unwrap();
        let mut payload = Payload::new();
        payload.insert("vertices".to_string(), Value::Floats(vec![0.0, 1.0, 2.0]));
        let resource = graph.create_resource(payload.clone());
        graph.set_field(mesh, "mesh", resource).unwrap();

        let outline = graph.outline(mesh).unwrap();
        assert_eq!(outline.resources["mesh"], payload);
        assert!(outline.fields.is_empty());
    }

    #[test]
    fn test_serializes_to_ron() {
        let (graph, world) = create_test_world();
        let outline = graph.outline(world).unwrap();
        let text = ron::ser::to_string_pretty(&outline, ron::ser::PrettyConfig::default()).unwrap();
        assert!(text.contains("body_(1)"));
        let parsed: Outline = ron::from_str(&text).unwrap();
        assert_eq!(parsed.name, outline.name);
    }
}
