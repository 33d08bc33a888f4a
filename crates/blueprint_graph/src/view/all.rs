//! View over every descendant of a node, grouped by role

use crate::error::GraphResult;
use crate::foundation::collections::{IndexMap, NodeId};
use crate::graph::Graph;
use crate::value::Value;

use super::{Gathered, View};

/// Every descendant of an anchor node
///
/// Role names index the descendants filling that role anywhere below the
/// anchor. Any other attribute is read from or written to the descendants
/// that have it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllView {
    members: View,
    grouped: IndexMap<String, Vec<NodeId>>,
}

impl AllView {
    /// Snapshot the descendants of `anchor`
    pub fn new(graph: &Graph, anchor: NodeId) -> GraphResult<Self> {
        let grouped = graph.descendants(anchor)?;
        let members = View::new(grouped.values().flatten().copied(), "all", anchor);
        Ok(Self { members, grouped })
    }

    /// All descendants as a plain view
    pub const fn as_view(&self) -> &View {
        &self.members
    }

    /// Number of descendants
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the anchor has no descendants
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Role names found below the anchor
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.grouped.keys().map(String::as_str)
    }

    /// Descendants carrying `attr`
    pub fn restrict(&self, graph: &Graph, attr: &str) -> View {
        View::new(
            self.members.iter().filter(|node| graph.has_attribute(*node, attr)),
            format!("all.{attr}"),
            self.members.anchor(),
        )
    }

    /// Descendants in role `attr`, or `attr` gathered from the descendants having it
    pub fn get(&self, graph: &Graph, attr: &str) -> GraphResult<Gathered> {
        if let Some(nodes) = self.grouped.get(attr) {
            return Ok(Gathered::View(View::new(
                nodes.iter().copied(),
                format!("all.{attr}"),
                self.members.anchor(),
            )));
        }
        self.restrict(graph, attr).get(graph, attr)
    }

    /// Broadcast `value` into `attr` of the descendants having it
    pub fn set(&self, graph: &mut Graph, attr: &str, value: impl Into<Value>) -> GraphResult<()> {
        self.restrict(graph, attr).set(graph, attr, value)
    }

    /// `AllView[<len>|<anchor name>]`
    pub fn display(&self, graph: &Graph) -> String {
        let anchor = graph.name(self.members.anchor()).unwrap_or("?");
        format!("AllView[{}|{}]", self.len(), anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::view::tests::create_test_forest;

    #[test]
    fn test_groups_by_role() {
        let (graph, forest, _) = create_test_forest();
        let all = graph.all(forest).unwrap();
        assert_eq!(all.len(), 9);
        assert_eq!(all.roles().collect::<Vec<_>>(), vec!["leaves", "trees"]);

        let leaves = all.get(&graph, "leaves").unwrap().into_view().unwrap();
        assert_eq!(leaves.len(), 6);
    }

    #[test]
    fn test_set_reaches_nested_descendants() {
        let (mut graph, forest, _) = create_test_forest();
        let all = graph.all(forest).unwrap();
        all.set(&mut graph, "color", "red").unwrap();

        let colors = all.get(&graph, "color").unwrap().into_values().unwrap();
        assert_eq!(colors, vec![Value::Text("red".to_string()); 6]);
    }

    #[test]
    fn test_missing_attribute_is_empty() {
        let (graph, forest, _) = create_test_forest();
        let all = graph.all(forest).unwrap();
        assert!(matches!(all.get(&graph, "nothing"), Err(GraphError::EmptyView(_))));
    }
}
