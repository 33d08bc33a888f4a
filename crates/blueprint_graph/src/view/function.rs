//! Operations gathered from a view, callable on every member at once

use crate::error::{GraphError, GraphResult};
use crate::foundation::collections::NodeId;
use crate::graph::Graph;
use crate::value::Value;

use super::View;

/// Aggregated result of a broadcast call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every call returned nothing
    None,
    /// Every call returned a node
    View(View),
    /// Per-member results
    Values(Vec<Value>),
}

/// An operation bound to every member of a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHandle {
    targets: Vec<NodeId>,
    operation: String,
    name: String,
    anchor: NodeId,
}

impl FunctionHandle {
    pub(crate) fn new(
        targets: Vec<NodeId>,
        operation: impl Into<String>,
        name: impl Into<String>,
        anchor: NodeId,
    ) -> Self {
        Self {
            targets,
            operation: operation.into(),
            name: name.into(),
            anchor,
        }
    }

    /// Number of bound members
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no member is bound
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Bound members
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// Name of the operation
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// `ViewFunction[<len>|<anchor name>.<name>]`
    pub fn display(&self, graph: &Graph) -> String {
        let anchor = graph.name(self.anchor).unwrap_or("?");
        format!("ViewFunction[{}|{}.{}]", self.len(), anchor, self.name)
    }

    /// Call the operation on every member with the same arguments
    pub fn call(&self, graph: &mut Graph, args: &[Value]) -> GraphResult<Outcome> {
        let mut results = Vec::with_capacity(self.len());
        for target in &self.targets {
            results.push(graph.call(*target, &self.operation, args)?);
        }
        Ok(self.aggregate(results))
    }

    /// Call the operation with one argument list per member
    ///
    /// # Errors
    ///
    /// [`GraphError::LengthMismatch`] unless there is exactly one argument
    /// list per member.
    pub fn distribute<A: AsRef<[Value]>>(&self, graph: &mut Graph, args: &[A]) -> GraphResult<Outcome> {
        if args.len() != self.len() {
            return Err(GraphError::LengthMismatch {
                expected: self.len(),
                actual: args.len(),
            });
        }
        let mut results = Vec::with_capacity(self.len());
        for (target, args) in self.targets.iter().zip(args) {
            results.push(graph.call(*target, &self.operation, args.as_ref())?);
        }
        Ok(self.aggregate(results))
    }

    fn aggregate(&self, results: Vec<Value>) -> Outcome {
        if results.iter().all(Value::is_none) {
            return Outcome::None;
        }
        match results.iter().map(Value::as_node).collect::<Option<Vec<_>>>() {
            Some(nodes) => Outcome::View(View::new(nodes, format!("{}()", self.name), self.anchor)),
            None => Outcome::Values(results),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::create_test_forest;

    #[test]
    fn test_call_broadcasts() {
        let (mut graph, forest, _) = create_test_forest();
        let trees = graph.view(forest, "trees").unwrap();
        let leaves = trees.get(&graph, "leaves").unwrap().into_view().unwrap();
        let grow = leaves.get(&graph, "grow").unwrap().into_function().unwrap();
        assert_eq!(grow.display(&graph), "ViewFunction[6|forest.trees.leaves.grow]");

        assert_eq!(grow.call(&mut graph, &[Value::Int(2)]).unwrap(), Outcome::None);
        for leaf in &leaves {
            assert_eq!(graph.field(leaf, "value").unwrap(), &Value::Int(3));
        }
    }

    #[test]
    fn test_distribute_checks_length() {
        let (mut graph, _, trees) = create_test_forest();
        let leaves = graph.view(trees[0], "leaves").unwrap();
        let grow = leaves.get(&graph, "grow").unwrap().into_function().unwrap();

        let result = grow.distribute(&mut graph, &[vec![Value::Int(1)]]);
        assert_eq!(result, Err(GraphError::LengthMismatch { expected: 2, actual: 1 }));

        grow.distribute(&mut graph, &[vec![Value::Int(1)], vec![Value::Int(4)]]).unwrap();
        assert_eq!(graph.field(leaves.elements()[0], "value").unwrap(), &Value::Int(2));
        assert_eq!(graph.field(leaves.elements()[1], "value").unwrap(), &Value::Int(5));
    }

    #[test]
    fn test_node_results_become_view() {
        let (mut graph, _, trees) = create_test_forest();
        let leaves = graph.view(trees[0], "leaves").unwrap();
        let copy = leaves.get(&graph, "copy").unwrap().into_function().unwrap();

        match copy.call(&mut graph, &[]).unwrap() {
            Outcome::View(copies) => {
                assert_eq!(copies.len(), 2);
                assert!(copies.iter().all(|node| !leaves.contains(node)));
            }
            other => panic!("expected a view, got {other:?}"),
        }
    }
}
