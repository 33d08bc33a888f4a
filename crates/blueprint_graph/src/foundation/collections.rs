//! Arena handles and ordered collections
//!
//! Nodes, shared resources and kinds live in slot maps owned by the
//! [`Graph`](crate::graph::Graph). Their keys are stable for the lifetime of the
//! entry and are the only identity the crate uses.

use std::collections::HashSet;
use std::hash::Hash;

pub use indexmap::{IndexMap, IndexSet};
pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle of a node in the graph arena
    pub struct NodeId;

    /// Stable handle of a shared resource
    pub struct ResourceId;

    /// Handle of a registered kind descriptor
    pub struct KindId;
}

/// Remove duplicates while keeping the first occurrence of every item
pub fn dedup_ordered<T, I>(items: I) -> Vec<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(*item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let deduped = dedup_ordered([3, 1, 3, 2, 1, 4]);
        assert_eq!(deduped, vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_dedup_empty() {
        let deduped: Vec<u8> = dedup_ordered(Vec::new());
        assert!(deduped.is_empty());
    }
}
