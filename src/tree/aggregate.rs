//! Retained size: own size plus the retained size of every tree child.
//!
//! The forest never contains an address twice, so the sum over all roots
//! counts every reachable object exactly once.

use super::builder::{Forest, TreeId};
use log::info;
use crate::utils::format_bytes;

/// Compute retained sizes below `root` and return the root's.
///
/// Post-order walk on an explicit stack, safe for arbitrarily deep chains.
/// Running it twice gives the same result.
pub fn aggregate(forest: &mut Forest, root: TreeId) -> u64 {
    let mut stack = vec![(root, false)];

    while let Some((id, children_done)) = stack.pop() {
        if children_done {
            let node = forest.node(id);
            let children: u64 = node
                .children
                .iter()
                .map(|e| forest.node(e.child).retained_size)
                .sum();
            let retained = node.own_size + children;
            forest.node_mut(id).retained_size = retained;
        } else {
            stack.push((id, true));
            stack.extend(forest.node(id).children.iter().map(|e| (e.child, false)));
        }
    }

    forest.node(root).retained_size
}

/// Aggregate every root and return the grand total
pub fn aggregate_forest(forest: &mut Forest) -> u64 {
    let roots = forest.roots().to_vec();
    let total = roots.into_iter().map(|root| aggregate(forest, root)).sum();
    info!("Total size {}", format_bytes(total));
    total
}
