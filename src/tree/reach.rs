//! Shortest root chain for every reachable address.
//!
//! Uses the same breadth-first ownership rule as the forest builder, but
//! keeps parent links instead of tree-copies, so the chain from a root to
//! any object can be read back.

use super::builder::expand_breadth_first;
use crate::graph::{Address, NodeId, ObjGraph, RootSet};
use crate::utils::error::TreeError;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct ReachEntry {
    node: NodeId,
    /// Entry of the parent and the label of the edge taken from it
    via: Option<(usize, String)>,
}

/// One step of a root chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    pub node: NodeId,
    /// Label of the edge leading here; `None` for the root itself
    pub label: Option<String>,
}

#[derive(Debug, Default)]
pub struct ReachIndex {
    entries: Vec<ReachEntry>,
    by_address: HashMap<Address, usize>,
}

impl ReachIndex {
    pub fn build(graph: &ObjGraph, roots: &RootSet) -> Result<Self, TreeError> {
        let mut index = ReachIndex::default();
        let mut visited = HashSet::new();

        let mut seed = |nodes: &[NodeId], index: &mut ReachIndex| -> Vec<(usize, NodeId)> {
            nodes
                .iter()
                .map(|&node| {
                    let entry = index.entries.len();
                    index.entries.push(ReachEntry { node, via: None });
                    let address = graph.node(node).address;
                    index.by_address.entry(address).or_insert(entry);
                    visited.insert(address);
                    (entry, node)
                })
                .collect()
        };
        let globals = seed(roots.globals(), &mut index);
        let goroutines = seed(roots.goroutines(), &mut index);

        for frontier in [globals, goroutines] {
            let ReachIndex { entries, by_address } = &mut index;
            expand_breadth_first(graph, &mut visited, frontier, |parent, edge| {
                let entry = entries.len();
                entries.push(ReachEntry {
                    node: edge.target,
                    via: Some((parent, edge.label.clone())),
                });
                by_address.insert(graph.node(edge.target).address, entry);
                entry
            })?;
        }

        Ok(index)
    }

    pub fn is_reachable(&self, address: Address) -> bool {
        self.by_address.contains_key(&address)
    }

    /// Chain from the owning root down to `address`, root first
    pub fn chain(&self, address: Address) -> Option<Vec<ChainLink>> {
        let mut current = *self.by_address.get(&address)?;
        let mut links = Vec::new();
        loop {
            let entry = &self.entries[current];
            match &entry.via {
                Some((parent, label)) => {
                    links.push(ChainLink {
                        node: entry.node,
                        label: Some(label.clone()),
                    });
                    current = *parent;
                }
                None => {
                    links.push(ChainLink {
                        node: entry.node,
                        label: None,
                    });
                    break;
                }
            }
        }
        links.reverse();
        Some(links)
    }
}
