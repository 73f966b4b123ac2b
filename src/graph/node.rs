//! Canonical, address-keyed object graph.
//!
//! Every heap object, global variable and goroutine seen by the ingester is
//! stored here exactly once. Edges are appended in discovery order and may
//! form cycles; sharing and cycles are resolved later by the forest builder.

use crate::utils::config::PLACEHOLDER_PREFIX;
use log::warn;
use std::collections::HashMap;
use std::fmt;

/// Address of an object in the inspected process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub u64);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Index of a node inside an [`ObjGraph`]
pub type NodeId = usize;

/// One outgoing pointer: the field label and the node it points at.
/// The label is empty for root pointers without a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub label: String,
    pub target: NodeId,
}

/// Canonical representation of one graph vertex
#[derive(Debug, Clone)]
pub struct ObjNode {
    pub address: Address,
    pub name: String,
    /// Zero for globals, which are containers rather than heap allocations
    pub own_size: u64,
    pub refs: Vec<Ref>,
}

/// A second registration of an address that disagreed on the size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeMismatch {
    pub address: Address,
    pub old_size: u64,
    pub new_size: u64,
}

/// The ingestion map: one [`ObjNode`] per address
#[derive(Debug, Default)]
pub struct ObjGraph {
    nodes: Vec<ObjNode>,
    by_address: HashMap<Address, NodeId>,
    mismatches: Vec<SizeMismatch>,
}

impl ObjGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find or create the canonical node for `address`.
    ///
    /// Returns the node and whether it already existed. An existing node
    /// keeps its original size (a differing size is only reported), and its
    /// name is upgraded when it is a placeholder and `name` is not.
    pub fn register_object(&mut self, name: &str, address: Address, size: u64) -> (NodeId, bool) {
        if let Some(&id) = self.by_address.get(&address) {
            let node = &mut self.nodes[id];
            if node.own_size != size {
                warn!(
                    "same address: {}, old size: {}, new size: {}",
                    address, node.own_size, size
                );
                self.mismatches.push(SizeMismatch {
                    address,
                    old_size: node.own_size,
                    new_size: size,
                });
            }
            if node.name != name && is_placeholder(&node.name) && !is_placeholder(name) {
                node.name = name.to_string();
            }
            return (id, true);
        }

        let id = self.nodes.len();
        self.nodes.push(ObjNode {
            address,
            name: name.to_string(),
            own_size: size,
            refs: Vec::new(),
        });
        self.by_address.insert(address, id);
        (id, false)
    }

    /// Append one outgoing edge. No cycle check happens here.
    pub fn append_edge(&mut self, parent: NodeId, child: NodeId, label: impl Into<String>) {
        self.nodes[parent].refs.push(Ref {
            label: label.into(),
            target: child,
        });
    }

    pub fn node(&self, id: NodeId) -> &ObjNode {
        &self.nodes[id]
    }

    pub fn lookup(&self, address: Address) -> Option<NodeId> {
        self.by_address.get(&address).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.refs.len()).sum()
    }

    /// Size disagreements seen so far, in the order they were reported
    pub fn size_mismatches(&self) -> &[SizeMismatch] {
        &self.mismatches
    }
}

/// Whether `name` is a provider placeholder for an unknown type
pub fn is_placeholder(name: &str) -> bool {
    name.starts_with(PLACEHOLDER_PREFIX)
}
