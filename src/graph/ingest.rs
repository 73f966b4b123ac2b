//! Drive a [`GraphProvider`] into an [`ObjGraph`] plus its roots.
//!
//! Ingestion order matters for the report: heap objects first, then global
//! variables, then goroutines. Globals whose address was already registered
//! (by a heap object or an earlier global) do not become separate roots;
//! goroutines always do.

use super::node::{Address, NodeId, ObjGraph};
use crate::provider::GraphProvider;
use crate::utils::format_bytes;
use log::{debug, info};

/// Forest roots, in the order the builder must expand them
#[derive(Debug, Clone, Default)]
pub struct RootSet {
    globals: Vec<NodeId>,
    goroutines: Vec<NodeId>,
}

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_global(&mut self, node: NodeId) {
        self.globals.push(node);
    }

    pub fn add_goroutine(&mut self, node: NodeId) {
        self.goroutines.push(node);
    }

    pub fn globals(&self) -> &[NodeId] {
        &self.globals
    }

    pub fn goroutines(&self) -> &[NodeId] {
        &self.goroutines
    }

    /// Globals first, then goroutines
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.globals.iter().chain(self.goroutines.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.globals.len() + self.goroutines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything one report needs: the canonical graph and its roots.
///
/// Owned by the caller, so independent reports never share state.
#[derive(Debug, Default)]
pub struct HeapGraph {
    pub graph: ObjGraph,
    pub roots: RootSet,
    /// Sum of every heap object's own size, before deduplication
    pub sum_object_size: u64,
}

/// Materialize the provider's objects, pointers and roots
pub fn ingest<P: GraphProvider + ?Sized>(provider: &P) -> HeapGraph {
    let mut heap = HeapGraph::default();
    ingest_objects(provider, &mut heap);
    ingest_globals(provider, &mut heap);
    ingest_goroutines(provider, &mut heap);

    debug!(
        "Ingested {} nodes, {} edges, {} roots",
        heap.graph.len(),
        heap.graph.edge_count(),
        heap.roots.len()
    );
    heap
}

fn ingest_objects<P: GraphProvider + ?Sized>(provider: &P, heap: &mut HeapGraph) {
    let graph = &mut heap.graph;
    let mut sum = 0u64;

    provider.for_each_object(&mut |object| {
        sum += object.size;
        let (parent, _) = graph.register_object(&provider.type_name(object), object.address, object.size);

        provider.for_each_pointer(object, &mut |edge| {
            let (child, _) =
                graph.register_object(&provider.type_name(&edge.target), edge.target.address, edge.target.size);
            graph.append_edge(parent, child, provider.field_name(object, edge.offset));
            true
        });
        true
    });

    heap.sum_object_size = sum;
    info!("Sum object size {}", format_bytes(sum));
}

fn ingest_globals<P: GraphProvider + ?Sized>(provider: &P, heap: &mut HeapGraph) {
    let HeapGraph { graph, roots, .. } = heap;

    provider.for_each_global(&mut |global| {
        // Globals live outside the heap, so they contribute no size of their own.
        let (node, existed) = graph.register_object(&global.name, global.address, 0);
        if !existed {
            roots.add_global(node);
        }

        provider.for_each_root_pointer(global, &mut |edge| {
            let (child, _) =
                graph.register_object(&provider.type_name(&edge.target), edge.target.address, edge.target.size);
            graph.append_edge(node, child, provider.type_field_name(global.type_name.as_deref(), edge.offset));
            true
        });
        true
    });
}

fn ingest_goroutines<P: GraphProvider + ?Sized>(provider: &P, heap: &mut HeapGraph) {
    let HeapGraph { graph, roots, .. } = heap;

    provider.for_each_goroutine(&mut |goroutine| {
        let (node, _) = graph.register_object(
            &goroutine_name(goroutine.address),
            goroutine.address,
            provider.size_at(goroutine.address),
        );
        roots.add_goroutine(node);
        true
    });
}

pub fn goroutine_name(address: Address) -> String {
    format!("go{:x}", address)
}
