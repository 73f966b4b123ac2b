//! Flatten the canonical graph into a deduplicated forest.
//!
//! Each root gets a tree-copy of its node, then the forest grows one
//! breadth-first level at a time. A node is claimed by the first frontier
//! node that reaches it, so every address appears exactly once in the
//! whole forest:
//! - shallowest discovery wins
//! - ties inside a level go to root order, then to edge order in the parent
//! - all global roots are expanded before any goroutine root
//!
//! This attribution makes retained sizes depend on root order for shared
//! substructures. That is the reporting model, not an accident.

use crate::graph::{Address, NodeId, ObjGraph, Ref, RootSet};
use crate::utils::error::TreeError;
use log::debug;
use std::collections::HashSet;

/// Index of a node inside a [`Forest`]
pub type TreeId = usize;

/// A tree-copy of a canonical node
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub address: Address,
    pub name: String,
    pub own_size: u64,
    /// Equals `own_size` until the forest is aggregated
    pub retained_size: u64,
    pub children: Vec<TreeEdge>,
}

#[derive(Debug, Clone)]
pub struct TreeEdge {
    pub label: String,
    pub child: TreeId,
}

/// Root trees over arena-allocated nodes. Children always have larger ids
/// than their parent.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    roots: Vec<TreeId>,
}

impl Forest {
    pub fn node(&self, id: TreeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: TreeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }

    /// Roots in report order: globals, then goroutines
    pub fn roots(&self) -> &[TreeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    fn push_copy(&mut self, graph: &ObjGraph, source: NodeId) -> TreeId {
        let node = graph.node(source);
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            address: node.address,
            name: node.name.clone(),
            own_size: node.own_size,
            retained_size: node.own_size,
            children: Vec::new(),
        });
        id
    }
}

/// Breadth-first forest construction over one canonical graph
pub struct ForestBuilder<'g> {
    graph: &'g ObjGraph,
    forest: Forest,
    visited: HashSet<Address>,
    global_roots: Vec<(TreeId, NodeId)>,
    goroutine_roots: Vec<(TreeId, NodeId)>,
}

impl<'g> ForestBuilder<'g> {
    pub fn new(graph: &'g ObjGraph) -> Self {
        Self {
            graph,
            forest: Forest::default(),
            visited: HashSet::new(),
            global_roots: Vec::new(),
            goroutine_roots: Vec::new(),
        }
    }

    /// Seed a global-variable root and mark it visited
    pub fn add_global_root(&mut self, node: NodeId) -> TreeId {
        let id = self.add_root(node);
        self.global_roots.push((id, node));
        id
    }

    /// Seed a goroutine root and mark it visited
    pub fn add_goroutine_root(&mut self, node: NodeId) -> TreeId {
        let id = self.add_root(node);
        self.goroutine_roots.push((id, node));
        id
    }

    fn add_root(&mut self, node: NodeId) -> TreeId {
        let id = self.forest.push_copy(self.graph, node);
        self.forest.roots.push(id);
        self.visited.insert(self.graph.node(node).address);
        id
    }

    /// Expand the global pass, then the goroutine pass
    pub fn build(mut self) -> Result<Forest, TreeError> {
        let globals = std::mem::take(&mut self.global_roots);
        self.expand(globals)?;
        let goroutines = std::mem::take(&mut self.goroutine_roots);
        self.expand(goroutines)?;

        debug!(
            "Built forest: {} roots, {} nodes, {} addresses visited",
            self.forest.roots.len(),
            self.forest.len(),
            self.visited.len()
        );
        Ok(self.forest)
    }

    fn expand(&mut self, frontier: Vec<(TreeId, NodeId)>) -> Result<(), TreeError> {
        let graph = self.graph;
        let forest = &mut self.forest;
        expand_breadth_first(graph, &mut self.visited, frontier, |parent, edge| {
            let child = forest.push_copy(graph, edge.target);
            forest.node_mut(parent).children.push(TreeEdge {
                label: edge.label.clone(),
                child,
            });
            child
        })
    }
}

/// Build the forest for every root of `roots`
pub fn build_forest(graph: &ObjGraph, roots: &RootSet) -> Result<Forest, TreeError> {
    let mut builder = ForestBuilder::new(graph);
    for &node in roots.globals() {
        builder.add_global_root(node);
    }
    for &node in roots.goroutines() {
        builder.add_goroutine_root(node);
    }
    builder.build()
}

/// Level-synchronous expansion shared by the forest builder and the reach
/// index.
///
/// Each frontier entry pairs a caller handle with its canonical node.
/// `claim` is called once per newly discovered edge target, with the
/// handle of the parent, and returns the handle of the child.
pub(crate) fn expand_breadth_first<H: Copy>(
    graph: &ObjGraph,
    visited: &mut HashSet<Address>,
    mut frontier: Vec<(H, NodeId)>,
    mut claim: impl FnMut(H, &Ref) -> H,
) -> Result<(), TreeError> {
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for (handle, node_id) in frontier {
            let node = graph.node(node_id);
            if !visited.contains(&node.address) {
                return Err(TreeError::UnvisitedNode {
                    address: node.address,
                });
            }

            for edge in &node.refs {
                let target = graph.node(edge.target).address;
                if !visited.insert(target) {
                    continue;
                }
                next.push((claim(handle, edge), edge.target));
            }
        }
        frontier = next;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_names(forest: &Forest, id: TreeId) -> Vec<String> {
        forest
            .node(id)
            .children
            .iter()
            .map(|e| forest.node(e.child).name.clone())
            .collect()
    }

    #[test]
    fn test_cycle_is_broken() {
        let mut graph = ObjGraph::new();
        let (root, _) = graph.register_object("root", Address(1), 0);
        let (a, _) = graph.register_object("A", Address(2), 8);
        let (b, _) = graph.register_object("B", Address(3), 8);
        graph.append_edge(root, a, "a");
        graph.append_edge(a, b, "next");
        graph.append_edge(b, a, "prev");
        graph.append_edge(b, root, "owner");

        let mut roots = RootSet::new();
        roots.add_global(root);
        let forest = build_forest(&graph, &roots).unwrap();

        assert_eq!(forest.len(), 3);
        let a_id = forest.node(forest.roots()[0]).children[0].child;
        assert_eq!(child_names(&forest, a_id), vec!["B"]);
        let b_id = forest.node(a_id).children[0].child;
        assert!(forest.node(b_id).children.is_empty());
    }

    #[test]
    fn test_shallowest_discovery_wins() {
        // root -> A -> B -> C and root -> C: C belongs to root.
        let mut graph = ObjGraph::new();
        let (root, _) = graph.register_object("root", Address(1), 0);
        let (a, _) = graph.register_object("A", Address(2), 1);
        let (b, _) = graph.register_object("B", Address(3), 1);
        let (c, _) = graph.register_object("C", Address(4), 1);
        graph.append_edge(root, a, "");
        graph.append_edge(a, b, "");
        graph.append_edge(b, c, "");
        graph.append_edge(root, c, "direct");

        let mut roots = RootSet::new();
        roots.add_global(root);
        let forest = build_forest(&graph, &roots).unwrap();

        let root_id = forest.roots()[0];
        assert_eq!(child_names(&forest, root_id), vec!["A", "C"]);
        assert_eq!(forest.node(root_id).children[1].label, "direct");
    }

    #[test]
    fn test_globals_expand_before_goroutines() {
        let mut graph = ObjGraph::new();
        let (g, _) = graph.register_object("go10", Address(0x10), 0);
        let (v, _) = graph.register_object("main.v", Address(0x20), 0);
        let (shared, _) = graph.register_object("S", Address(0x30), 64);
        graph.append_edge(g, shared, "");
        graph.append_edge(v, shared, "f");

        let mut builder = ForestBuilder::new(&graph);
        let goroutine = builder.add_goroutine_root(g);
        let global = builder.add_global_root(v);
        let forest = builder.build().unwrap();

        assert!(forest.node(goroutine).children.is_empty());
        assert_eq!(child_names(&forest, global), vec!["S"]);
        assert_eq!(forest.roots(), &[goroutine, global]);
    }

    #[test]
    fn test_unvisited_frontier_node_is_an_error() {
        let mut graph = ObjGraph::new();
        let (n, _) = graph.register_object("orphan", Address(0x99), 8);

        let mut builder = ForestBuilder::new(&graph);
        let id = builder.forest.push_copy(&graph, n);
        let err = builder.expand(vec![(id, n)]).unwrap_err();

        assert_eq!(
            err,
            TreeError::UnvisitedNode {
                address: Address(0x99)
            }
        );
    }

    #[test]
    fn test_retained_size_starts_as_own_size() {
        let mut graph = ObjGraph::new();
        let (root, _) = graph.register_object("T", Address(1), 40);
        let mut roots = RootSet::new();
        roots.add_goroutine(root);

        let forest = build_forest(&graph, &roots).unwrap();
        let node = forest.node(forest.roots()[0]);
        assert_eq!(node.retained_size, node.own_size);
    }
}
