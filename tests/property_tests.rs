use heapref::graph::{Address, ObjGraph, RootSet};
use heapref::report::{render_forest, RenderOptions};
use heapref::tree::{aggregate_forest, build_forest};
use heapref::utils::{format_bytes, parse_bytes};
use proptest::prelude::*;
use std::collections::HashSet;

/// Objects `0..sizes.len()` at addresses `0x1000 + i`, edges by index,
/// plus global and goroutine roots pointing into the objects.
fn build_graph(sizes: &[u64], edges: &[(usize, usize)], roots: &[usize], goroutines: &[usize]) -> (ObjGraph, RootSet) {
    let mut graph = ObjGraph::new();
    let ids: Vec<_> = sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| graph.register_object("obj", Address(0x1000 + i as u64), size).0)
        .collect();
    for &(from, to) in edges {
        graph.append_edge(ids[from % ids.len()], ids[to % ids.len()], "");
    }

    let mut root_set = RootSet::new();
    for (i, &target) in roots.iter().enumerate() {
        let (root, _) = graph.register_object("global", Address(0x10 + i as u64), 0);
        graph.append_edge(root, ids[target % ids.len()], "");
        root_set.add_global(root);
    }
    for (i, &target) in goroutines.iter().enumerate() {
        let (g, _) = graph.register_object("go", Address(0x100 + i as u64), 0);
        graph.append_edge(g, ids[target % ids.len()], "");
        root_set.add_goroutine(g);
    }
    (graph, root_set)
}

/// Own sizes of every distinct address reachable from any root
fn reachable_own_size(graph: &ObjGraph, roots: &RootSet) -> u64 {
    let mut seen = HashSet::new();
    let mut stack: Vec<_> = roots.iter().collect();
    let mut total = 0;
    while let Some(id) = stack.pop() {
        let node = graph.node(id);
        if !seen.insert(node.address) {
            continue;
        }
        total += node.own_size;
        stack.extend(node.refs.iter().map(|r| r.target));
    }
    total
}

fn graph_strategy() -> impl Strategy<Value = (Vec<u64>, Vec<(usize, usize)>, Vec<usize>, Vec<usize>)> {
    (
        prop::collection::vec(0u64..10_000, 1..40),
        prop::collection::vec((0usize..64, 0usize..64), 0..120),
        prop::collection::vec(0usize..64, 0..6),
        prop::collection::vec(0usize..64, 0..4),
    )
}

proptest! {
    #[test]
    fn prop_no_double_counting((sizes, edges, roots, goroutines) in graph_strategy()) {
        let (graph, root_set) = build_graph(&sizes, &edges, &roots, &goroutines);
        let mut forest = build_forest(&graph, &root_set).unwrap();
        let total = aggregate_forest(&mut forest);

        prop_assert_eq!(total, reachable_own_size(&graph, &root_set));
    }

    #[test]
    fn prop_line_count_monotonic_in_threshold(
        (sizes, edges, roots, goroutines) in graph_strategy(),
        low in 0.0f64..100.0,
        delta in 0.0f64..100.0,
    ) {
        let high = (low + delta).min(100.0);
        let (graph, root_set) = build_graph(&sizes, &edges, &roots, &goroutines);
        let mut forest = build_forest(&graph, &root_set).unwrap();
        let total = aggregate_forest(&mut forest);

        let at = |min_width: f64| {
            let options = RenderOptions { min_width, ..Default::default() };
            render_forest(&forest, total, &options)
        };
        let (loose, strict) = (at(low), at(high));

        prop_assert!(strict.records.len() <= loose.records.len());
        prop_assert!(loose.printed_size <= total);
        prop_assert!(strict.printed_size <= total);
    }

    #[test]
    fn prop_byte_codec_round_trip(n in any::<u64>()) {
        let parsed = parse_bytes(&format_bytes(n)).unwrap();
        prop_assert!(parsed.abs_diff(n) <= n / 200 + 1);
    }
}
