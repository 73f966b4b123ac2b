use heapref::graph::{Address, ObjGraph, RootSet};
use heapref::report::{render_forest, PathOrder, RefReport, RenderOptions};
use heapref::tree::{aggregate_forest, build_forest};
use pretty_assertions::assert_eq;

fn render(graph: &ObjGraph, roots: &RootSet, options: &RenderOptions) -> RefReport {
    let mut forest = build_forest(graph, roots).unwrap();
    let total = aggregate_forest(&mut forest);
    render_forest(&forest, total, options)
}

/// Root with own size 0 and three leaves of 900, 90 and 10 bytes
fn three_leaves() -> (ObjGraph, RootSet) {
    let mut graph = ObjGraph::new();
    let (root, _) = graph.register_object("main.cache", Address(0x500), 0);
    for (i, (name, size)) in [("big", 900), ("mid", 90), ("small", 10)].into_iter().enumerate() {
        let (leaf, _) = graph.register_object(name, Address(0x1000 + i as u64 * 0x100), size);
        graph.append_edge(root, leaf, "");
    }
    let mut roots = RootSet::new();
    roots.add_global(root);
    (graph, roots)
}

#[test]
fn test_threshold_prunes_small_leaves() {
    let (graph, roots) = three_leaves();
    let options = RenderOptions {
        min_width: 5.0,
        ..Default::default()
    };
    let report = render(&graph, &roots, &options);

    assert_eq!(report.total_size, 1000);
    assert_eq!(report.printed_size, 990);
    assert_eq!(
        report.to_text(PathOrder::RootFirst),
        "main.cache\nbig\n\t900\nmain.cache\nmid\n\t90\n"
    );
}

#[test]
fn test_zero_threshold_prints_parent_leftover() {
    let (mut graph, roots) = three_leaves();
    // Add a zero-byte child.
    let root = graph.lookup(Address(0x500)).unwrap();
    let (tail, _) = graph.register_object("tail", Address(0x9000), 0);
    graph.append_edge(root, tail, "");

    let report = render(&graph, &roots, &RenderOptions::default());

    // The zero-byte tail never gets a line; the parent has no leftover.
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.printed_size, 1000);
}

#[test]
fn test_edge_labels_and_order() {
    let mut graph = ObjGraph::new();
    let (root, _) = graph.register_object("main.index", Address(0x500), 0);
    let (table, _) = graph.register_object("[8]main.bucket", Address(0x1000), 512);
    let (entry, _) = graph.register_object("main.entry", Address(0x2000), 64);
    graph.append_edge(root, table, "buckets");
    graph.append_edge(table, entry, "[3].val+8");
    let mut roots = RootSet::new();
    roots.add_global(root);

    let report = render(&graph, &roots, &RenderOptions::default());
    assert_eq!(
        report.to_text(PathOrder::RootFirst),
        [
            "main.index",
            "buckets",
            "[8]main.bucket",
            "[3].val.8",
            "main.entry",
            "\t64",
            "main.index",
            "buckets",
            "[8]main.bucket",
            "\t512",
            "",
        ]
        .join("\n")
    );

    assert_eq!(
        report.records[0].path(PathOrder::LeafFirst),
        "main.entry\n[3].val.8\n[8]main.bucket\nbuckets\nmain.index"
    );
}

#[test]
fn test_print_addr_suffixes_segments() {
    let (graph, roots) = three_leaves();
    let options = RenderOptions {
        min_width: 50.0,
        print_addr: true,
        ..Default::default()
    };
    let report = render(&graph, &roots, &options);

    assert_eq!(report.records.len(), 1);
    assert_eq!(
        report.records[0].path(PathOrder::RootFirst),
        "main.cache 0x500\nbig 0x1000"
    );
}

#[test]
fn test_empty_forest_prints_nothing() {
    let report = render(&ObjGraph::new(), &RootSet::new(), &RenderOptions::default());
    assert_eq!(report.total_size, 0);
    assert!(report.records.is_empty());
    assert_eq!(report.to_text(PathOrder::RootFirst), "");
}

#[test]
fn test_line_count_never_grows_with_threshold() {
    let (graph, roots) = three_leaves();
    let mut previous = usize::MAX;
    for min_width in [0.0, 0.5, 1.0, 5.0, 9.0, 50.0, 90.0, 100.0] {
        let options = RenderOptions {
            min_width,
            ..Default::default()
        };
        let lines = render(&graph, &roots, &options).records.len();
        assert!(lines <= previous, "{} lines at {}%", lines, min_width);
        previous = lines;
    }
}
