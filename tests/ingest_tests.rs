use heapref::graph::{ingest, Address, ObjGraph};
use heapref::provider::SnapshotProvider;

#[test]
fn test_register_same_object_twice() {
    let mut graph = ObjGraph::new();
    let (first, existed) = graph.register_object("main.T", Address(0x100), 32);
    assert!(!existed);

    let (second, existed) = graph.register_object("main.T", Address(0x100), 32);
    assert!(existed);
    assert_eq!(first, second);
    assert_eq!(graph.len(), 1);
    assert!(graph.size_mismatches().is_empty());
}

#[test]
fn test_size_mismatch_keeps_original_size() {
    let mut graph = ObjGraph::new();
    let (id, _) = graph.register_object("main.T", Address(0x100), 32);
    graph.register_object("main.T", Address(0x100), 48);

    assert_eq!(graph.len(), 1);
    assert_eq!(graph.node(id).own_size, 32);

    let mismatches = graph.size_mismatches();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].address, Address(0x100));
    assert_eq!(mismatches[0].old_size, 32);
    assert_eq!(mismatches[0].new_size, 48);
}

#[test]
fn test_placeholder_name_is_upgraded_not_downgraded() {
    let mut graph = ObjGraph::new();
    let (id, _) = graph.register_object("unk16", Address(0x10), 16);
    graph.register_object("main.Node", Address(0x10), 16);
    assert_eq!(graph.node(id).name, "main.Node");

    graph.register_object("unk16", Address(0x10), 16);
    graph.register_object("main.Other", Address(0x10), 16);
    assert_eq!(graph.node(id).name, "main.Node");
}

#[test]
fn test_edges_keep_discovery_order() {
    let mut graph = ObjGraph::new();
    let (p, _) = graph.register_object("P", Address(1), 8);
    let (a, _) = graph.register_object("A", Address(2), 8);
    let (b, _) = graph.register_object("B", Address(3), 8);
    graph.append_edge(p, b, "second");
    graph.append_edge(p, a, "");
    graph.append_edge(p, b, "again");

    let labels: Vec<&str> = graph.node(p).refs.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["second", "", "again"]);
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn test_ingest_snapshot_roots() {
    let provider = SnapshotProvider::from_json_str(
        r#"{
            "types": { "main.Pair": { "size": 16, "fields": [
                { "offset": 0, "name": "left" }, { "offset": 8, "name": "right" }
            ] } },
            "objects": [
                { "address": "0x1000", "size": 16, "type": "main.Pair",
                  "pointers": [{ "offset": 0, "target": "0x2000" }, { "offset": 12, "target": "0x2008" }] },
                { "address": "0x2000", "size": 32 },
                { "address": "0x3000", "size": 64 }
            ],
            "globals": [
                { "name": "main.pair", "address": "0x500", "type": "main.Pair",
                  "pointers": [{ "offset": 8, "target": "0x1000" }] },
                { "name": "main.pairAlias", "address": "0x500" }
            ],
            "goroutines": [{ "address": "0x3000" }, { "address": "0x4000" }]
        }"#,
    )
    .unwrap();

    let heap = ingest(&provider);

    assert_eq!(heap.sum_object_size, 112);
    assert_eq!(heap.roots.globals().len(), 1);
    assert_eq!(heap.roots.goroutines().len(), 2);

    let pair = heap.graph.node(heap.graph.lookup(Address(0x1000)).unwrap());
    let labels: Vec<&str> = pair.refs.iter().map(|r| r.label.as_str()).collect();
    // The second pointer lands inside the same target object.
    assert_eq!(labels, vec!["left", "right+4"]);
    assert_eq!(pair.refs[0].target, pair.refs[1].target);

    let unknown = heap.graph.node(heap.graph.lookup(Address(0x2000)).unwrap());
    assert_eq!(unknown.name, "unk32");

    let goroutine = heap.graph.node(heap.roots.goroutines()[1]);
    assert_eq!(goroutine.name, "go4000");
    assert_eq!(goroutine.own_size, 0);

    let global = heap.graph.node(heap.roots.globals()[0]);
    assert_eq!(global.name, "main.pair");
    assert_eq!(global.refs[0].label, "right");
}
