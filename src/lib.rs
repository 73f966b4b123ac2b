//! heapref
//!
//! Retained-memory reports for heap object graphs.
//!
//! The pipeline turns a provider's objects, pointers and roots into a
//! canonical graph ([`graph`]), flattens it into a deduplicated forest and
//! sizes it ([`tree`]), then renders thresholded reference paths
//! ([`report`]). The `heapref` binary drives it over JSON snapshots
//! ([`provider::snapshot`]).
//!
//! ```bash
//! heapref --snapshot heap.json objref report.txt --minwidth 1
//! heapref --snapshot heap.json top main.entry --top 10
//! ```

pub mod commands;
pub mod flamegraph;
pub mod graph;
pub mod output;
pub mod provider;
pub mod report;
pub mod tree;
pub mod utils;
