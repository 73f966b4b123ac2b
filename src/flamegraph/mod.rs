//! Flamegraph rendering of object reference reports.
//!
//! Each printed record is drawn as a stack whose width is its leftover,
//! so the picture shows where retained bytes hang from.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, get_truncated_name, FlamegraphConfig};
