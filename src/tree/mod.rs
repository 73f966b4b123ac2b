//! Deduplicated reference forest and retained sizes.
//!
//! This module transforms the canonical (cyclic, shared) object graph into:
//! - A forest where every reachable address appears once
//! - Retained sizes per tree node, summed bottom-up
//! - Shortest root chains for individual objects

pub mod aggregate;
pub mod builder;
pub mod reach;

// Re-export main types and functions
pub use aggregate::{aggregate, aggregate_forest};
pub use builder::{build_forest, Forest, ForestBuilder, TreeEdge, TreeId, TreeNode};
pub use reach::{ChainLink, ReachIndex};
