//! Canonical object graph and its ingestion from a provider.
//!
//! This module turns provider callbacks into:
//! - One node per address, with placeholder-name upgrades
//! - Labeled edges in discovery order
//! - The ordered set of global and goroutine roots

pub mod ingest;
pub mod node;

// Re-export main types and functions
pub use ingest::{goroutine_name, ingest, HeapGraph, RootSet};
pub use node::{is_placeholder, Address, NodeId, ObjGraph, ObjNode, Ref, SizeMismatch};
