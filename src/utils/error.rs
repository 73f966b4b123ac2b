//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::graph::Address;
use thiserror::Error;

/// Errors that can occur while loading a heap snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur while building the reference forest
///
/// These are internal defects in frontier bookkeeping, never user errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("Internal error: children requested for node {address} before it was marked visited")]
    UnvisitedNode { address: Address },
}

/// Errors that can occur while parsing a human byte size
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ByteSizeError {
    #[error("invalid size: {0}")]
    NoNumber(String),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("unrecognized unit: {0}")]
    UnrecognizedUnit(String),

    #[error("size out of range: {0}")]
    Overflow(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Report has no records to draw")]
    EmptyReport,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading a report configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML config: {0}")]
    ParseFailed(#[from] toml::de::Error),
}
