//! Utility modules for configuration, error handling, and byte sizes.

pub mod bytesize;
pub mod config;
pub mod error;

// Re-export commonly used items for convenience
pub use bytesize::{format_bytes, parse_bytes};
pub use error::{ByteSizeError, ConfigError, FlamegraphError, OutputError, SnapshotError, TreeError};
