//! Configuration and constants for the CLI.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current summary JSON schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Name prefix the provider uses for objects whose type is unknown.
/// A node carrying it may later be renamed to a concrete type.
pub const PLACEHOLDER_PREFIX: &str = "unk";

/// Percent of total retained size below which a branch is elided
pub const DEFAULT_MIN_WIDTH: f64 = 0.0;

/// Non-positive means "show every group"
pub const DEFAULT_TOP: i64 = 0;

pub const DEFAULT_FLAMEGRAPH_WIDTH: usize = 1200;

/// Rows shown by the `--summary` table
pub const SUMMARY_ROWS: usize = 10;

/// Report settings loadable from a TOML file.
///
/// Every key is optional; CLI flags given explicitly take precedence.
///
/// ```toml
/// min_width = 0.5
/// print_addr = true
/// top = 20
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Minimum share of the total (in percent) a branch needs to be printed
    pub min_width: f64,

    /// Append the hex address to every path segment
    pub print_addr: bool,

    /// Print the deepest segment first instead of the root
    pub leaf_first: bool,

    /// Groups shown by the top-by-type report
    pub top: i64,

    /// Flamegraph width in pixels
    pub flamegraph_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            print_addr: false,
            leaf_first: false,
            top: DEFAULT_TOP,
            flamegraph_width: DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

/// Load a report configuration from a TOML file
///
/// # Errors
/// * `ConfigError::IoError` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid
pub fn load_config(path: impl AsRef<Path>) -> Result<ReportConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ReportConfig = toml::from_str(&contents)?;
    Ok(config)
}
