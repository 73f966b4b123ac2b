use crate::utils::config::{ReportConfig, DEFAULT_MIN_WIDTH, DEFAULT_TOP};
use std::path::PathBuf;

/// Arguments for the objref command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ObjrefArgs {
    /// Heap snapshot to analyze
    pub snapshot: PathBuf,

    /// Report output file
    pub output: PathBuf,

    /// Percent of the total below which a branch is elided
    pub min_width: f64,

    /// Append hex addresses to path segments
    pub print_addr: bool,

    /// Deepest path segment first
    pub leaf_first: bool,

    /// Output path for SVG flamegraph (optional)
    pub flamegraph: Option<PathBuf>,

    /// Flamegraph width in pixels
    pub flamegraph_width: usize,

    /// Print largest records to stdout
    pub print_summary: bool,

    /// Output path for the JSON run summary (optional)
    pub summary_json: Option<PathBuf>,
}

impl Default for ObjrefArgs {
    fn default() -> Self {
        let config = ReportConfig::default();
        Self {
            snapshot: PathBuf::new(),
            output: PathBuf::from("objref.txt"),
            min_width: DEFAULT_MIN_WIDTH,
            print_addr: config.print_addr,
            leaf_first: config.leaf_first,
            flamegraph: None,
            flamegraph_width: config.flamegraph_width,
            print_summary: false,
            summary_json: None,
        }
    }
}

/// Arguments for the top command
#[derive(Debug, Clone)]
pub struct TopArgs {
    /// Heap snapshot to analyze
    pub snapshot: PathBuf,

    /// Type name, as printed by the objref report
    pub object_type: String,

    /// Groups to show; non-positive shows all
    pub top: i64,
}

impl Default for TopArgs {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::new(),
            object_type: String::new(),
            top: DEFAULT_TOP,
        }
    }
}
