//! Text reports over the sized forest and the canonical graph.
//!
//! - `objref`: the thresholded, path-compressed reference report
//! - `top`: objects of one type grouped by reference signature
//! - `summary`: largest records and leftover statistics
//! - `schema`: the JSON summary written alongside a report

pub mod objref;
pub mod schema;
pub mod summary;
pub mod top;

// Re-export main types and functions
pub use objref::{
    render_forest, render_path, sanitize_segment, PathOrder, RefReport, RenderOptions, ReportRecord, Segment,
    SegmentKind,
};
pub use schema::ReportSummary;
pub use summary::{calculate_distribution, generate_text_summary, hot_records, HotRecord, LeftoverDistribution};
pub use top::{signature_of, top_by_type, TypeGroup, TypeReport, UNREACHABLE};
