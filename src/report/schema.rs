//! Summary JSON schema written next to the object reference report.
//!
//! Schema is versioned to allow future evolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Totals and provenance of one objref run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Schema version for compatibility checking
    pub version: String,

    /// Snapshot the report was computed from
    pub snapshot: String,

    /// When the snapshot was taken, if known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub captured_at: Option<DateTime<Utc>>,

    /// Sum of all heap object sizes, before deduplication
    pub total_object_size: u64,

    /// Sum of retained sizes over every forest root
    pub total_retained_size: u64,

    /// Bytes accounted for by the printed records
    pub printed_size: u64,

    pub record_count: usize,
    pub global_roots: usize,
    pub goroutine_roots: usize,

    /// Addresses registered twice with different sizes
    pub size_mismatches: usize,

    /// Threshold used, in percent
    pub min_width: f64,

    /// Timestamp when the report was generated
    pub generated_at: String,
}
