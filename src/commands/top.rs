//! Top command: group objects of one type by reference signature.

use super::models::TopArgs;
use crate::graph::ingest;
use crate::provider::SnapshotProvider;
use crate::report::{top_by_type, TypeReport};
use anyhow::{Context, Result};
use log::info;

/// Execute the top command and print its table to stdout
pub fn execute_top(args: &TopArgs) -> Result<TypeReport> {
    if args.object_type.trim().is_empty() {
        anyhow::bail!("Object type cannot be empty");
    }

    let provider = SnapshotProvider::load(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    let heap = ingest(&provider);

    let report = top_by_type(&provider, &heap, &args.object_type, args.top)
        .with_context(|| format!("Failed to group objects of type {}", args.object_type))?;

    info!("{} groups of {}", report.groups.len(), report.object_type);
    print!("{}", report.render_table());
    Ok(report)
}
