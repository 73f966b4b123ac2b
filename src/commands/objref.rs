//! Objref command implementation.
//!
//! The objref command:
//! 1. Loads the heap snapshot
//! 2. Ingests objects and roots into the canonical graph
//! 3. Builds the deduplicated forest
//! 4. Aggregates retained sizes
//! 5. Renders the thresholded report
//! 6. Writes output files

use super::models::ObjrefArgs;
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::graph::ingest;
use crate::output::{validate_path, write_report_file, write_summary, write_svg};
use crate::provider::SnapshotProvider;
use crate::report::{
    calculate_distribution, generate_text_summary, render_forest, PathOrder, RefReport, RenderOptions,
    ReportSummary,
};
use crate::tree::{aggregate_forest, build_forest};
use crate::utils::config::{SCHEMA_VERSION, SUMMARY_ROWS};
use crate::utils::format_bytes;
use anyhow::{Context, Result};
use log::{info, warn};
use std::time::Instant;

/// Execute the objref command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The rendered report, after every requested file has been written
///
/// # Errors
/// * Unreadable or malformed snapshot
/// * Forest invariant violation
/// * File write errors
pub fn execute_objref(args: &ObjrefArgs) -> Result<RefReport> {
    let start_time = Instant::now();

    info!("Loading snapshot: {}", args.snapshot.display());
    let provider = SnapshotProvider::load(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;

    // Step 1: Ingest
    let heap = ingest(&provider);

    // Step 2: Forest
    let mut forest = build_forest(&heap.graph, &heap.roots).context("Failed to build reference forest")?;

    // Step 3: Sizes
    let total = aggregate_forest(&mut forest);

    // Step 4: Render
    let options = RenderOptions {
        min_width: args.min_width,
        print_addr: args.print_addr,
        order: path_order(args),
    };
    let report = render_forest(&forest, total, &options);

    // Step 5: Write outputs
    write_report_file(&report, options.order, &args.output).context("Failed to write objref report")?;

    info!("Printed size: {}", format_bytes(report.printed_size));
    info!("Wrote {}", args.output.display());

    if let Some(svg_path) = &args.flamegraph {
        if report.records.is_empty() {
            warn!("Nothing above the threshold, skipping flamegraph");
        } else {
            let config = FlamegraphConfig::new()
                .with_title(format!("Retained memory: {}", args.snapshot.display()))
                .with_width(args.flamegraph_width);
            let svg = generate_flamegraph(&report, Some(&config)).context("Failed to generate flamegraph")?;
            write_svg(&svg, svg_path).context("Failed to write flamegraph SVG")?;
            info!("✓ Flamegraph written to: {}", svg_path.display());
        }
    }

    if let Some(json_path) = &args.summary_json {
        let summary = ReportSummary {
            version: SCHEMA_VERSION.to_string(),
            snapshot: args.snapshot.display().to_string(),
            captured_at: provider.snapshot().captured_at,
            total_object_size: heap.sum_object_size,
            total_retained_size: total,
            printed_size: report.printed_size,
            record_count: report.records.len(),
            global_roots: heap.roots.globals().len(),
            goroutine_roots: heap.roots.goroutines().len(),
            size_mismatches: heap.graph.size_mismatches().len(),
            min_width: args.min_width,
            generated_at: chrono::Utc::now().to_rfc3339(),
        };
        write_summary(&summary, json_path).context("Failed to write summary JSON")?;
        info!("✓ Summary written to: {}", json_path.display());
    }

    if args.print_summary {
        let dist = calculate_distribution(&report);
        println!("\n{}", "=".repeat(80));
        println!("OBJREF SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Snapshot:      {}", args.snapshot.display());
        println!("Object size:   {}", format_bytes(heap.sum_object_size));
        println!("Retained size: {}", format_bytes(total));
        println!("Printed size:  {}", format_bytes(report.printed_size));
        println!("{}", dist.summary());
        if dist.is_highly_concentrated() {
            println!("Largest 10% of records hold most of the printed bytes");
        }
        println!("\n{}", generate_text_summary(&report, SUMMARY_ROWS));
        println!("{}", "=".repeat(80));
    }

    info!("Objref completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(report)
}

fn path_order(args: &ObjrefArgs) -> PathOrder {
    if args.leaf_first {
        PathOrder::LeafFirst
    } else {
        PathOrder::RootFirst
    }
}

/// Validate objref arguments
///
/// **Public** - called before execute_objref so bad flags never leave a file behind
pub fn validate_args(args: &ObjrefArgs) -> Result<()> {
    if !args.min_width.is_finite() {
        anyhow::bail!("minwidth must be a finite number");
    }

    if !(0.0..=100.0).contains(&args.min_width) {
        anyhow::bail!("minwidth must be between 0 and 100 (got {})", args.min_width);
    }

    validate_path(&args.output).context("Invalid report output path")?;

    if let Some(svg_path) = &args.flamegraph {
        validate_path(svg_path).context("Invalid flamegraph output path")?;
    }

    if let Some(json_path) = &args.summary_json {
        validate_path(json_path).context("Invalid summary output path")?;
    }

    Ok(())
}
