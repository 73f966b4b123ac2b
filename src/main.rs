//! heapref CLI
//!
//! Retained-memory reports for heap object graph snapshots.
//! Explains which reference chains keep memory alive.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use heapref::commands::{display_version, execute_objref, execute_top, validate_args, ObjrefArgs, TopArgs};
use heapref::utils::config::{load_config, ReportConfig};

/// heapref - where is my heap retained?
#[derive(Parser, Debug)]
#[command(name = "heapref")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Heap snapshot (JSON) to analyze
    #[arg(short, long, global = true, env = "HEAPREF_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Report configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the object reference report
    Objref {
        /// Report output file
        output: PathBuf,

        /// Elide branches below this percent of the total retained size
        #[arg(long)]
        minwidth: Option<f64>,

        /// Append hex addresses to path segments
        #[arg(long)]
        printaddr: bool,

        /// Print the deepest path segment first
        #[arg(long)]
        leaf_first: bool,

        /// Output path for SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Print the largest records to stdout
        #[arg(long)]
        summary: bool,

        /// Output path for the JSON run summary (optional)
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },

    /// Group objects of one type by reference path
    Top {
        /// Type name, as printed by objref
        object_type: String,

        /// Number of groups to show (non-positive shows all)
        #[arg(long, allow_negative_numbers = true)]
        top: Option<i64>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReportConfig::default(),
    };

    // Execute command
    match cli.command {
        Commands::Objref {
            output,
            minwidth,
            printaddr,
            leaf_first,
            flamegraph,
            summary,
            summary_json,
        } => {
            let args = ObjrefArgs {
                snapshot: require_snapshot(cli.snapshot)?,
                output,
                min_width: minwidth.unwrap_or(config.min_width),
                print_addr: printaddr || config.print_addr,
                leaf_first: leaf_first || config.leaf_first,
                flamegraph,
                flamegraph_width: config.flamegraph_width,
                print_summary: summary,
                summary_json,
            };

            // Validate args first
            validate_args(&args)?;

            execute_objref(&args)?;
        }

        Commands::Top { object_type, top } => {
            let args = TopArgs {
                snapshot: require_snapshot(cli.snapshot)?,
                object_type,
                top: top.unwrap_or(config.top),
            };
            execute_top(&args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

fn require_snapshot(snapshot: Option<PathBuf>) -> Result<PathBuf> {
    snapshot.context("--snapshot <FILE> is required for this command")
}
