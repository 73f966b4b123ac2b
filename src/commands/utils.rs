use crate::utils::config::SCHEMA_VERSION;

/// Display version information
pub fn display_version() {
    println!("heapref v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Retained-memory reports for heap object graph snapshots.");
}
