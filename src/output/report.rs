//! Object reference report writer.

use super::{ensure_parent, validate_path};
use crate::report::{PathOrder, RefReport};
use crate::utils::error::OutputError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the records of `report` to `output_path`, replacing any existing file
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_report_file(
    report: &RefReport,
    order: PathOrder,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing report to: {}", output_path.display());

    validate_path(output_path)?;
    ensure_parent(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    report.write_to(&mut writer, order)?;
    writer.flush()?;

    info!("Report written successfully ({} records)", report.records.len());
    Ok(())
}
