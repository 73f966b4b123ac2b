//! JSON summary output writer.

use super::{ensure_parent, validate_path};
use crate::report::ReportSummary;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a run summary as pretty JSON
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_summary(summary: &ReportSummary, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing summary to: {}", output_path.display());

    validate_path(output_path)?;
    ensure_parent(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;

    Ok(())
}

/// Read a run summary back from disk
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_summary(input_path: impl AsRef<Path>) -> Result<ReportSummary, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading summary from: {}", input_path.display());

    let file = File::open(input_path)?;
    let summary: ReportSummary = serde_json::from_reader(BufReader::new(file))?;

    debug!("Summary loaded: version {}, snapshot {}", summary.version, summary.snapshot);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_summary() -> ReportSummary {
        ReportSummary {
            version: "1.0.0".to_string(),
            snapshot: "heap.json".to_string(),
            captured_at: None,
            total_object_size: 4096,
            total_retained_size: 4000,
            printed_size: 3900,
            record_count: 7,
            global_roots: 2,
            goroutine_roots: 1,
            size_mismatches: 0,
            min_width: 1.0,
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_write_and_read_summary() {
        let summary = create_test_summary();
        let temp_file = NamedTempFile::new().unwrap();

        write_summary(&summary, temp_file.path()).unwrap();
        let loaded = read_summary(temp_file.path()).unwrap();

        assert_eq!(loaded, summary);
    }

    #[test]
    fn test_captured_at_omitted_when_unknown() {
        let temp_file = NamedTempFile::new().unwrap();
        write_summary(&create_test_summary(), temp_file.path()).unwrap();

        let raw = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(!raw.contains("captured_at"));
    }

    #[test]
    fn test_read_summary_invalid_json() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "{ not json").unwrap();
        assert!(matches!(
            read_summary(temp_file.path()),
            Err(OutputError::SerializationFailed(_))
        ));
    }
}
