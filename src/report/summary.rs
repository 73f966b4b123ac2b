//! Largest records and leftover distribution of an object reference report.
//!
//! The records with the biggest leftover are the first places to look when
//! hunting for retained memory.

use super::objref::{PathOrder, RefReport};
use crate::utils::format_bytes;
use log::debug;

/// A record ranked by leftover bytes
#[derive(Debug, Clone, PartialEq)]
pub struct HotRecord {
    /// Root-first path on a single line, segments joined by " > "
    pub path: String,
    pub leftover: u64,
    /// Share of the report total
    pub percentage: f64,
}

/// Top `top_n` records by leftover, largest first
pub fn hot_records(report: &RefReport, top_n: usize) -> Vec<HotRecord> {
    debug!("Ranking top {} of {} records", top_n, report.records.len());

    let mut ranked: Vec<_> = report.records.iter().collect();
    ranked.sort_by(|a, b| b.leftover.cmp(&a.leftover));

    ranked
        .into_iter()
        .take(top_n)
        .map(|record| HotRecord {
            path: record.path(PathOrder::RootFirst).replace('\n', " > "),
            leftover: record.leftover,
            percentage: percentage(record.leftover, report.total_size),
        })
        .collect()
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Leftover distribution statistics
#[derive(Debug, Clone, Default)]
pub struct LeftoverDistribution {
    pub record_count: usize,
    pub printed_size: u64,
    pub mean_leftover: u64,
    pub median_leftover: u64,
    /// Share of the printed bytes held by the largest 10% of records
    pub top_10_percent_percentage: f64,
}

impl LeftoverDistribution {
    /// True if the largest 10% of records hold more than 80% of what was printed
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    pub fn summary(&self) -> String {
        format!(
            "Records: {} | Printed: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.record_count,
            format_bytes(self.printed_size),
            self.mean_leftover,
            self.median_leftover,
            self.top_10_percent_percentage
        )
    }
}

pub fn calculate_distribution(report: &RefReport) -> LeftoverDistribution {
    if report.records.is_empty() {
        return LeftoverDistribution::default();
    }

    let mut leftovers: Vec<u64> = report.records.iter().map(|r| r.leftover).collect();
    leftovers.sort_unstable_by(|a, b| b.cmp(a));

    let count = leftovers.len();
    let sum: u64 = leftovers.iter().sum();
    let top_count = (count as f64 * 0.1).ceil() as usize;
    let top_sum: u64 = leftovers.iter().take(top_count).sum();

    LeftoverDistribution {
        record_count: count,
        printed_size: report.printed_size,
        mean_leftover: sum / count as u64,
        median_leftover: leftovers[count / 2],
        top_10_percent_percentage: percentage(top_sum, sum),
    }
}

/// Text table of the largest records
pub fn generate_text_summary(report: &RefReport, max_lines: usize) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{:>12}  {:>6}  {}", "LEFTOVER", "%", "PATH"));

    for hot in hot_records(report, max_lines) {
        lines.push(format!("{:>12}  {:>5.1}%  {}", hot.leftover, hot.percentage, hot.path));
    }

    if report.records.len() > max_lines {
        lines.push(format!(
            "(Showing top {} of {} records)",
            max_lines,
            report.records.len()
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::objref::{ReportRecord, Segment, SegmentKind};

    fn record(path: &[&str], leftover: u64) -> ReportRecord {
        ReportRecord {
            segments: path
                .iter()
                .map(|s| Segment {
                    text: s.to_string(),
                    kind: SegmentKind::Object,
                })
                .collect(),
            leftover,
        }
    }

    fn report() -> RefReport {
        RefReport {
            records: vec![
                record(&["g", "small"], 100),
                record(&["g", "big"], 8500),
                record(&["g", "mid"], 1000),
                record(&["h"], 400),
            ],
            total_size: 10_000,
            printed_size: 10_000,
        }
    }

    #[test]
    fn test_hot_records_sorted() {
        let hot = hot_records(&report(), 2);
        assert_eq!(hot.len(), 2);
        assert_eq!(hot[0].path, "g > big");
        assert_eq!(hot[0].percentage, 85.0);
        assert_eq!(hot[1].leftover, 1000);
    }

    #[test]
    fn test_distribution() {
        let dist = calculate_distribution(&report());
        assert_eq!(dist.record_count, 4);
        assert_eq!(dist.mean_leftover, 2500);
        assert_eq!(dist.median_leftover, 400);
        assert!(dist.is_highly_concentrated());
        assert!(dist.summary().contains("Printed: 9.77KB"));
    }

    #[test]
    fn test_distribution_empty() {
        let dist = calculate_distribution(&RefReport::default());
        assert_eq!(dist.record_count, 0);
        assert!(!dist.is_highly_concentrated());
    }

    #[test]
    fn test_text_summary_mentions_truncation() {
        let text = generate_text_summary(&report(), 3);
        assert!(text.contains("g > big"));
        assert!(text.contains("(Showing top 3 of 4 records)"));
    }
}
