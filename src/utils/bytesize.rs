//! Human-readable byte sizes: `2048` <-> `"2.00KB"`.
//!
//! Units are binary (powers of 1024). Formatting picks the largest unit the
//! value reaches and prints two decimals; values under 1KB print as plain
//! bytes.

use super::error::ByteSizeError;

pub const KB: u64 = 1 << 10;
pub const MB: u64 = 1 << 20;
pub const GB: u64 = 1 << 30;
pub const TB: u64 = 1 << 40;
pub const PB: u64 = 1 << 50;
pub const EB: u64 = 1 << 60;

/// Unit ladder, largest first. ZB and YB do not fit in a `u64`, so they
/// only appear on the parsing side.
const FORMAT_UNITS: [(&str, u64); 6] = [
    ("EB", EB),
    ("PB", PB),
    ("TB", TB),
    ("GB", GB),
    ("MB", MB),
    ("KB", KB),
];

/// Format a byte count, e.g. `format_bytes(2048) == "2.00KB"`
pub fn format_bytes(bytes: u64) -> String {
    for (suffix, unit) in FORMAT_UNITS {
        if bytes >= unit {
            return format!("{:.2}{}", bytes as f64 / unit as f64, suffix);
        }
    }
    format!("{}B", bytes)
}

/// Parse a byte size such as `"2KB"`, `"1.5mb"` or `"512"`
///
/// The trailing alphabetic suffix is matched case-insensitively; an empty
/// suffix means bytes and `KiB`-style spellings are accepted.
///
/// # Errors
/// * `ByteSizeError::NoNumber` - no digits in the input
/// * `ByteSizeError::InvalidNumber` - the numeric prefix does not parse or is negative
/// * `ByteSizeError::UnrecognizedUnit` - unknown suffix
/// * `ByteSizeError::Overflow` - the value does not fit in 64 bits
pub fn parse_bytes(input: &str) -> Result<u64, ByteSizeError> {
    let s = input.trim();
    let split = s
        .rfind(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ByteSizeError::NoNumber(input.to_string()))?;

    let (number_part, unit_part) = s.split_at(split + 1);
    let number: f64 = number_part
        .trim()
        .parse()
        .map_err(|_| ByteSizeError::InvalidNumber(number_part.to_string()))?;
    if !number.is_finite() || number < 0.0 {
        return Err(ByteSizeError::InvalidNumber(number_part.to_string()));
    }

    let multiplier = unit_multiplier(unit_part.trim())
        .ok_or_else(|| ByteSizeError::UnrecognizedUnit(unit_part.trim().to_string()))?;

    let bytes = number * multiplier;
    // u64::MAX as f64 rounds up to 2^64; casting saturates for that edge.
    if bytes > u64::MAX as f64 {
        return Err(ByteSizeError::Overflow(input.to_string()));
    }
    Ok(bytes as u64)
}

fn unit_multiplier(unit: &str) -> Option<f64> {
    let unit = unit.to_ascii_uppercase();
    let unit = unit.replace("IB", "B");
    let exponent = match unit.as_str() {
        "" | "B" => 0,
        "KB" | "K" => 1,
        "MB" | "M" => 2,
        "GB" | "G" => 3,
        "TB" | "T" => 4,
        "PB" | "P" => 5,
        "EB" | "E" => 6,
        "ZB" | "Z" => 7,
        "YB" | "Y" => 8,
        _ => return None,
    };
    Some(1024f64.powi(exponent))
}
