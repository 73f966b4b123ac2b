use heapref::utils::bytesize::{GB, KB, MB};
use heapref::utils::{format_bytes, parse_bytes, ByteSizeError};

#[test]
fn test_format_and_parse_examples() {
    assert_eq!(format_bytes(2048), "2.00KB");
    assert_eq!(parse_bytes("2KB"), Ok(2048));
    assert_eq!(parse_bytes("1.5MB"), Ok(1_572_864));
}

#[test]
fn test_unknown_unit_is_an_error() {
    assert!(matches!(parse_bytes("5XB"), Err(ByteSizeError::UnrecognizedUnit(_))));
}

#[test]
fn test_missing_number_is_an_error() {
    assert!(matches!(parse_bytes("KB"), Err(ByteSizeError::NoNumber(_))));
    assert!(matches!(parse_bytes(""), Err(ByteSizeError::NoNumber(_))));
}

#[test]
fn test_negative_is_an_error() {
    assert!(matches!(parse_bytes("-3KB"), Err(ByteSizeError::InvalidNumber(_))));
}

#[test]
fn test_overflow() {
    assert!(matches!(parse_bytes("17EB"), Err(ByteSizeError::Overflow(_))));
    assert!(matches!(parse_bytes("1ZB"), Err(ByteSizeError::Overflow(_))));
}

#[test]
fn test_formatted_values_parse_back() {
    for n in [0, 1, 1023, KB, 3 * KB + 17, 7 * MB + 12345, 5 * GB + 1] {
        let text = format_bytes(n);
        let parsed = parse_bytes(&text).unwrap();
        assert!(parsed.abs_diff(n) <= n / 200 + 1, "{} -> {} -> {}", n, text, parsed);
    }
}
