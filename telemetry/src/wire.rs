//! Telemetry wire format.
//!
//! Each frame is one line of UTF-8 text terminated with LF (0x0A):
//!
//! ```text
//! none\n
//! 12.5,-4,-17.25\n
//! ```
//!
//! The payload is either the literal `none` (no target in the latest frame)
//! or exactly three comma-separated decimal numbers `dx,dy,tilt`. There is no
//! length prefix, checksum or version field. A trailing CR is tolerated so
//! that CRLF producers interoperate.

use shared::OffsetVector;
use thiserror::Error;

/// Payload signalling that no target is visible
pub const NONE_PAYLOAD: &str = "none";

/// Reasons a frame could not be decoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WireError {
    /// Frame had the wrong number of comma-separated fields
    #[error("Expected 3 fields, got {0}")]
    FieldCount(usize),

    /// A field was not a decimal number
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    /// A field parsed to NaN or infinity
    #[error("Non-finite value: {0:?}")]
    NonFinite(String),
}

/// Decode one frame (with or without its line terminator).
///
/// `Ok(None)` means the producer explicitly reported no target.
pub fn parse_message(line: &str) -> Result<Option<OffsetVector>, WireError> {
    let payload = line.trim();
    if payload == NONE_PAYLOAD {
        return Ok(None);
    }

    let fields: Vec<&str> = payload.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(WireError::FieldCount(fields.len()));
    }

    let mut values = [0.0; 3];
    for (value, field) in values.iter_mut().zip(&fields) {
        let parsed: f64 = field
            .parse()
            .map_err(|_| WireError::InvalidNumber(field.to_string()))?;
        if !parsed.is_finite() {
            return Err(WireError::NonFinite(field.to_string()));
        }
        *value = parsed;
    }

    Ok(Some(OffsetVector::from_array(values)))
}

/// Encode a frame, including the trailing newline.
pub fn format_message(vector: Option<&OffsetVector>) -> String {
    match vector {
        Some(v) => format!("{},{},{}\n", v.dx, v.dy, v.tilt),
        None => format!("{NONE_PAYLOAD}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector() {
        assert_eq!(
            parse_message("1.0,2.0,3.0\n"),
            Ok(Some(OffsetVector::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(
            parse_message(" -12.5, 4 ,-0.25\r\n"),
            Ok(Some(OffsetVector::new(-12.5, 4.0, -0.25)))
        );
    }

    #[test]
    fn test_parse_none() {
        assert_eq!(parse_message("none\n"), Ok(None));
        assert_eq!(parse_message("none\r\n"), Ok(None));
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(parse_message("1.0,2.0"), Err(WireError::FieldCount(2)));
        assert_eq!(parse_message("1,2,3,4"), Err(WireError::FieldCount(4)));
        assert_eq!(parse_message(""), Err(WireError::FieldCount(1)));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            parse_message("1.0,abc,3.0"),
            Err(WireError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_message("1.0,NaN,3.0"),
            Err(WireError::NonFinite(_))
        ));
        assert!(matches!(
            parse_message("inf,0,0"),
            Err(WireError::NonFinite(_))
        ));
        // Case matters for the sentinel
        assert!(parse_message("None").is_err());
    }

    #[test]
    fn test_format_message() {
        let vector = OffsetVector::new(9.5, -12.5, 0.0);
        assert_eq!(format_message(Some(&vector)), "9.5,-12.5,0\n");
        assert_eq!(format_message(None), "none\n");
        assert_eq!(parse_message(&format_message(Some(&vector))), Ok(Some(vector)));
    }
}
