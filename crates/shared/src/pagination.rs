//! Cursor-based pagination utilities.
//!
//! Cursors encode `(timestamp, id)` so listings with identical timestamps
//! still page deterministically.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error type for cursor operations.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("Invalid ID in cursor")]
    InvalidId,
}

/// Encodes a cursor as base64(RFC3339_timestamp:id).
pub fn encode_cursor(created_at: DateTime<Utc>, id: i64) -> String {
    let raw = format!(
        "{}:{}",
        created_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        id
    );
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Decodes a cursor into `(timestamp, id)`.
pub fn decode_cursor(cursor: &str) -> Result<(DateTime<Utc>, i64), CursorError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;

    let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

    // Split on the last colon; the timestamp itself contains colons.
    let colon_pos = s.rfind(':').ok_or(CursorError::InvalidFormat)?;

    let timestamp_str = &s[..colon_pos];
    let id_str = &s[colon_pos + 1..];

    let id: i64 = id_str.parse().map_err(|_| CursorError::InvalidId)?;

    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .map_err(|_| CursorError::InvalidTimestamp)?
        .with_timezone(&Utc);

    Ok((timestamp, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        let ts = Utc::now();
        let cursor = encode_cursor(ts, 42);
        let (decoded_ts, decoded_id) = decode_cursor(&cursor).unwrap();
        assert_eq!(decoded_id, 42);
        // Micros precision survives the round trip
        assert_eq!(decoded_ts.timestamp_micros(), ts.timestamp_micros());
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        assert!(matches!(
            decode_cursor("!!!not-base64!!!"),
            Err(CursorError::InvalidEncoding)
        ));
    }

    #[test]
    fn test_decode_rejects_missing_id() {
        let cursor = URL_SAFE_NO_PAD.encode(b"2024-01-01T00.00.00Z");
        assert!(decode_cursor(&cursor).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let cursor = URL_SAFE_NO_PAD.encode(b"yesterday:7");
        assert!(matches!(
            decode_cursor(&cursor),
            Err(CursorError::InvalidTimestamp)
        ));
    }
}
