//! Module related to header values.
//!
//! Header values arrive raw: possibly folded over several lines and
//! made of RFC 2047 encoded words in mixed charsets.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use log::warn;

/// Decodes a raw header value into a readable string.
///
/// Decoding never fails: raw 8-bit bytes are read as lossy UTF-8, and
/// a value that cannot be decoded is returned as is.
pub fn decode_header(raw: &[u8]) -> String {
    let unfolded: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| *b != b'\r' && *b != b'\n')
        .collect();
    // The decoder yields an empty string on invalid UTF-8 clear text.
    let unfolded = String::from_utf8_lossy(&unfolded);

    match rfc2047_decoder::decode(unfolded.as_bytes()) {
        Ok(decoded) => decoded.trim().to_owned(),
        Err(err) => {
            let lossy = unfolded.trim().to_owned();
            warn!("cannot decode header {:?}: {}", lossy, err);
            lossy
        }
    }
}

/// Parses a message date, keeping its offset when it follows RFC 2822.
///
/// Malformed dates accepted by `mailparse` come back in UTC. Values
/// without any recognizable day, month and year give `None`.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let raw = raw.as_str();
    if raw.is_empty() {
        return None;
    }

    // Trailing zone comments like "(UTC)" are not part of the grammar
    // chrono accepts.
    let stripped = match raw.rfind('(') {
        Some(idx) if raw.ends_with(')') => raw[..idx].trim_end(),
        _ => raw,
    };

    if let Ok(date) = DateTime::parse_from_rfc2822(stripped) {
        return Some(date);
    }

    match mailparse::dateparse(stripped) {
        // 0 means no year was found: the parser starts from the epoch.
        Ok(ts) if ts > 0 => Utc.timestamp_opt(ts, 0).single().map(DateTime::from),
        Ok(_) => {
            warn!("cannot parse date {:?}: no date found", raw);
            None
        }
        Err(err) => {
            warn!("cannot parse date {:?}: {}", raw, err);
            None
        }
    }
}
