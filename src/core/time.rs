// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/time.rs
// Version: 1.0.0
//
// Timestamp helpers for record stamping and date-aware sorting.
//
// Tree Location:
// - src/core/time.rs (timestamp helpers)
// - Depends on: chrono

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Current time as an RFC 3339 UTC string with millisecond precision,
/// e.g. `2026-10-19T12:00:00.000Z`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601-like date string into epoch milliseconds.
///
/// Accepts full RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// timestamps (read as UTC) and plain `YYYY-MM-DD` dates.
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.len() < 10 || !value.as_bytes()[0].is_ascii_digit() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_iso_is_parseable_utc() {
        let now = now_iso();
        assert!(now.ends_with('Z'));
        assert!(parse_timestamp_millis(&now).is_some());
    }

    #[test]
    fn parses_supported_shapes() {
        assert_eq!(parse_timestamp_millis("1970-01-01T00:00:01.000Z"), Some(1_000));
        assert_eq!(parse_timestamp_millis("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_timestamp_millis("1970-01-01T00:01:00"), Some(60_000));
        assert_eq!(
            parse_timestamp_millis("1970-01-01T01:00:00+01:00"),
            Some(0)
        );
    }

    #[test]
    fn rejects_plain_text() {
        assert_eq!(parse_timestamp_millis("Ethereum Classic"), None);
        assert_eq!(parse_timestamp_millis("GPU-001"), None);
        assert_eq!(parse_timestamp_millis(""), None);
    }
}
