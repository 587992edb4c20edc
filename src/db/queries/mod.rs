pub mod api_logs;
pub mod booking_requests;

use chrono::{DateTime, NaiveDateTime};
use rusqlite::Row;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a store timestamp. Accepts both the space and `T` separated forms,
/// with or without fractional seconds, plus RFC 3339 strings and a trailing
/// `+HHMM` offset. Offsets are dropped; the wall-clock time is kept as
/// written.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f %z")
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Read a timestamp column. An unreadable value yields `None` so the caller
/// can skip that one row instead of failing the whole result set.
pub(crate) fn timestamp_column(
    row: &Row,
    idx: usize,
    table: &str,
) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: String = row.get(idx)?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        let id: i64 = row.get(0)?;
        tracing::warn!(table, id, raw = %raw, "Skipping row with unreadable timestamp");
    }
    Ok(parsed)
}

/// `LIMIT` value that lets the caller detect an over-sized result: one row
/// more than it is willing to accept.
pub(crate) fn probe_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX - 1).saturating_add(1)
}
