//! Display helpers shared by the table columns, detail pages and exports.

use chrono::NaiveDateTime;
use std::fmt::Display;

/// Timestamps are shown as stored (wall-clock time of the booking system),
/// in day-first order: `02/01/2024, 10:30:05`.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Badge colour for an HTTP status code.
pub fn status_class(code: Option<i64>) -> &'static str {
    match code {
        Some(c) if (200..300).contains(&c) => "badge badge-success",
        Some(c) if (400..500).contains(&c) => "badge badge-warning",
        Some(c) if c >= 500 => "badge badge-error",
        _ => "badge badge-neutral",
    }
}

/// Value or a dash for empty table cells.
pub fn or_dash<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "-".to_string())
}

/// Value or "N/A" for detail panels.
pub fn or_na<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "N/A".to_string())
}
