use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{probe_limit, timestamp_column};
use crate::date_utils::RecordDate;
use crate::models::{ApiLog, LogStream};

const LOG_COLUMNS: &str = "log_id, endpoint_url, request_body, response_body, vendor_id, entry_date,
     status_text, status_code, source_ip, account_id, source, pnr_number, booking_request_id";

fn row_to_log(row: &Row, table: &str) -> rusqlite::Result<Option<ApiLog>> {
    let Some(timestamp) = timestamp_column(row, 5, table)? else {
        return Ok(None);
    };

    Ok(Some(ApiLog {
        log_id: row.get(0)?,
        endpoint_url: row.get(1)?,
        request_body: row.get(2)?,
        response_body: row.get(3)?,
        vendor_id: row.get(4)?,
        timestamp,
        status_text: row.get(6)?,
        status_code: row.get(7)?,
        source_ip: row.get(8)?,
        account_id: row.get(9)?,
        source: row.get(10)?,
        pnr_number: row.get(11)?,
        booking_request_id: row.get(12)?,
    }))
}

/// All logs of `stream` written on `day`, capped at `limit + 1` rows so the
/// caller can tell an over-sized day apart from one that fits exactly.
pub fn get_logs_for_day(
    conn: &Connection,
    stream: LogStream,
    day: RecordDate,
    limit: usize,
) -> rusqlite::Result<Vec<ApiLog>> {
    let sql = format!(
        "SELECT {} FROM {}
         WHERE entry_date >= ?1 AND entry_date < ?2
         ORDER BY log_id
         LIMIT ?3",
        LOG_COLUMNS,
        stream.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let logs = stmt
        .query_map(
            params![day.start_bound(), day.end_bound(), probe_limit(limit)],
            |row| row_to_log(row, stream.table()),
        )?
        .filter_map(Result::transpose)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(logs)
}

/// Every general API log tied to a booking request, any date.
pub fn get_logs_for_booking(
    conn: &Connection,
    booking_request_id: &str,
    limit: usize,
) -> rusqlite::Result<Vec<ApiLog>> {
    let sql = format!(
        "SELECT {} FROM {}
         WHERE booking_request_id = ?1
         ORDER BY log_id
         LIMIT ?2",
        LOG_COLUMNS,
        LogStream::General.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let logs = stmt
        .query_map(params![booking_request_id, probe_limit(limit)], |row| {
            row_to_log(row, LogStream::General.table())
        })?
        .filter_map(Result::transpose)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(logs)
}

pub fn get_log_by_id(
    conn: &Connection,
    stream: LogStream,
    log_id: i64,
) -> rusqlite::Result<Option<ApiLog>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE log_id = ?1",
        LOG_COLUMNS,
        stream.table()
    );
    let log = conn
        .query_row(&sql, [log_id], |row| row_to_log(row, stream.table()))
        .optional()?;
    Ok(log.flatten())
}
