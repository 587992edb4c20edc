use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{probe_limit, timestamp_column};
use crate::date_utils::RecordDate;
use crate::models::BookingRequest;

fn row_to_booking(row: &Row) -> rusqlite::Result<Option<BookingRequest>> {
    let Some(entry_date) = timestamp_column(row, 3, "booking_requests")? else {
        return Ok(None);
    };

    Ok(Some(BookingRequest {
        id: row.get(0)?,
        request_payload: row.get(1)?,
        account_id: row.get(2)?,
        entry_date,
        d_value: row.get(4)?,
        short_description: row.get(5)?,
        total_passengers: row.get(6)?,
    }))
}

pub fn get_booking_requests_for_day(
    conn: &Connection,
    day: RecordDate,
    limit: usize,
) -> rusqlite::Result<Vec<BookingRequest>> {
    let mut stmt = conn.prepare(
        "SELECT id, request_payload, account_id, entry_date, d_value, short_description, total_passengers
         FROM booking_requests
         WHERE entry_date >= ?1 AND entry_date < ?2
         ORDER BY id
         LIMIT ?3",
    )?;
    let requests = stmt
        .query_map(
            params![day.start_bound(), day.end_bound(), probe_limit(limit)],
            row_to_booking,
        )?
        .filter_map(Result::transpose)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(requests)
}

pub fn get_booking_request_by_id(
    conn: &Connection,
    id: i64,
) -> rusqlite::Result<Option<BookingRequest>> {
    let booking = conn
        .query_row(
            "SELECT id, request_payload, account_id, entry_date, d_value, short_description, total_passengers
             FROM booking_requests WHERE id = ?1",
            [id],
            row_to_booking,
        )
        .optional()?;
    Ok(booking.flatten())
}
