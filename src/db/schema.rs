//! Layout of the reporting store as this dashboard reads it.
//!
//! The production store is owned elsewhere and opened read-only; this DDL
//! exists so an empty local or in-memory store can be stood up for
//! development and tests.

use rusqlite::Connection;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS api_logs (
    log_id INTEGER PRIMARY KEY,
    endpoint_url TEXT NOT NULL,
    request_body TEXT,
    response_body TEXT,
    vendor_id INTEGER,
    entry_date TEXT NOT NULL,
    status_text TEXT,
    status_code INTEGER,
    source_ip TEXT,
    account_id INTEGER,
    source TEXT,
    pnr_number TEXT,
    booking_request_id TEXT
);
CREATE INDEX IF NOT EXISTS idx_api_logs_entry_date ON api_logs (entry_date);
CREATE INDEX IF NOT EXISTS idx_api_logs_booking ON api_logs (booking_request_id);

CREATE TABLE IF NOT EXISTS search_logs (
    log_id INTEGER PRIMARY KEY,
    endpoint_url TEXT NOT NULL,
    request_body TEXT,
    response_body TEXT,
    vendor_id INTEGER,
    entry_date TEXT NOT NULL,
    status_text TEXT,
    status_code INTEGER,
    source_ip TEXT,
    account_id INTEGER,
    source TEXT,
    pnr_number TEXT,
    booking_request_id TEXT
);
CREATE INDEX IF NOT EXISTS idx_search_logs_entry_date ON search_logs (entry_date);

CREATE TABLE IF NOT EXISTS booking_requests (
    id INTEGER PRIMARY KEY,
    request_payload TEXT,
    account_id TEXT NOT NULL,
    entry_date TEXT NOT NULL,
    d_value TEXT,
    short_description TEXT,
    total_passengers INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_booking_requests_entry_date ON booking_requests (entry_date);
";

pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    tracing::debug!("Ensuring reporting store schema");
    conn.execute_batch(SCHEMA)
}
