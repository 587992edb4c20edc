use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;

use super::schema;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Open the reporting store read-only. The dashboard never writes, and the
/// connection flags plus `query_only` make that a property of the pool.
pub fn create_pool(database_path: &Path) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_init(|conn| {
            conn.execute_batch(
                "PRAGMA query_only = ON;
                 PRAGMA busy_timeout = 5000;",
            )
        });

    Pool::builder().max_size(10).build(manager)
}

/// Single-connection in-memory store with the schema applied. Every
/// connection to `:memory:` is its own database, hence `max_size(1)`.
pub fn create_in_memory_pool() -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::memory().with_init(|conn| schema::ensure_schema(conn));
    Pool::builder().max_size(1).build(manager)
}
