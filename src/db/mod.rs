pub mod pool;
pub mod queries;
pub mod schema;

use thiserror::Error;

pub use pool::{create_in_memory_pool, create_pool, DbPool};

/// Failure talking to the backing store. Always retryable from the user's
/// point of view: nothing is written, so refreshing re-runs the same query.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}
