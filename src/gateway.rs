//! Retrieval gateway: the only way records get into the dashboard.
//!
//! Inputs are validated before the store is touched, and every fetch is
//! bounded by the configured record cap.

use std::sync::Arc;

use crate::date_utils::RecordDate;
use crate::db::queries::{api_logs, booking_requests};
use crate::db::{DbPool, StoreError};
use crate::error::{AppError, AppResult};
use crate::models::{ApiLog, BookingRequest, LogStream};

/// Backing store for records. `limit` asks for at most `limit + 1` rows so
/// the gateway can detect an over-sized result.
pub trait RecordStore: Send + Sync {
    fn logs_for_day(
        &self,
        stream: LogStream,
        day: RecordDate,
        limit: usize,
    ) -> Result<Vec<ApiLog>, StoreError>;

    fn logs_for_booking(
        &self,
        booking_request_id: &str,
        limit: usize,
    ) -> Result<Vec<ApiLog>, StoreError>;

    fn log_by_id(&self, stream: LogStream, log_id: i64) -> Result<Option<ApiLog>, StoreError>;

    fn booking_requests_for_day(
        &self,
        day: RecordDate,
        limit: usize,
    ) -> Result<Vec<BookingRequest>, StoreError>;

    fn booking_request_by_id(&self, id: i64) -> Result<Option<BookingRequest>, StoreError>;
}

/// [`RecordStore`] over the SQLite connection pool.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RecordStore for SqliteStore {
    fn logs_for_day(
        &self,
        stream: LogStream,
        day: RecordDate,
        limit: usize,
    ) -> Result<Vec<ApiLog>, StoreError> {
        let conn = self.pool.get()?;
        Ok(api_logs::get_logs_for_day(&conn, stream, day, limit)?)
    }

    fn logs_for_booking(
        &self,
        booking_request_id: &str,
        limit: usize,
    ) -> Result<Vec<ApiLog>, StoreError> {
        let conn = self.pool.get()?;
        Ok(api_logs::get_logs_for_booking(
            &conn,
            booking_request_id,
            limit,
        )?)
    }

    fn log_by_id(&self, stream: LogStream, log_id: i64) -> Result<Option<ApiLog>, StoreError> {
        let conn = self.pool.get()?;
        Ok(api_logs::get_log_by_id(&conn, stream, log_id)?)
    }

    fn booking_requests_for_day(
        &self,
        day: RecordDate,
        limit: usize,
    ) -> Result<Vec<BookingRequest>, StoreError> {
        let conn = self.pool.get()?;
        Ok(booking_requests::get_booking_requests_for_day(
            &conn, day, limit,
        )?)
    }

    fn booking_request_by_id(&self, id: i64) -> Result<Option<BookingRequest>, StoreError> {
        let conn = self.pool.get()?;
        Ok(booking_requests::get_booking_request_by_id(&conn, id)?)
    }
}

#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn RecordStore>,
    max_records: usize,
}

impl Gateway {
    pub fn new(store: Arc<dyn RecordStore>, max_records: usize) -> Self {
        Self {
            store,
            max_records: max_records.max(1),
        }
    }

    /// Logs of `stream` on the calendar day named by `date` (`YYYY-MM-DD`).
    /// A malformed date fails before the store is queried.
    pub fn fetch_logs_by_date(&self, stream: LogStream, date: &str) -> AppResult<Vec<ApiLog>> {
        let day = RecordDate::parse(date)?;
        self.fetch_logs_on(stream, day)
    }

    pub fn fetch_logs_on(&self, stream: LogStream, day: RecordDate) -> AppResult<Vec<ApiLog>> {
        let logs = self.store.logs_for_day(stream, day, self.max_records)?;
        tracing::debug!(stream = stream.as_str(), %day, count = logs.len(), "Fetched logs");
        self.within_cap(logs)
    }

    pub fn fetch_booking_requests_by_date(&self, date: &str) -> AppResult<Vec<BookingRequest>> {
        let day = RecordDate::parse(date)?;
        self.fetch_booking_requests_on(day)
    }

    pub fn fetch_booking_requests_on(&self, day: RecordDate) -> AppResult<Vec<BookingRequest>> {
        let requests = self.store.booking_requests_for_day(day, self.max_records)?;
        tracing::debug!(%day, count = requests.len(), "Fetched booking requests");
        self.within_cap(requests)
    }

    /// Every general log linked to a booking request, regardless of date.
    pub fn fetch_logs_by_booking(&self, booking_request_id: &str) -> AppResult<Vec<ApiLog>> {
        let key = booking_request_id.trim();
        if key.is_empty() {
            return Err(AppError::InvalidArgument(
                "bookingRequestId is required".into(),
            ));
        }
        let logs = self.store.logs_for_booking(key, self.max_records)?;
        tracing::debug!(booking_request_id = key, count = logs.len(), "Fetched related logs");
        self.within_cap(logs)
    }

    pub fn log_by_id(&self, stream: LogStream, log_id: i64) -> AppResult<ApiLog> {
        self.store
            .log_by_id(stream, log_id)?
            .ok_or_else(|| AppError::NotFound(format!("Log {} not found", log_id)))
    }

    pub fn booking_request_by_id(&self, id: i64) -> AppResult<BookingRequest> {
        self.store
            .booking_request_by_id(id)?
            .ok_or_else(|| AppError::NotFound(format!("Booking request {} not found", id)))
    }

    fn within_cap<T>(&self, records: Vec<T>) -> AppResult<Vec<T>> {
        if records.len() > self.max_records {
            tracing::warn!(limit = self.max_records, "Fetch exceeded record cap");
            return Err(AppError::TooManyRecords {
                limit: self.max_records,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
        rows: usize,
        fail: bool,
    }

    impl CountingStore {
        fn with_rows(rows: usize) -> Self {
            Self {
                rows,
                ..Default::default()
            }
        }

        fn hit(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Database(rusqlite::Error::InvalidQuery));
            }
            Ok(())
        }

        fn logs(&self, limit: usize) -> Vec<ApiLog> {
            (0..self.rows.min(limit + 1))
                .map(|i| ApiLog {
                    log_id: i as i64,
                    endpoint_url: "/fares".into(),
                    request_body: None,
                    response_body: None,
                    vendor_id: None,
                    timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap(),
                    status_text: None,
                    status_code: Some(200),
                    source_ip: None,
                    account_id: None,
                    source: None,
                    pnr_number: None,
                    booking_request_id: None,
                })
                .collect()
        }
    }

    impl RecordStore for CountingStore {
        fn logs_for_day(
            &self,
            _stream: LogStream,
            _day: RecordDate,
            limit: usize,
        ) -> Result<Vec<ApiLog>, StoreError> {
            self.hit()?;
            Ok(self.logs(limit))
        }

        fn logs_for_booking(&self, _key: &str, limit: usize) -> Result<Vec<ApiLog>, StoreError> {
            self.hit()?;
            Ok(self.logs(limit))
        }

        fn log_by_id(&self, _stream: LogStream, _id: i64) -> Result<Option<ApiLog>, StoreError> {
            self.hit()?;
            Ok(None)
        }

        fn booking_requests_for_day(
            &self,
            _day: RecordDate,
            _limit: usize,
        ) -> Result<Vec<BookingRequest>, StoreError> {
            self.hit()?;
            Ok(Vec::new())
        }

        fn booking_request_by_id(&self, _id: i64) -> Result<Option<BookingRequest>, StoreError> {
            self.hit()?;
            Ok(None)
        }
    }

    fn gateway(store: Arc<CountingStore>, cap: usize) -> Gateway {
        Gateway::new(store, cap)
    }

    #[test]
    fn test_malformed_date_never_reaches_store() {
        let store = Arc::new(CountingStore::with_rows(3));
        let gw = gateway(store.clone(), 100);

        for bad in ["2024-1-1", "01/01/2024", "", "2024-02-30"] {
            assert!(matches!(
                gw.fetch_logs_by_date(LogStream::General, bad),
                Err(AppError::InvalidArgument(_))
            ));
            assert!(matches!(
                gw.fetch_booking_requests_by_date(bad),
                Err(AppError::InvalidArgument(_))
            ));
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);

        assert_eq!(
            gw.fetch_logs_by_date(LogStream::Search, "2024-01-01").unwrap().len(),
            3
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blank_booking_key_is_rejected() {
        let store = Arc::new(CountingStore::with_rows(1));
        let gw = gateway(store.clone(), 100);
        assert!(matches!(
            gw.fetch_logs_by_booking("   "),
            Err(AppError::InvalidArgument(_))
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(gw.fetch_logs_by_booking("42").unwrap().len(), 1);
    }

    #[test]
    fn test_cap_is_enforced() {
        let gw = gateway(Arc::new(CountingStore::with_rows(10)), 10);
        assert_eq!(gw.fetch_logs_by_date(LogStream::General, "2024-01-01").unwrap().len(), 10);

        let gw = gateway(Arc::new(CountingStore::with_rows(11)), 10);
        assert!(matches!(
            gw.fetch_logs_by_date(LogStream::General, "2024-01-01"),
            Err(AppError::TooManyRecords { limit: 10 })
        ));
    }

    #[test]
    fn test_store_failure_is_retrieval_error() {
        let store = Arc::new(CountingStore {
            fail: true,
            ..Default::default()
        });
        let gw = gateway(store, 10);
        let err = gw.fetch_logs_by_date(LogStream::General, "2024-01-01").unwrap_err();
        assert!(matches!(err, AppError::Retrieval(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let gw = gateway(Arc::new(CountingStore::default()), 10);
        assert!(matches!(
            gw.log_by_id(LogStream::General, 5),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(gw.booking_request_by_id(5), Err(AppError::NotFound(_))));
    }
}
