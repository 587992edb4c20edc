//! Shared test utilities for integration tests.
//!
//! This module provides a `TestClient` that can be used to test the application
//! by making HTTP requests against an in-memory store. Methods are intentionally
//! broad to support various test scenarios across different test files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use flightdesk::auth::SessionManager;
use flightdesk::config::{AuthMode, Config};
use flightdesk::db::{create_in_memory_pool, DbPool};
use flightdesk::gateway::{Gateway, SqliteStore};
use flightdesk::server::build_router;
use flightdesk::state::AppState;
use http_body_util::BodyExt;
use rusqlite::params;
use tower::ServiceExt;

/// Response pieces tests look at.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response is not JSON")
    }

    pub fn header(&self, name: header::HeaderName) -> String {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    }
}

/// Undo HTML entity escaping of quotes and ampersands so assertions do not
/// depend on which entity form the template engine picks.
pub fn unescape_html(html: &str) -> String {
    html.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&#38;", "&")
        .replace("&amp;", "&")
}

/// The `<section id="...">` element with the given id, tags included.
/// Panics if it is missing. Sections in these templates never nest.
pub fn section<'a>(html: &'a str, id: &str) -> &'a str {
    let open = format!("<section id=\"{}\"", id);
    let start = html
        .find(&open)
        .unwrap_or_else(|| panic!("no section #{} in:\n{}", id, html));
    let end = html[start..]
        .find("</section>")
        .map(|i| start + i + "</section>".len())
        .unwrap_or_else(|| panic!("section #{} is not closed", id));
    &html[start..end]
}

/// A test client that simulates a browser session, allowing sequential requests
/// against the application.
pub struct TestClient {
    pool: DbPool,
    state: AppState,
}

impl TestClient {
    /// Create a new test client with a fresh in-memory store (unauthenticated mode).
    pub fn new() -> Self {
        Self::with_options(AuthMode::Unauthenticated, 10_000)
    }

    /// Create a new test client with a specific authentication mode.
    pub fn with_auth_mode(auth_mode: AuthMode) -> Self {
        Self::with_options(auth_mode, 10_000)
    }

    /// Create a new test client whose fetches are capped at `max_records`.
    pub fn with_max_records(max_records: usize) -> Self {
        Self::with_options(AuthMode::Unauthenticated, max_records)
    }

    fn with_options(auth_mode: AuthMode, max_records: usize) -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");

        let config = Config {
            host: "127.0.0.1".into(),
            port: 7080,
            database_path: PathBuf::from(":memory:"),
            static_path: PathBuf::from("static"),
            auth_mode: auth_mode.clone(),
            session_ttl_minutes: 60,
            max_records_per_fetch: max_records,
        };

        let state = AppState {
            gateway: Gateway::new(Arc::new(SqliteStore::new(pool.clone())), max_records),
            config: Arc::new(config),
            sessions: Arc::new(SessionManager::in_memory(auth_mode, 60)),
        };

        Self { pool, state }
    }

    /// The full production router, middleware included.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self.get_raw(uri).await;
        (response.status, response.text())
    }

    pub async fn get_raw(&self, uri: &str) -> TestResponse {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// GET as htmx sends it when swapping into the element `#target`.
    pub async fn get_htmx(&self, uri: &str, target: &str) -> TestResponse {
        self.request(
            Request::builder()
                .uri(uri)
                .header("HX-Request", "true")
                .header("HX-Target", target)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// GET with a session cookie attached.
    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> TestResponse {
        self.request(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Get JSON from an endpoint and parse it.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = self.get_raw(uri).await;
        let status = response.status;
        (status, response.json())
    }

    /// Make a POST request with form data.
    pub async fn post_form(&self, uri: &str, form_data: &[(&str, &str)]) -> TestResponse {
        let body = form_data
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    // =========================================================================
    // Helpers for seeding the store
    // =========================================================================

    /// Insert a general API log.
    pub fn insert_log(&self, id: i64, entry_date: &str, booking_request_id: Option<&str>) {
        self.insert_log_into("api_logs", id, entry_date, booking_request_id, None);
    }

    /// Insert a search log.
    pub fn insert_search_log(&self, id: i64, entry_date: &str) {
        self.insert_log_into("search_logs", id, entry_date, None, None);
    }

    /// Insert a general API log with a response body.
    pub fn insert_log_with_response(&self, id: i64, entry_date: &str, response_body: &str) {
        self.insert_log_into("api_logs", id, entry_date, None, Some(response_body));
    }

    fn insert_log_into(
        &self,
        table: &str,
        id: i64,
        entry_date: &str,
        booking_request_id: Option<&str>,
        response_body: Option<&str>,
    ) {
        let conn = self.pool.get().expect("Failed to get connection");
        conn.execute(
            &format!(
                "INSERT INTO {} (log_id, endpoint_url, request_body, response_body, vendor_id,
                                 entry_date, status_text, status_code, source_ip, account_id,
                                 source, pnr_number, booking_request_id)
                 VALUES (?1, ?2, ?3, ?4, 7, ?5, 'OK', 200, '10.0.0.1', 1001, 'web', ?6, ?7)",
                table
            ),
            params![
                id,
                format!("https://vendor.example/api/{}", id),
                r#"{"origin":"BOM","destination":"DXB"}"#,
                response_body,
                entry_date,
                format!("PNR{}", id),
                booking_request_id,
            ],
        )
        .expect("Failed to insert log");
    }

    /// Insert a general API log with request and response bodies.
    pub fn insert_log_with_bodies(
        &self,
        id: i64,
        entry_date: &str,
        request_body: &str,
        response_body: &str,
    ) {
        let conn = self.pool.get().expect("Failed to get connection");
        conn.execute(
            "INSERT INTO api_logs (log_id, endpoint_url, request_body, response_body, entry_date,
                                   status_code, booking_request_id)
             VALUES (?1, '/api/fares', ?2, ?3, ?4, 200, NULL)",
            params![id, request_body, response_body, entry_date],
        )
        .expect("Failed to insert log");
    }

    /// Insert a booking request.
    pub fn insert_booking(&self, id: i64, entry_date: &str, description: &str) {
        let conn = self.pool.get().expect("Failed to get connection");
        conn.execute(
            "INSERT INTO booking_requests (id, request_payload, account_id, entry_date, d_value,
                                           short_description, total_passengers)
             VALUES (?1, ?2, 'ACC-1', ?3, 'D1', ?4, 2)",
            params![
                id,
                r#""{\"passengers\":[{\"name\":\"Ada\"}]}""#,
                entry_date,
                description,
            ],
        )
        .expect("Failed to insert booking request");
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
