//! Authentication middleware and handlers.
//!
//! A single analyst account is configured through `FLIGHTDESK_USERNAME` and
//! an Argon2 hash in `FLIGHTDESK_PASSWORD_HASH`. Authentication can be
//! disabled by setting the hash to `DANGEROUSLY_ALLOW_UNAUTHENTICATED_USERS`.
//!
//! Session tokens are random UUIDs with a fixed lifetime, held server-side
//! by a [`SessionManager`]. Tokens are invalidated on logout, on expiry, or
//! on server restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use askama::Template;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::config::AuthMode;
use crate::error::RenderHtml;
use crate::state::AppState;
use crate::VERSION;

/// Cookie name for the session token.
const SESSION_COOKIE: &str = "session";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where issued tokens and their expiry times live.
pub trait TokenStore: Send + Sync {
    fn insert(&self, token: String, expires_at: DateTime<Utc>);
    fn expires_at(&self, token: &str) -> Option<DateTime<Utc>>;
    fn remove(&self, token: &str);
    /// Drop every token that expired at or before `now`. Returns how many
    /// were dropped.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl TokenStore for MemoryTokenStore {
    fn insert(&self, token: String, expires_at: DateTime<Utc>) {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token, expires_at);
    }

    fn expires_at(&self, token: &str) -> Option<DateTime<Utc>> {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .copied()
    }

    fn remove(&self, token: &str) {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token);
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        let before = tokens.len();
        tokens.retain(|_, expires_at| now < *expires_at);
        before - tokens.len()
    }
}

impl MemoryTokenStore {
    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct SessionManager {
    auth_mode: AuthMode,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    store: Arc<dyn TokenStore>,
}

impl SessionManager {
    pub fn new(
        auth_mode: AuthMode,
        ttl_minutes: i64,
        clock: Arc<dyn Clock>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            auth_mode,
            ttl: Duration::minutes(ttl_minutes),
            clock,
            store,
        }
    }

    /// Manager backed by the system clock and an in-memory token store.
    pub fn in_memory(auth_mode: AuthMode, ttl_minutes: i64) -> Self {
        Self::new(
            auth_mode,
            ttl_minutes,
            Arc::new(SystemClock),
            Arc::new(MemoryTokenStore::default()),
        )
    }

    pub fn auth_required(&self) -> bool {
        matches!(self.auth_mode, AuthMode::Password { .. })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check the credentials and issue a fresh token. Returns None on a bad
    /// username or password, or when authentication is disabled.
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        let AuthMode::Password {
            username: expected,
            hash,
        } = &self.auth_mode
        else {
            return None;
        };

        // Verify the password even for an unknown username
        let password_ok = verify_password(password, hash);
        if username != expected || !password_ok {
            tracing::warn!(username, "Failed login attempt");
            return None;
        }

        let now = self.clock.now();
        let purged = self.store.purge_expired(now);
        if purged > 0 {
            tracing::debug!(purged, "Dropped expired sessions");
        }

        let token = Uuid::new_v4().to_string();
        self.store.insert(token.clone(), now + self.ttl);
        tracing::info!(username, "Session started");
        Some(token)
    }

    /// True if `token` was issued and has not expired. Expired tokens are
    /// evicted on sight.
    pub fn is_valid(&self, token: &str) -> bool {
        match self.store.expires_at(token) {
            Some(expires_at) if self.clock.now() < expires_at => true,
            Some(_) => {
                self.store.remove(token);
                false
            }
            None => false,
        }
    }

    pub fn logout(&self, token: &str) {
        self.store.remove(token);
    }
}

/// Template for the login page.
#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub version: &'static str,
    pub nav: &'static str,
    pub auth_enabled: bool,
    pub username: String,
    pub error: String,
}

/// Form data for login.
#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
}

/// Authentication middleware that redirects unauthenticated users to the login page.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip auth entirely when no password is configured
    if !state.sessions.auth_required() {
        return next.run(request).await;
    }

    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        if state.sessions.is_valid(session_cookie.value()) {
            return next.run(request).await;
        }
    }

    let path = request.uri().path();

    // Allow access to login page and static assets
    if path == "/login" || path.starts_with("/static/") || path == "/health" {
        return next.run(request).await;
    }

    // API calls get a bare 401; htmx swaps are sent to the login page
    if path.starts_with("/api/") {
        return (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
    }
    if request.headers().contains_key("HX-Request") {
        return (
            StatusCode::UNAUTHORIZED,
            [("HX-Redirect", "/login")],
            "Authentication required",
        )
            .into_response();
    }

    Redirect::to("/login").into_response()
}

fn render_login(username: String, error: &str) -> Response {
    let template = LoginTemplate {
        title: "Login".into(),
        version: VERSION,
        nav: "",
        auth_enabled: false,
        username,
        error: error.to_string(),
    };

    match template.render_html() {
        Ok(html) => html.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Render the login page.
pub async fn login_page(State(state): State<AppState>) -> impl IntoResponse {
    if !state.sessions.auth_required() {
        return Redirect::to("/").into_response();
    }
    render_login(String::new(), "")
}

/// Handle login form submission.
pub async fn login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginFormData>,
) -> impl IntoResponse {
    if !state.sessions.auth_required() {
        return Redirect::to("/").into_response();
    }

    let Some(token) = state.sessions.login(&form.username, &form.password) else {
        let mut response = render_login(form.username, "Invalid username or password");
        *response.status_mut() = StatusCode::UNAUTHORIZED;
        return response;
    };

    let max_age =
        tower_cookies::cookie::time::Duration::seconds(state.sessions.ttl().num_seconds());
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(tower_cookies::cookie::SameSite::Strict)
        .max_age(max_age)
        .build();
    cookies.add(cookie);

    Redirect::to("/").into_response()
}

/// Handle logout.
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.logout(session_cookie.value());
    }

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookies.remove(cookie);

    Redirect::to("/login")
}

/// Verify a password against an Argon2 hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Invalid password hash format in FLIGHTDESK_PASSWORD_HASH");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
