use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{self, SessionManager};
use crate::config::Config;
use crate::db::create_pool;
use crate::error_pages::{error_page_middleware, fallback_handler};
use crate::gateway::{Gateway, SqliteStore};
use crate::handlers;
use crate::state::AppState;

/// Build the application state and Axum router from a [`Config`].
///
/// Opens the read-only store pool and assembles the full middleware stack.
/// Returns the shared state and a ready-to-serve router.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let db = create_pool(&config.database_path)?;
    let gateway = Gateway::new(Arc::new(SqliteStore::new(db)), config.max_records_per_fetch);
    let sessions = SessionManager::in_memory(config.auth_mode.clone(), config.session_ttl_minutes);

    if !config.auth_enabled() {
        tracing::warn!("Authentication is disabled; every visitor can read the logs");
    }

    let state = AppState {
        gateway,
        config: Arc::new(config),
        sessions: Arc::new(sessions),
    };

    let app = build_router(state.clone());
    Ok((state, app))
}

/// The full router with auth, error pages, cookies, compression and
/// request tracing applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::routes())
        .route("/login", get(auth::login_page))
        .route("/login", post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .fallback(fallback_handler)
        .nest_service("/static", ServeDir::new(&state.config.static_path))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_page_middleware,
        ))
        .layer(CookieManagerLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the router to `host:port` and run it on a tokio task until Ctrl-C.
///
/// Returns the bound port (the OS picks one when `port` is 0) and the
/// server task's handle.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind((host, port)).await?;
    let bound_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Shutting down");
                }
            })
            .await;
        if let Err(e) = result {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((bound_port, handle))
}
