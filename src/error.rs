use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::error_pages::ErrorMessage;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] StoreError),

    #[error("More than {limit} records matched")]
    TooManyRecords { limit: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRecords { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Retrieval(_) | AppError::Export(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the user. Server-side failures are logged
    /// here with their full detail and replaced by a generic text.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::TooManyRecords { limit } => format!(
                "More than {} records matched; the result set is too large to display",
                limit
            ),
            AppError::Retrieval(e) => {
                tracing::error!("Retrieval error: {:?}", e);
                "Failed to fetch records from the data store. Refresh to try again.".to_string()
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {:?}", e);
                "Failed to build the spreadsheet export".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg.clone()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();

        let mut response = (status, Html(error_notice(&message))).into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        response
    }
}

/// JSON flavour of [`AppError`] for the `/api` routes: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = self.0.public_message();
        let mut response = (status, Json(json!({ "error": message.clone() }))).into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        response
    }
}

/// Inline, dismissible error notice.
pub fn error_notice(message: &str) -> String {
    format!(
        r#"<div class="notice notice-error" role="alert">
                <p>{}</p>
                <button type="button" class="notice-dismiss" aria-label="Dismiss" onclick="this.parentElement.remove()">&times;</button>
            </div>"#,
        html_escape(message)
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub type AppResult<T> = Result<T, AppError>;

pub type ApiResult<T> = Result<T, ApiError>;

pub trait RenderHtml {
    fn render_html(self) -> AppResult<Html<String>>;
}

impl<T: Template> RenderHtml for T {
    fn render_html(self) -> AppResult<Html<String>> {
        self.render()
            .map(Html)
            .map_err(|e| AppError::Internal(format!("Template error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidArgument("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::TooManyRecords { limit: 5 }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_notice_is_escaped_and_dismissible() {
        let html = error_notice("<b>bad</b>");
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(html.contains("notice-dismiss"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#x27;b&#x27;&lt;/b&gt;"
        );
    }
}
