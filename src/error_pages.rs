//! Full-page rendering of failed requests.
//!
//! Handlers return [`AppError`](crate::error::AppError), which becomes a
//! short inline notice plus an [`ErrorMessage`] extension. For a plain page
//! load that notice is wrapped into the site layout here. For an htmx swap
//! it is wrapped into an element carrying the id of the swap target, so the
//! page's `hx-select` finds it and the notice replaces the stale table.
//! JSON and health checks keep their bodies untouched.

use askama::Template;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};

use crate::error::{error_notice, html_escape};
use crate::state::AppState;
use crate::VERSION;

/// User-facing message carried from a handler to the error page.
#[derive(Clone)]
pub struct ErrorMessage(pub String);

#[derive(Template)]
#[template(path = "pages/error.html")]
struct ErrorPageTemplate {
    title: String,
    version: &'static str,
    nav: &'static str,
    auth_enabled: bool,
    status_code: u16,
    status_text: &'static str,
    message: String,
    retryable: bool,
}

/// What kind of client sent the request, as far as error rendering goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Audience {
    /// A full page load in the browser.
    Page,
    /// An htmx swap into the element with this id, if htmx named one.
    Fragment { target: Option<String> },
    /// `/api/*` and `/health`.
    Machine,
}

impl Audience {
    fn of(request: &Request<Body>) -> Self {
        let path = request.uri().path();
        let headers = request.headers();
        if path.starts_with("/api/") || path == "/health" {
            Self::Machine
        } else if headers.contains_key("hx-request") {
            let target = headers
                .get("hx-target")
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_owned);
            Self::Fragment { target }
        } else {
            Self::Page
        }
    }
}

/// Heading and fallback text for an error status.
struct ErrorCopy {
    heading: &'static str,
    fallback: &'static str,
}

fn error_copy(status: StatusCode) -> ErrorCopy {
    let (heading, fallback) = match status {
        StatusCode::BAD_REQUEST => ("Bad Request", "Check the date and search parameters."),
        StatusCode::FORBIDDEN => ("Forbidden", "You don't have access to these logs."),
        StatusCode::NOT_FOUND => ("Not Found", "No record or page exists at this address."),
        StatusCode::METHOD_NOT_ALLOWED => ("Method Not Allowed", "This action is not supported."),
        StatusCode::UNPROCESSABLE_ENTITY => (
            "Too Many Records",
            "The selected day has more records than can be shown at once.",
        ),
        StatusCode::INTERNAL_SERVER_ERROR => (
            "Retrieval Failed",
            "The log store could not be reached. Refresh to try again.",
        ),
        _ => ("Error", ""),
    };
    ErrorCopy { heading, fallback }
}

/// Wraps 4xx/5xx page loads into the error layout and logs every failure.
///
/// 401 passes through untouched so the login form can re-render itself.
pub async fn error_page_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let audience = Audience::of(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let message = response.extensions().get::<ErrorMessage>().map(|m| m.0.clone());
    tracing::warn!(
        %status,
        %method,
        %path,
        ?audience,
        message = message.as_deref().unwrap_or(""),
        "request failed"
    );

    if status == StatusCode::UNAUTHORIZED {
        return response;
    }
    match audience {
        Audience::Machine => response,
        Audience::Fragment { target: None } => response,
        Audience::Fragment {
            target: Some(target),
        } => render_error_fragment(&target, status, message),
        Audience::Page => render_error_page(&state, status, message),
    }
}

/// Fallback handler for unmatched routes.
pub async fn fallback_handler() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

fn render_error_page(state: &AppState, status: StatusCode, message: Option<String>) -> Response {
    let copy = error_copy(status);
    let message = message.unwrap_or_else(|| default_message(status));

    let template = ErrorPageTemplate {
        title: copy.heading.to_string(),
        version: VERSION,
        nav: "",
        auth_enabled: state.config.auth_enabled(),
        status_code: status.as_u16(),
        status_text: copy.heading,
        message,
        retryable: status.is_server_error(),
    };

    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (status, copy.heading).into_response()
        }
    }
}

/// The notice wrapped in a `<section>` that stands in for the swap target.
fn render_error_fragment(target: &str, status: StatusCode, message: Option<String>) -> Response {
    let message = message.unwrap_or_else(|| default_message(status));
    let html = format!(
        r#"<section id="{}">{}</section>"#,
        html_escape(target),
        error_notice(&message)
    );
    (status, Html(html)).into_response()
}

fn default_message(status: StatusCode) -> String {
    let copy = error_copy(status);
    if copy.fallback.is_empty() {
        format!("An unexpected error occurred ({}).", status.as_u16())
    } else {
        copy.fallback.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, htmx: bool) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if htmx {
            builder = builder
                .header("HX-Request", "true")
                .header("HX-Target", "records");
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_audience() {
        assert_eq!(Audience::of(&request("/logs", false)), Audience::Page);
        assert_eq!(
            Audience::of(&request("/logs", true)),
            Audience::Fragment {
                target: Some("records".into())
            }
        );
        assert_eq!(Audience::of(&request("/api/logs", true)), Audience::Machine);
        assert_eq!(Audience::of(&request("/health", false)), Audience::Machine);
    }

    #[tokio::test]
    async fn test_fragment_wraps_notice_in_target() {
        let response = render_error_fragment(
            "related",
            StatusCode::UNPROCESSABLE_ENTITY,
            Some("More than 5 records matched".into()),
        );
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.starts_with(r#"<section id="related">"#));
        assert!(html.contains("More than 5 records matched"));
    }

    #[test]
    fn test_default_messages() {
        assert_eq!(
            default_message(StatusCode::NOT_FOUND),
            "No record or page exists at this address."
        );
        assert_eq!(
            default_message(StatusCode::IM_A_TEAPOT),
            "An unexpected error occurred (418)."
        );
        assert_eq!(error_copy(StatusCode::UNPROCESSABLE_ENTITY).heading, "Too Many Records");
    }
}
