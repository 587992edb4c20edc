//! Integration tests for authentication middleware.

mod common;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use axum::http::{header, StatusCode};
use common::TestClient;
use flightdesk::config::AuthMode;

const USERNAME: &str = "analyst";
const PASSWORD: &str = "testpass123";

/// Create a test client with password authentication enabled.
fn auth_client() -> TestClient {
    let salt = SaltString::from_b64("c29tZXNhbHRzb21lc2FsdA").unwrap();
    let hash = Argon2::default()
        .hash_password(PASSWORD.as_bytes(), &salt)
        .unwrap()
        .to_string();
    TestClient::with_auth_mode(AuthMode::Password {
        username: USERNAME.into(),
        hash,
    })
}

/// Log in and return the `name=value` pair of the session cookie.
async fn login(client: &TestClient) -> String {
    let response = client
        .post_form("/login", &[("username", USERNAME), ("password", PASSWORD)])
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let set_cookie = response.header(header::SET_COOKIE);
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_pages_redirect_to_login() {
    let client = auth_client();
    for uri in ["/", "/logs", "/search-logs/1", "/booking-requests/export"] {
        let response = client.get_raw(uri).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(response.header(header::LOCATION), "/login", "{}", uri);
    }
}

#[tokio::test]
async fn test_api_returns_401() {
    let client = auth_client();
    let (status, body) = client.get("/api/logs?date=2024-01-01").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Authentication required");
}

#[tokio::test]
async fn test_htmx_swap_is_sent_to_login() {
    let client = auth_client();
    let response = client.get_htmx("/logs?date=2024-01-01", "records").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.header(header::HeaderName::from_static("hx-redirect")), "/login");
}

#[tokio::test]
async fn test_public_paths() {
    let client = auth_client();

    let (status, body) = client.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, body) = client.get("/login").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("name=\"password\""));
}

#[tokio::test]
async fn test_login_grants_access() {
    let client = auth_client();
    client.insert_log(1, "2024-01-01 10:00:00", None);

    let cookie = login(&client).await;
    let response = client
        .get_with_cookie("/api/logs?date=2024-01-01", &cookie)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json().as_array().unwrap().len(), 1);

    let response = client.get_with_cookie("/logs?date=2024-01-01", &cookie).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Log out"));
}

#[tokio::test]
async fn test_wrong_password_rerenders_form() {
    let client = auth_client();
    let response = client
        .post_form("/login", &[("username", USERNAME), ("password", "nope")])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.text().contains("Invalid username or password"));
    assert!(response.header(header::SET_COOKIE).is_empty());
}

#[tokio::test]
async fn test_forged_cookie_is_rejected() {
    let client = auth_client();
    let response = client
        .get_with_cookie("/logs", "session=00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let client = auth_client();
    let cookie = login(&client).await;

    let response = client
        .request(
            axum::http::Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), "/login");

    let response = client.get_with_cookie("/logs", &cookie).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_page_redirects_when_auth_disabled() {
    let client = TestClient::new();
    let response = client.get_raw("/login").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let (status, _) = client.get("/logs").await;
    assert_eq!(status, StatusCode::OK);
}
