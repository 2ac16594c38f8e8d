mod common;

use axum::http::StatusCode;
use serde_json::json;
use skillbridge_backend::{models::user::Role, utils::token::issue_token};
use uuid::Uuid;

use common::{app, empty_request, json_request, lazy_state, multipart_request, send};

#[tokio::test]
async fn health_is_public() {
    let app = app(&lazy_state());
    let (status, body) = send(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = app(&lazy_state());
    for uri in ["/api/projects", "/api/users/me", "/api/applications/student"] {
        let (status, body) = send(&app, empty_request("GET", uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["message"], "Not authenticated");
    }
}

#[tokio::test]
async fn malformed_or_foreign_tokens_are_rejected() {
    let app = app(&lazy_state());
    let foreign = issue_token(Uuid::new_v4(), Role::Admin, "some-other-secret", 1).unwrap();

    for auth in [
        "Bearer not.a.jwt".to_string(),
        "Basic dXNlcjpwYXNz".to_string(),
        "Bearer ".to_string(),
        format!("Bearer {}", foreign),
    ] {
        let (status, body) = send(&app, empty_request("GET", "/api/projects", Some(auth.as_str()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", auth);
        assert_eq!(body["message"], "Not authenticated");
    }
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = app(&lazy_state());
    let expired = issue_token(Uuid::new_v4(), Role::Client, common::JWT_SECRET, -2).unwrap();
    let auth = format!("Bearer {}", expired);
    let (status, _) = send(&app, empty_request("DELETE", "/api/projects/x", Some(auth.as_str()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_malformed_json_is_a_400_with_message() {
    let app = app(&lazy_state());
    let (status, body) = send(
        &app,
        json_request("POST", "/api/users/login", None, json!({ "email": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn register_requires_all_fields() {
    let app = app(&lazy_state());
    let request = multipart_request(
        "/api/users/register",
        None,
        &[("username", "ada"), ("email", "ada@example.com")],
        &[],
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");
}

#[tokio::test]
async fn register_rejects_admin_role() {
    let app = app(&lazy_state());
    let request = multipart_request(
        "/api/users/register",
        None,
        &[
            ("username", "root"),
            ("email", "root@example.com"),
            ("password", "password123"),
            ("role", "admin"),
        ],
        &[],
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid role provided");
}
