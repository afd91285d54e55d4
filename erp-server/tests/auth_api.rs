//! Authentication and account lifecycle integration tests

mod common;

use http::{Method, StatusCode};
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn register_returns_session_and_me_works() {
    let app = spawn_app().await;
    let token = app.register("admin@example.com").await;

    let (status, body) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "admin@example.com");
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["companyName"], "Test Srl");
    assert_eq!(body["data"]["isActive"], true);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = spawn_app().await;
    app.register("dup@example.com").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "dup@example.com",
                "password": "password123",
                "adminName": "Other",
                "companyName": "Other Srl",
            })),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 8002);
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = spawn_app().await;
    app.register("login@example.com").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({
                "email": "login@example.com",
                "password": "not-the-password",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn login_with_unknown_email_gives_same_error() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({
                "email": "nobody@example.com",
                "password": "password123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = spawn_app().await;

    let (status, _) = app
        .request(Method::GET, "/api/customers", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await;

    let (status, body) = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn change_password_checks_the_current_one() {
    let app = spawn_app().await;
    let token = app.register("pwd@example.com").await;

    let (status, body) = app
        .post(
            "/api/auth/change-password",
            &token,
            json!({
                "currentPassword": "wrong-password",
                "newPassword": "newpassword456",
            }),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 1009);

    let (status, _) = app
        .post(
            "/api/auth/change-password",
            &token,
            json!({
                "currentPassword": "password123",
                "newPassword": "newpassword456",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn sole_admin_cannot_delete_their_account() {
    let app = spawn_app().await;
    let token = app.register("solo@example.com").await;

    let (status, body) = app.delete("/api/auth/delete-account", &token).await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 2006);
}
