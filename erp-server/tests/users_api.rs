//! Membership, invitation and role-gate integration tests

mod common;

use http::{Method, StatusCode};
use serde_json::json;

use common::{spawn_app, TestApp};

/// Invite a member and complete the invitation, returning their session token
async fn invite_and_join(app: &TestApp, admin_token: &str, email: &str, role: &str) -> String {
    let (status, body) = app
        .post(
            "/api/users/invite",
            admin_token,
            json!({ "email": email, "name": "Nuovo Membro", "role": role }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "invite failed: {}", body);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/users/complete-invitation",
            None,
            Some(json!({ "token": token, "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "complete failed: {}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn invitation_flow_creates_a_working_member() {
    let app = spawn_app().await;
    let admin = app.register("owner@example.com").await;

    let member = invite_and_join(&app, &admin, "member@example.com", "user").await;

    let (status, body) = app.get("/api/auth/me", &member).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "member@example.com");
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["companyName"], "Test Srl");

    let (_, body) = app.get("/api/users", &admin).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invitation_token_can_be_validated_without_auth() {
    let app = spawn_app().await;
    let admin = app.register("check@example.com").await;

    let (_, body) = app
        .post(
            "/api/users/invite",
            &admin,
            json!({ "email": "guest@example.com", "name": "Ospite", "role": "viewer" }),
        )
        .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/users/validate-invitation/{}", token),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "validate failed: {}", body);
    assert_eq!(body["data"]["email"], "guest@example.com");
    assert_eq!(body["data"]["role"], "viewer");

    let (status, body) = app
        .request(
            Method::GET,
            "/api/users/validate-invitation/not-a-real-token",
            None,
            None,
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 3004);
}

#[tokio::test]
async fn used_invitation_cannot_be_replayed() {
    let app = spawn_app().await;
    let admin = app.register("replay@example.com").await;

    let (_, body) = app
        .post(
            "/api/users/invite",
            &admin,
            json!({ "email": "once@example.com", "name": "Una Volta", "role": "user" }),
        )
        .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/users/complete-invitation",
            None,
            Some(json!({ "token": token, "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/users/complete-invitation",
            None,
            Some(json!({ "token": token, "password": "password123" })),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 3006);
}

#[tokio::test]
async fn viewers_can_read_but_not_write() {
    let app = spawn_app().await;
    let admin = app.register("boss@example.com").await;
    let viewer = invite_and_join(&app, &admin, "viewer@example.com", "viewer").await;

    let (status, _) = app.get("/api/customers", &viewer).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/customers",
            &viewer,
            json!({ "name": "Vietato", "company_name": "X Srl" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn member_management_requires_admin() {
    let app = spawn_app().await;
    let admin = app.register("adminonly@example.com").await;
    let user = invite_and_join(&app, &admin, "plain@example.com", "user").await;

    let (status, _) = app.get("/api/users", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/users/invite",
            &user,
            json!({ "email": "x@example.com", "name": "X", "role": "user" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn last_active_admin_cannot_be_demoted() {
    let app = spawn_app().await;
    let admin = app.register("lastadmin@example.com").await;
    invite_and_join(&app, &admin, "colleague@example.com", "user").await;

    // Find the admin's own membership id through the member list
    let (_, body) = app.get("/api/users", &admin).await;
    let members = body["data"].as_array().unwrap();
    let own = members
        .iter()
        .find(|m| m["email"] == "lastadmin@example.com")
        .unwrap();
    let membership_id = own["id"].as_str().unwrap();

    // Self-edits are rejected before the last-admin guard kicks in
    let (status, body) = app
        .put(
            &format!("/api/users/{}", membership_id),
            &admin,
            json!({ "role": "user" }),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 2007);
}

#[tokio::test]
async fn admin_can_deactivate_a_member() {
    let app = spawn_app().await;
    let admin = app.register("hr@example.com").await;
    invite_and_join(&app, &admin, "leaver@example.com", "user").await;

    let (_, body) = app.get("/api/users", &admin).await;
    let members = body["data"].as_array().unwrap();
    let target = members
        .iter()
        .find(|m| m["email"] == "leaver@example.com")
        .unwrap();
    let membership_id = target["id"].as_str().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/users/{}", membership_id),
            &admin,
            json!({ "is_active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "deactivate failed: {}", body);
    assert_eq!(body["data"]["is_active"], false);

    // A deactivated account can no longer log in
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "leaver@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "login allowed: {}", body);
    assert_eq!(body["code"], 1006);
}
