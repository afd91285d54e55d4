//! Invoice due-date notification integration tests

mod common;

use chrono::{Duration, Utc};
use http::StatusCode;
use serde_json::{json, Value};

use common::{data_id, spawn_app, TestApp};

async fn create_due_invoice(app: &TestApp, token: &str, due_in_days: i64) -> String {
    let data = Utc::now().date_naive();
    let scadenza = data + Duration::days(due_in_days);
    let (status, body) = app
        .post(
            "/api/invoices",
            token,
            json!({
                "data": data.to_string(),
                "data_scadenza": scadenza.to_string(),
                "mese": data.format("%m").to_string().parse::<u32>().unwrap(),
                "anno": data.format("%Y").to_string().parse::<i32>().unwrap(),
                "nome_progetto": "Progetto scadenze",
                "tipo": "Entrata",
                "stato_fatturazione": "Stimato",
                "flusso": "800.00",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "invoice create failed: {}", body);
    data_id(&body)
}

async fn open_notifications(app: &TestApp, token: &str) -> Vec<Value> {
    let (status, body) = app.get("/api/notifications", token).await;
    assert_eq!(status, StatusCode::OK);
    body["data"].as_array().unwrap().clone()
}

#[tokio::test]
async fn refresh_raises_alert_for_invoice_due_soon() {
    let app = spawn_app().await;
    let token = app.register("due@example.com").await;
    create_due_invoice(&app, &token, 3).await;

    let (status, body) = app.post("/api/notifications/refresh", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK, "refresh failed: {}", body);
    assert_eq!(body["data"]["alerted"], 1);

    let open = open_notifications(&app, &token).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["tipo"], "da_pagare");
}

#[tokio::test]
async fn overdue_invoice_is_flagged_scaduta() {
    let app = spawn_app().await;
    let token = app.register("late@example.com").await;
    create_due_invoice(&app, &token, -2).await;

    app.post("/api/notifications/refresh", &token, json!({}))
        .await;

    let open = open_notifications(&app, &token).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["tipo"], "scaduta");
}

#[tokio::test]
async fn far_future_due_date_raises_nothing() {
    let app = spawn_app().await;
    let token = app.register("calm@example.com").await;
    create_due_invoice(&app, &token, 60).await;

    let (_, body) = app
        .post("/api/notifications/refresh", &token, json!({}))
        .await;
    assert_eq!(body["data"]["alerted"], 0);
    assert!(open_notifications(&app, &token).await.is_empty());
}

#[tokio::test]
async fn dismissal_survives_later_scans() {
    let app = spawn_app().await;
    let token = app.register("mute@example.com").await;
    create_due_invoice(&app, &token, 3).await;

    app.post("/api/notifications/refresh", &token, json!({}))
        .await;
    let open = open_notifications(&app, &token).await;
    let notification_id = open[0]["id"].as_str().unwrap();

    let (status, body) = app
        .post(
            &format!("/api/notifications/{}/dismiss", notification_id),
            &token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "dismiss failed: {}", body);
    assert_eq!(body["message"], "Notifica archiviata");
    assert!(open_notifications(&app, &token).await.is_empty());

    // The invoice still qualifies, but the dismissed row is not resurrected
    let (_, body) = app
        .post("/api/notifications/refresh", &token, json!({}))
        .await;
    assert_eq!(body["data"]["alerted"], 1);
    assert!(open_notifications(&app, &token).await.is_empty());
}

#[tokio::test]
async fn settling_the_invoice_dismisses_its_alert() {
    let app = spawn_app().await;
    let token = app.register("paid@example.com").await;
    let invoice_id = create_due_invoice(&app, &token, 3).await;

    app.post("/api/notifications/refresh", &token, json!({}))
        .await;
    assert_eq!(open_notifications(&app, &token).await.len(), 1);

    let (status, body) = app
        .put(
            &format!("/api/invoices/{}", invoice_id),
            &token,
            json!({ "stato_fatturazione": "Effettivo" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);

    assert!(open_notifications(&app, &token).await.is_empty());
}
