//! CRM integration tests: customers and deals

mod common;

use http::StatusCode;
use serde_json::json;

use common::{data_id, spawn_app};

#[tokio::test]
async fn customer_crud_roundtrip() {
    let app = spawn_app().await;
    let token = app.register("crm@example.com").await;

    let (status, body) = app
        .post(
            "/api/customers",
            &token,
            json!({
                "name": "Mario Rossi",
                "company_name": "Rossi Srl",
                "email": "mario@rossi.it",
                "vat_id": "IT01234567890",
                "status": "Attivo",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    assert_eq!(body["message"], "Cliente creato");
    let id = data_id(&body);

    let (status, body) = app.get(&format!("/api/customers/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Mario Rossi");
    assert_eq!(body["data"]["company_name"], "Rossi Srl");

    let (status, body) = app
        .put(
            &format!("/api/customers/{}", id),
            &token,
            json!({ "status": "Inattivo", "revenue": "1500.50" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["data"]["status"], "Inattivo");

    let (status, body) = app.delete(&format!("/api/customers/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK, "delete failed: {}", body);

    let (status, body) = app.get(&format!("/api/customers/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn customers_filter_by_status() {
    let app = spawn_app().await;
    let token = app.register("filter@example.com").await;

    for (name, status) in [("A", "Attivo"), ("B", "Prospetto"), ("C", "Attivo")] {
        let (code, body) = app
            .post(
                "/api/customers",
                &token,
                json!({ "name": name, "company_name": format!("{} Srl", name), "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "create failed: {}", body);
    }

    let (status, body) = app.get("/api/customers?status=Attivo", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = app.get("/api/customers", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn customers_search_is_case_insensitive() {
    let app = spawn_app().await;
    let token = app.register("search@example.com").await;

    for (name, company) in [
        ("Mario Rossi", "Rossi Srl"),
        ("Luca Bianchi", "Bianchi Snc"),
        ("Anna Verdi", "Verdi Spa"),
    ] {
        let (code, body) = app
            .post(
                "/api/customers",
                &token,
                json!({ "name": name, "company_name": company }),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "create failed: {}", body);
    }

    let (status, body) = app.get("/api/customers?search=rossi", &token).await;
    assert_eq!(status, StatusCode::OK, "search failed: {}", body);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Mario Rossi");

    // Matches company names too
    let (_, body) = app.get("/api/customers?search=SNC", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/customers?search=nessuno", &token).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn customer_create_requires_a_name() {
    let app = spawn_app().await;
    let token = app.register("badcust@example.com").await;

    let (status, _) = app
        .post(
            "/api/customers",
            &token,
            json!({ "name": "   ", "company_name": "Ghost Srl" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deal_crud_and_stage_filter() {
    let app = spawn_app().await;
    let token = app.register("deals@example.com").await;

    let (status, body) = app
        .post(
            "/api/deals",
            &token,
            json!({
                "title": "Sito web",
                "customer_name": "Rossi Srl",
                "value": "5000",
                "stage": "Proposta",
                "probability": 60,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    assert_eq!(body["message"], "Trattativa creata");
    let id = data_id(&body);

    let (_, body) = app
        .post(
            "/api/deals",
            &token,
            json!({ "title": "App mobile", "customer_name": "Bianchi Spa", "stage": "Lead" }),
        )
        .await;
    assert_eq!(body["code"], 0);

    let (status, body) = app.get("/api/deals?stage=Proposta", &token).await;
    assert_eq!(status, StatusCode::OK);
    let deals = body["data"].as_array().unwrap();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0]["title"], "Sito web");

    let (status, body) = app
        .put(
            &format!("/api/deals/{}", id),
            &token,
            json!({ "stage": "Vinto", "probability": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["data"]["stage"], "Vinto");

    let (status, _) = app.delete(&format!("/api/deals/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/deals/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4101);
}

#[tokio::test]
async fn deal_probability_must_be_a_percentage() {
    let app = spawn_app().await;
    let token = app.register("prob@example.com").await;

    let (status, _) = app
        .post(
            "/api/deals",
            &token,
            json!({ "title": "Troppo sicuro", "customer_name": "X", "probability": 150 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tenants_do_not_see_each_other() {
    let app = spawn_app().await;
    let token_a = app.register("tenant-a@example.com").await;
    let token_b = app.register("tenant-b@example.com").await;

    let (_, body) = app
        .post(
            "/api/customers",
            &token_a,
            json!({ "name": "Solo A", "company_name": "A Srl" }),
        )
        .await;
    let id = data_id(&body);

    let (status, body) = app.get(&format!("/api/customers/{}", id), &token_b).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "cross-tenant read: {}", body);

    let (_, body) = app.get("/api/customers", &token_b).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
