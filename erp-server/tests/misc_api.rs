//! Import, settings, company and statistics integration tests

mod common;

use http::StatusCode;
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn import_handles_mixed_rows_and_remaps_invoice_links() {
    let app = spawn_app().await;
    let token = app.register("import@example.com").await;

    let (status, body) = app
        .post(
            "/api/import",
            &token,
            json!({
                "customers": [
                    { "name": "Mario Rossi", "company_name": "Rossi Srl" },
                    { "company_name": "Senza Nome" }
                ],
                "invoices": [
                    {
                        "id": "invoice:vecchio1",
                        "data": "2026-02-01",
                        "mese": 2,
                        "anno": 2026,
                        "nome_progetto": "Migrazione",
                        "tipo": "Entrata",
                        "flusso": "400.00"
                    }
                ],
                "cashflows": [
                    {
                        "invoice": "invoice:vecchio1",
                        "data_pagamento": "2026-02-15",
                        "importo": "400.00"
                    }
                ],
                "deals": [
                    { "title": "Trattativa importata", "customer_name": "Rossi Srl" }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "import failed: {}", body);
    assert_eq!(body["message"], "Importazione completata");
    assert_eq!(body["data"]["customers"], 1);
    assert_eq!(body["data"]["invoices"], 1);
    assert_eq!(body["data"]["cashflows"], 1);
    assert_eq!(body["data"]["deals"], 1);
    // The customer row without a name is reported, not fatal
    let errors = body["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().starts_with("Cliente riga 2"));

    // The cashflow points at the freshly created invoice, not the old id
    let (_, body) = app.get("/api/cashflows", &token).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    let linked = rows[0]["invoice"].as_str().unwrap();
    assert_ne!(linked, "invoice:vecchio1");

    let (status, _) = app.get(&format!("/api/invoices/{}", linked), &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn import_without_rows_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("noop@example.com").await;

    let (status, body) = app.post("/api/import", &token, json!({})).await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 6001);
}

#[tokio::test]
async fn app_settings_mask_secrets_and_keep_them_on_write_back() {
    let app = spawn_app().await;
    let token = app.register("keys@example.com").await;

    let (status, body) = app
        .put(
            "/api/settings/app",
            &token,
            json!({ "anthropic_api_key": "sk-ant-reale", "notification_refresh_interval": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "save failed: {}", body);
    assert_eq!(body["data"]["anthropic_api_key"], "********");
    assert_eq!(body["data"]["notification_refresh_interval"], 3);

    // Sending the mask back must not overwrite the stored key
    let (status, body) = app
        .put(
            "/api/settings/app",
            &token,
            json!({ "anthropic_api_key": "********", "default_ai_provider": "openai" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "second save failed: {}", body);
    assert_eq!(body["data"]["anthropic_api_key"], "********");
    assert_eq!(body["data"]["default_ai_provider"], "openai");

    // An empty string clears the key, so nothing is left to mask
    let (_, body) = app
        .put(
            "/api/settings/app",
            &token,
            json!({ "anthropic_api_key": "" }),
        )
        .await;
    assert!(body["data"]["anthropic_api_key"].is_null());
}

#[tokio::test]
async fn refresh_interval_must_be_a_known_step() {
    let app = spawn_app().await;
    let token = app.register("interval@example.com").await;

    let (status, body) = app
        .put(
            "/api/settings/app",
            &token,
            json!({ "notification_refresh_interval": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "accepted: {}", body);
}

#[tokio::test]
async fn incomplete_email_settings_are_rejected() {
    let app = spawn_app().await;
    let token = app.register("smtp@example.com").await;

    let (status, body) = app
        .put(
            "/api/settings/email",
            &token,
            json!({
                "email_provider": "smtp",
                "smtp_enabled": true,
                "smtp_host": "smtp.example.com",
                "smtp_port": 587,
                "smtp_user": "mailer"
            }),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 9103);
    assert_eq!(body["details"]["missing"], "smtp_password");
}

#[tokio::test]
async fn company_profile_can_be_renamed() {
    let app = spawn_app().await;
    let token = app.register("ragione@example.com").await;

    let (status, body) = app.get("/api/company", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Test Srl");

    let (status, body) = app
        .put("/api/company", &token, json!({ "name": "Nuova Ragione Srl" }))
        .await;
    assert_eq!(status, StatusCode::OK, "rename failed: {}", body);
    assert_eq!(body["message"], "Azienda aggiornata");
    assert_eq!(body["data"]["name"], "Nuova Ragione Srl");
}

#[tokio::test]
async fn cashflow_statistics_split_by_direction() {
    let app = spawn_app().await;
    let token = app.register("stat@example.com").await;

    app.post(
        "/api/cashflows",
        &token,
        json!({ "data_pagamento": "2026-01-10", "importo": "1000.00", "tipo": "Entrata" }),
    )
    .await;
    app.post(
        "/api/cashflows",
        &token,
        json!({ "data_pagamento": "2026-02-20", "importo": "300.00", "tipo": "Uscita" }),
    )
    .await;
    // Different year, must not count
    app.post(
        "/api/cashflows",
        &token,
        json!({ "data_pagamento": "2025-12-01", "importo": "999.00", "tipo": "Entrata" }),
    )
    .await;

    let (status, body) = app.get("/api/statistics/cashflow/2026", &token).await;
    assert_eq!(status, StatusCode::OK, "stats failed: {}", body);
    assert_eq!(body["data"]["anno"], 2026);
    assert_eq!(body["data"]["entrate"], "1000.00");
    assert_eq!(body["data"]["uscite"], "300.00");
    assert_eq!(body["data"]["total"], "1300.00");

    let monthly = body["data"]["monthly"].as_array().unwrap();
    assert_eq!(monthly.len(), 12);
    assert_eq!(monthly[0]["entrate"], "1000.00");
    assert_eq!(monthly[1]["uscite"], "300.00");
}

#[tokio::test]
async fn dashboard_counts_open_work() {
    let app = spawn_app().await;
    let token = app.register("dash@example.com").await;

    app.post(
        "/api/customers",
        &token,
        json!({ "name": "Cliente", "company_name": "C Srl" }),
    )
    .await;
    app.post(
        "/api/deals",
        &token,
        json!({ "title": "Aperta", "customer_name": "C Srl", "value": "2500.00", "stage": "Proposta" }),
    )
    .await;
    app.post(
        "/api/deals",
        &token,
        json!({ "title": "Chiusa", "customer_name": "C Srl", "value": "9999.00", "stage": "Vinto" }),
    )
    .await;

    let (status, body) = app.get("/api/statistics/dashboard", &token).await;
    assert_eq!(status, StatusCode::OK, "dashboard failed: {}", body);
    assert_eq!(body["data"]["customers"], 1);
    assert_eq!(body["data"]["open_deals"], 1);
    assert_eq!(body["data"]["open_deals_value"], "2500.00");
    assert_eq!(body["data"]["open_notifications"], 0);
}
