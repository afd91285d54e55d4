//! Finance integration tests: invoices, cashflows, bilancio, bank balances

mod common;

use http::StatusCode;
use serde_json::json;

use common::{data_id, spawn_app};

#[tokio::test]
async fn invoice_payment_status_follows_linked_cashflows() {
    let app = spawn_app().await;
    let token = app.register("fin@example.com").await;

    let (status, body) = app
        .post(
            "/api/invoices",
            &token,
            json!({
                "data": "2026-03-10",
                "mese": 3,
                "anno": 2026,
                "nome_progetto": "Progetto Alfa",
                "tipo": "Entrata",
                "stato_fatturazione": "Effettivo",
                "flusso": "1000.00",
                "iva": "220.00",
                "percentuale_iva": 22,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "invoice create failed: {}", body);
    assert_eq!(body["message"], "Fattura creata");
    let invoice_id = data_id(&body);

    // No payments yet
    let (status, body) = app
        .get(&format!("/api/invoices/{}/payment", invoice_id), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "non_pagato");

    let (status, body) = app
        .post(
            "/api/cashflows",
            &token,
            json!({
                "invoice": invoice_id,
                "data_pagamento": "2026-03-20",
                "importo": "1220.00",
                "tipo": "Entrata",
                "stato_fatturazione": "Effettivo",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "cashflow create failed: {}", body);

    let (status, body) = app
        .get(&format!("/api/invoices/{}/payment", invoice_id), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pagato");
    assert_eq!(body["data"]["residuo"], "0.00");
}

#[tokio::test]
async fn invoice_with_linked_cashflows_cannot_be_deleted() {
    let app = spawn_app().await;
    let token = app.register("lock@example.com").await;

    let (_, body) = app
        .post(
            "/api/invoices",
            &token,
            json!({
                "data": "2026-05-01",
                "mese": 5,
                "anno": 2026,
                "nome_progetto": "Progetto Beta",
                "tipo": "Entrata",
                "flusso": "500.00",
            }),
        )
        .await;
    let invoice_id = data_id(&body);

    let (_, body) = app
        .post(
            "/api/cashflows",
            &token,
            json!({ "invoice": invoice_id, "data_pagamento": "2026-05-15" }),
        )
        .await;
    let cashflow_id = data_id(&body);

    let (status, body) = app
        .delete(&format!("/api/invoices/{}", invoice_id), &token)
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 5002);
    let blocking = body["details"]["cashflows"].as_array().unwrap();
    assert_eq!(blocking.len(), 1);
    assert_eq!(blocking[0], cashflow_id.as_str());

    // Unlink by deleting the record, then the invoice goes
    let (status, _) = app
        .delete(&format!("/api/cashflows/{}", cashflow_id), &token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .delete(&format!("/api/invoices/{}", invoice_id), &token)
        .await;
    assert_eq!(status, StatusCode::OK, "delete failed: {}", body);
}

#[tokio::test]
async fn invoices_filter_by_year_and_state() {
    let app = spawn_app().await;
    let token = app.register("years@example.com").await;

    for (anno, mese, stato) in [(2025, 11, "Effettivo"), (2026, 2, "Stimato"), (2026, 4, "Effettivo")] {
        let (status, body) = app
            .post(
                "/api/invoices",
                &token,
                json!({
                    "data": format!("{}-{:02}-01", anno, mese),
                    "mese": mese,
                    "anno": anno,
                    "nome_progetto": "P",
                    "tipo": "Entrata",
                    "stato_fatturazione": stato,
                    "flusso": "100.00",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    }

    let (_, body) = app.get("/api/invoices?anno=2026", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .get("/api/invoices?anno=2026&stato=Effettivo", &token)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cashflows_filter_by_invoice_link() {
    let app = spawn_app().await;
    let token = app.register("cflink@example.com").await;

    let (_, body) = app
        .post(
            "/api/invoices",
            &token,
            json!({
                "data": "2026-06-01",
                "mese": 6,
                "anno": 2026,
                "nome_progetto": "Gamma",
                "tipo": "Entrata",
                "flusso": "300.00",
            }),
        )
        .await;
    let invoice_id = data_id(&body);

    app.post(
        "/api/cashflows",
        &token,
        json!({ "invoice": invoice_id, "data_pagamento": "2026-06-10", "importo": "150.00" }),
    )
    .await;
    app.post(
        "/api/cashflows",
        &token,
        json!({ "data_pagamento": "2026-06-11", "importo": "99.00", "tipo": "Uscita", "descrizione": "Canone" }),
    )
    .await;

    let (status, body) = app
        .get(&format!("/api/cashflows?invoice={}", invoice_id), &token)
        .await;
    assert_eq!(status, StatusCode::OK, "filter failed: {}", body);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["importo"], "150.00");
}

#[tokio::test]
async fn cashflow_link_to_unknown_invoice_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("badlink@example.com").await;

    let (status, body) = app
        .post(
            "/api/cashflows",
            &token,
            json!({ "invoice": "invoice:doesnotexist", "data_pagamento": "2026-01-01" }),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 5001);
}

#[tokio::test]
async fn financial_items_enforce_section_category_pairing() {
    let app = spawn_app().await;
    let token = app.register("bilancio@example.com").await;

    let (status, body) = app
        .post(
            "/api/financial-items",
            &token,
            json!({
                "name": "Crediti verso clienti",
                "section": "Conto Economico",
                "category": "Attivo",
                "amount": "8000.00",
            }),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 5202);

    let (status, body) = app
        .post(
            "/api/financial-items",
            &token,
            json!({
                "name": "Crediti verso clienti",
                "section": "Stato Patrimoniale",
                "category": "Attivo",
                "amount": "8000.00",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
}

#[tokio::test]
async fn statement_totals_aggregate_by_category() {
    let app = spawn_app().await;
    let token = app.register("totals@example.com").await;

    let items = [
        ("Cassa", "Stato Patrimoniale", "Attivo", "10000.00"),
        ("Debiti", "Stato Patrimoniale", "Passivo", "4000.00"),
        ("Ricavi", "Conto Economico", "Valore della Produzione", "9000.00"),
        ("Costi", "Conto Economico", "Costi della Produzione", "2500.00"),
    ];
    for (name, section, category, amount) in items {
        let (status, body) = app
            .post(
                "/api/financial-items",
                &token,
                json!({ "name": name, "section": section, "category": category, "amount": amount }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    }

    let (status, body) = app.get("/api/financial-items/totals", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_assets"], "10000.00");
    assert_eq!(body["data"]["total_liabilities"], "4000.00");
    assert_eq!(body["data"]["equity_gap"], "6000.00");
    assert_eq!(body["data"]["operating_result"], "6500.00");
}

#[tokio::test]
async fn bank_balances_filter_by_year() {
    let app = spawn_app().await;
    let token = app.register("saldi@example.com").await;

    for (data, saldo) in [("2025-12-31", "15000.00"), ("2026-03-31", "17250.00")] {
        let (status, body) = app
            .post(
                "/api/bank-balances",
                &token,
                json!({ "data": data, "saldo": saldo, "conto": "Conto principale" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        assert_eq!(body["message"], "Saldo registrato");
    }

    let (status, body) = app.get("/api/bank-balances?anno=2026", &token).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["saldo"], "17250.00");
}
