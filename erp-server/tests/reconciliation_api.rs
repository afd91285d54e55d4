//! Bank reconciliation integration tests

mod common;

use http::StatusCode;
use serde_json::{json, Value};

use common::{data_id, spawn_app, TestApp};

const STATEMENT: &str = "\
Data,Data Valuta,Causale,Descrizione,Importo,Saldo
10/01/2026,10/01/2026,Bonifico,Pagamento fattura 12,\"1.220,00\",\"5.000,00\"
12/01/2026,12/01/2026,Addebito,Canone mensile,\"-50,00\",\"4.950,00\"
";

async fn upload(app: &TestApp, token: &str, content: &str) -> (StatusCode, Value) {
    app.post(
        "/api/reconciliation/sessions",
        token,
        json!({ "file_name": "estratto_gennaio.csv", "content": content }),
    )
    .await
}

fn session_id(body: &Value) -> String {
    body["data"]["session"]["id"]
        .as_str()
        .expect("upload returned no session id")
        .to_string()
}

fn tx_ids(body: &Value) -> Vec<String> {
    body["data"]["transactions"]
        .as_array()
        .expect("upload returned no transactions")
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn upload_parses_lines_and_seeds_counters() {
    let app = spawn_app().await;
    let token = app.register("rec@example.com").await;

    let (status, body) = upload(&app, &token, STATEMENT).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", body);
    assert_eq!(body["message"], "Estratto conto caricato");

    let session = &body["data"]["session"];
    assert_eq!(session["total_transactions"], 2);
    assert_eq!(session["pending_count"], 2);
    assert_eq!(session["matched_count"], 0);
    assert_eq!(session["status"], "open");

    let txs = body["data"]["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0]["importo"], "1220.00");
    assert_eq!(txs[0]["tipo"], "Entrata");
    assert_eq!(txs[1]["importo"], "50.00");
    assert_eq!(txs[1]["tipo"], "Uscita");
}

#[tokio::test]
async fn empty_statement_is_rejected() {
    let app = spawn_app().await;
    let token = app.register("empty@example.com").await;

    let header_only = "Data,Data Valuta,Causale,Descrizione,Importo,Saldo\n";
    let (status, body) = upload(&app, &token, header_only).await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 7006);
}

#[tokio::test]
async fn matching_amount_is_suggested_at_upload() {
    let app = spawn_app().await;
    let token = app.register("auto@example.com").await;

    // A cashflow record with the exact amount and date of the first line
    let (status, body) = app
        .post(
            "/api/cashflows",
            &token,
            json!({
                "data_pagamento": "2026-01-10",
                "importo": "1220.00",
                "tipo": "Entrata",
                "descrizione": "Pagamento fattura 12",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "cashflow create failed: {}", body);

    let (status, body) = upload(&app, &token, STATEMENT).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", body);

    let session = &body["data"]["session"];
    assert_eq!(session["matched_count"], 1);
    assert_eq!(session["pending_count"], 1);

    let txs = body["data"]["transactions"].as_array().unwrap();
    let matched = txs
        .iter()
        .find(|t| t["match_status"] == "matched")
        .expect("no transaction auto-matched");
    assert!(matched["matched_cashflow"].is_string());
}

#[tokio::test]
async fn ignore_and_unmatch_keep_counters_consistent() {
    let app = spawn_app().await;
    let token = app.register("counters@example.com").await;

    let (_, body) = upload(&app, &token, STATEMENT).await;
    let sid = session_id(&body);
    let ids = tx_ids(&body);

    let (status, body) = app
        .post(
            &format!("/api/reconciliation/transactions/{}/ignore", ids[0]),
            &token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "ignore failed: {}", body);

    let (_, body) = app
        .get(&format!("/api/reconciliation/sessions/{}", sid), &token)
        .await;
    assert_eq!(body["data"]["ignored_count"], 1);
    assert_eq!(body["data"]["pending_count"], 1);

    // Back to pending
    let (status, _) = app
        .post(
            &format!("/api/reconciliation/transactions/{}/unmatch", ids[0]),
            &token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .get(&format!("/api/reconciliation/sessions/{}", sid), &token)
        .await;
    assert_eq!(body["data"]["ignored_count"], 0);
    assert_eq!(body["data"]["pending_count"], 2);
}

#[tokio::test]
async fn manual_match_links_an_existing_cashflow() {
    let app = spawn_app().await;
    let token = app.register("manual@example.com").await;

    let (_, body) = app
        .post(
            "/api/cashflows",
            &token,
            json!({ "data_pagamento": "2026-01-12", "importo": "50.00", "tipo": "Uscita" }),
        )
        .await;
    let cashflow_id = data_id(&body);

    let (_, body) = upload(&app, &token, STATEMENT).await;
    let sid = session_id(&body);
    let ids = tx_ids(&body);

    let (status, body) = app
        .post(
            &format!("/api/reconciliation/transactions/{}/match", ids[1]),
            &token,
            json!({ "cashflow": cashflow_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "match failed: {}", body);
    assert_eq!(body["data"]["match_status"], "manual");
    assert_eq!(body["data"]["match_reason"], "Abbinamento manuale");

    let (_, body) = app
        .get(&format!("/api/reconciliation/sessions/{}", sid), &token)
        .await;
    assert_eq!(body["data"]["matched_count"], 1);
    assert_eq!(body["data"]["pending_count"], 1);
}

#[tokio::test]
async fn create_cashflow_from_pending_transaction() {
    let app = spawn_app().await;
    let token = app.register("fromtx@example.com").await;

    let (_, body) = upload(&app, &token, STATEMENT).await;
    let ids = tx_ids(&body);

    let (status, body) = app
        .post(
            &format!("/api/reconciliation/transactions/{}/create-cashflow", ids[1]),
            &token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create-cashflow failed: {}", body);
    assert_eq!(body["message"], "Movimento creato");

    // The new record carries the statement line's amount and direction
    let (_, body) = app.get("/api/cashflows", &token).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["importo"], "50.00");
    assert_eq!(rows[0]["tipo"], "Uscita");

    // And the transaction is no longer pending
    let (status, body) = app
        .post(
            &format!("/api/reconciliation/transactions/{}/create-cashflow", ids[1]),
            &token,
            json!({}),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 7004);
}

#[tokio::test]
async fn closed_sessions_reject_mutations() {
    let app = spawn_app().await;
    let token = app.register("closed@example.com").await;

    let (_, body) = upload(&app, &token, STATEMENT).await;
    let sid = session_id(&body);
    let ids = tx_ids(&body);

    let (status, _) = app
        .post(
            &format!("/api/reconciliation/sessions/{}/close", sid),
            &token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            &format!("/api/reconciliation/transactions/{}/ignore", ids[0]),
            &token,
            json!({}),
        )
        .await;
    assert_ne!(status, StatusCode::OK);
    assert_eq!(body["code"], 7002);

    // Reopen lifts the guard
    let (status, _) = app
        .post(
            &format!("/api/reconciliation/sessions/{}/reopen", sid),
            &token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            &format!("/api/reconciliation/transactions/{}/ignore", ids[0]),
            &token,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
