//! Unified import handler
//!
//! One request carries rows for any mix of customers, invoices, cashflows
//! and deals. Rows are imported independently; a bad row is reported and
//! skipped, never aborting the batch. Invoice rows may carry their old id
//! so cashflow rows can reference invoices created in the same batch.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CashflowCreate, CustomerCreate, DealCreate, InvoiceCreate, InvoiceId};
use crate::db::repository::{
    CashflowRepository, CustomerRepository, DealRepository, InvoiceRepository,
};
use crate::utils::{ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub customers: Vec<Value>,
    #[serde(default)]
    pub invoices: Vec<Value>,
    #[serde(default)]
    pub cashflows: Vec<Value>,
    #[serde(default)]
    pub deals: Vec<Value>,
}

#[derive(Debug, Default, Serialize)]
pub struct ImportResult {
    pub customers: usize,
    pub invoices: usize,
    pub cashflows: usize,
    pub deals: usize,
    pub errors: Vec<String>,
}

/// POST /api/import
pub async fn import(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ImportRequest>,
) -> AppResult<ApiResponse<ImportResult>> {
    if payload.customers.is_empty()
        && payload.invoices.is_empty()
        && payload.cashflows.is_empty()
        && payload.deals.is_empty()
    {
        return Err(AppError::new(ErrorCode::ImportEmpty));
    }

    let mut result = ImportResult::default();

    let customer_repo = CustomerRepository::new(state.get_db());
    for (i, row) in payload.customers.into_iter().enumerate() {
        match serde_json::from_value::<CustomerCreate>(row) {
            Ok(data) => match customer_repo.create(&user.company, data).await {
                Ok(_) => result.customers += 1,
                Err(e) => result.errors.push(format!("Cliente riga {}: {}", i + 1, e)),
            },
            Err(e) => result.errors.push(format!("Cliente riga {}: {}", i + 1, e)),
        }
    }

    // Old invoice id -> freshly created record, for cashflow rows that
    // reference invoices imported in this same batch
    let mut invoice_map: HashMap<String, InvoiceId> = HashMap::new();
    let invoice_repo = InvoiceRepository::new(state.get_db());
    for (i, row) in payload.invoices.into_iter().enumerate() {
        let old_id = row
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        match serde_json::from_value::<InvoiceCreate>(row) {
            Ok(data) => match invoice_repo.create(&user.company, data).await {
                Ok(created) => {
                    result.invoices += 1;
                    if let (Some(old), Some(new_id)) = (old_id, created.id) {
                        invoice_map.insert(old, new_id);
                    }
                }
                Err(e) => result.errors.push(format!("Fattura riga {}: {}", i + 1, e)),
            },
            Err(e) => result.errors.push(format!("Fattura riga {}: {}", i + 1, e)),
        }
    }

    let cashflow_repo = CashflowRepository::new(state.get_db());
    for (i, mut row) in payload.cashflows.into_iter().enumerate() {
        if let Some(old) = row.get("invoice").and_then(|v| v.as_str()) {
            if let Some(new_id) = invoice_map.get(old) {
                row["invoice"] = Value::String(new_id.to_string());
            }
        }
        match serde_json::from_value::<CashflowCreate>(row) {
            Ok(data) => match cashflow_repo.create(&user.company, data).await {
                Ok(_) => result.cashflows += 1,
                Err(e) => result
                    .errors
                    .push(format!("Movimento riga {}: {}", i + 1, e)),
            },
            Err(e) => result
                .errors
                .push(format!("Movimento riga {}: {}", i + 1, e)),
        }
    }

    let deal_repo = DealRepository::new(state.get_db());
    for (i, row) in payload.deals.into_iter().enumerate() {
        match serde_json::from_value::<DealCreate>(row) {
            Ok(data) => match deal_repo.create(&user.company, data).await {
                Ok(_) => result.deals += 1,
                Err(e) => result
                    .errors
                    .push(format!("Trattativa riga {}: {}", i + 1, e)),
            },
            Err(e) => result
                .errors
                .push(format!("Trattativa riga {}: {}", i + 1, e)),
        }
    }

    tracing::info!(
        customers = result.customers,
        invoices = result.invoices,
        cashflows = result.cashflows,
        deals = result.deals,
        errors = result.errors.len(),
        "Import completed"
    );
    Ok(ok_with_message("Importazione completata", result))
}
