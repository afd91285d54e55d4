//! Cashflow handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    CashflowCreate, CashflowRecord, CashflowUpdate, InvoiceId, StatoFatturazione,
};
use crate::db::repository::{
    parse_id, CashflowFilter, CashflowRepository, InvoiceRepository, NotificationRepository,
};
use crate::utils::validation::{validate_optional_text, MAX_NAME_LEN, MAX_NOTE_LEN};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct CashflowQuery {
    pub anno: Option<i32>,
    pub invoice: Option<String>,
    pub stato: Option<StatoFatturazione>,
}

fn validate_texts(
    descrizione: &Option<String>,
    categoria: &Option<String>,
    note: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(descrizione, "descrizione", MAX_NAME_LEN)?;
    validate_optional_text(categoria, "categoria", MAX_NAME_LEN)?;
    validate_optional_text(note, "note", MAX_NOTE_LEN)?;
    Ok(())
}

/// Ensure the linked invoice exists and belongs to the caller's company
async fn check_invoice_link(
    state: &ServerState,
    user: &CurrentUser,
    invoice: &InvoiceId,
) -> AppResult<()> {
    let repo = InvoiceRepository::new(state.get_db());
    repo.find_by_id(&user.company, &invoice.to_string())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;
    Ok(())
}

/// A record that turns effective while linked to an invoice settles that
/// invoice's due-date notification
async fn dismiss_if_settled(state: &ServerState, record: &CashflowRecord) -> AppResult<()> {
    if record.stato_fatturazione == StatoFatturazione::Effettivo {
        if let Some(invoice) = &record.invoice {
            NotificationRepository::new(state.get_db())
                .dismiss_for_invoice(invoice)
                .await?;
        }
    }
    Ok(())
}

/// GET /api/cashflows?anno=&invoice=&stato=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<CashflowQuery>,
) -> AppResult<ApiResponse<Vec<CashflowRecord>>> {
    let invoice = match &query.invoice {
        Some(raw) => Some(parse_id(raw)?),
        None => None,
    };
    let filter = CashflowFilter {
        anno: query.anno,
        invoice,
        stato: query.stato,
    };

    let repo = CashflowRepository::new(state.get_db());
    let records = repo.find_all(&user.company, filter).await?;
    Ok(ok(records))
}

/// GET /api/cashflows/{id}
pub async fn get_one(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CashflowRecord>> {
    let repo = CashflowRepository::new(state.get_db());
    let record = repo
        .find_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CashflowNotFound))?;
    Ok(ok(record))
}

/// POST /api/cashflows
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CashflowCreate>,
) -> AppResult<ApiResponse<CashflowRecord>> {
    validate_texts(&payload.descrizione, &payload.categoria, &payload.note)?;
    if let Some(invoice) = &payload.invoice {
        check_invoice_link(&state, &user, invoice).await?;
    }

    let repo = CashflowRepository::new(state.get_db());
    let record = repo.create(&user.company, payload).await?;
    dismiss_if_settled(&state, &record).await?;
    Ok(ok_with_message("Movimento creato", record))
}

/// PUT /api/cashflows/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CashflowUpdate>,
) -> AppResult<ApiResponse<CashflowRecord>> {
    validate_texts(&payload.descrizione, &payload.categoria, &payload.note)?;
    if let Some(invoice) = &payload.invoice {
        check_invoice_link(&state, &user, invoice).await?;
    }

    let repo = CashflowRepository::new(state.get_db());
    let record = repo.update(&user.company, &id, payload).await?;
    dismiss_if_settled(&state, &record).await?;
    Ok(ok_with_message("Movimento aggiornato", record))
}

/// DELETE /api/cashflows/{id}
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = CashflowRepository::new(state.get_db());
    if !repo.delete(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::CashflowNotFound));
    }
    Ok(ok_with_message("Movimento eliminato", ()))
}
