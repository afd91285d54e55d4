//! Invoice handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::billing::{self, InvoicePayment};
use crate::core::ServerState;
use crate::db::models::{
    CashflowRecord, FlowDirection, Invoice, InvoiceCreate, InvoiceUpdate, StatoFatturazione,
};
use crate::db::repository::{
    parse_id, CashflowRepository, InvoiceFilter, InvoiceRepository, NotificationRepository,
};
use crate::utils::validation::{
    validate_month, validate_optional_text, validate_percentage, validate_required_text,
    MAX_NAME_LEN, MAX_NOTE_LEN,
};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    pub anno: Option<i32>,
    pub mese: Option<u32>,
    pub tipo: Option<FlowDirection>,
    pub stato: Option<StatoFatturazione>,
}

impl From<InvoiceQuery> for InvoiceFilter {
    fn from(q: InvoiceQuery) -> Self {
        InvoiceFilter {
            anno: q.anno,
            mese: q.mese,
            tipo: q.tipo,
            stato: q.stato,
        }
    }
}

/// GET /api/invoices?anno=&mese=&tipo=&stato=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<ApiResponse<Vec<Invoice>>> {
    let repo = InvoiceRepository::new(state.get_db());
    let invoices = repo.find_all(&user.company, query.into()).await?;
    Ok(ok(invoices))
}

/// GET /api/invoices/{id}
pub async fn get_one(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Invoice>> {
    let repo = InvoiceRepository::new(state.get_db());
    let invoice = repo
        .find_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;
    Ok(ok(invoice))
}

/// POST /api/invoices
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<InvoiceCreate>,
) -> AppResult<ApiResponse<Invoice>> {
    validate_required_text(&payload.nome_progetto, "nome_progetto", MAX_NAME_LEN)?;
    validate_month(payload.mese)?;
    validate_percentage(payload.percentuale_iva, "percentuale_iva")?;
    validate_percentage(payload.percentuale_fatturazione, "percentuale_fatturazione")?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let repo = InvoiceRepository::new(state.get_db());
    let invoice = repo.create(&user.company, payload).await?;
    Ok(ok_with_message("Fattura creata", invoice))
}

/// PUT /api/invoices/{id}
///
/// When the update removes the due date or moves the invoice out of the
/// estimated state, any open due-date notification is dismissed.
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<InvoiceUpdate>,
) -> AppResult<ApiResponse<Invoice>> {
    validate_optional_text(&payload.nome_progetto, "nome_progetto", MAX_NAME_LEN)?;
    if let Some(mese) = payload.mese {
        validate_month(mese)?;
    }
    if let Some(p) = payload.percentuale_iva {
        validate_percentage(p, "percentuale_iva")?;
    }
    if let Some(p) = payload.percentuale_fatturazione {
        validate_percentage(p, "percentuale_fatturazione")?;
    }
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let repo = InvoiceRepository::new(state.get_db());
    let invoice = repo.update(&user.company, &id, payload).await?;

    if invoice.stato_fatturazione != StatoFatturazione::Stimato
        || invoice.data_scadenza.is_none()
    {
        let invoice_id = parse_id(&id)?;
        NotificationRepository::new(state.get_db())
            .dismiss_for_invoice(&invoice_id)
            .await?;
    }

    Ok(ok_with_message("Fattura aggiornata", invoice))
}

/// DELETE /api/invoices/{id}
///
/// Refused while cashflow records still link to the invoice; the blocking
/// record ids are returned in the error details.
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let invoice_id = parse_id(&id)?;
    let linked = CashflowRepository::new(state.get_db())
        .find_by_invoice(&user.company, &invoice_id)
        .await?;
    if !linked.is_empty() {
        let blocking: Vec<String> = linked
            .iter()
            .filter_map(|r| r.id.as_ref().map(|id| id.to_string()))
            .collect();
        return Err(
            AppError::new(ErrorCode::InvoiceHasCashflows).with_detail("cashflows", blocking)
        );
    }

    let repo = InvoiceRepository::new(state.get_db());
    if !repo.delete(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::InvoiceNotFound));
    }
    NotificationRepository::new(state.get_db())
        .delete_for_invoice(&invoice_id)
        .await?;

    Ok(ok_with_message("Fattura eliminata", ()))
}

/// GET /api/invoices/{id}/payment
pub async fn payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<InvoicePayment>> {
    let repo = InvoiceRepository::new(state.get_db());
    let invoice = repo
        .find_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;

    let invoice_id = parse_id(&id)?;
    let linked = CashflowRepository::new(state.get_db())
        .find_by_invoice(&user.company, &invoice_id)
        .await?;
    let refs: Vec<&CashflowRecord> = linked.iter().collect();
    Ok(ok(billing::invoice_payment(&invoice, &refs)))
}
