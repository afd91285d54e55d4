//! Bank reconciliation handlers

use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    BankTransaction, CashflowCreate, CashflowUpdate, InvoiceCreate, MatchStatus,
    ReconciliationSession, StatoFatturazione,
};
use crate::db::repository::{
    CashflowFilter, CashflowRepository, CounterDelta, InvoiceFilter, InvoiceRepository,
    ReconciliationRepository,
};
use crate::reconciliation::{
    difference_report, format_periodo, parse_statement, quick_match, suggest_match,
    suggest_matches_batch, DifferenceReport, MatchSuggestion, SideBySideRow, UnmatchedData,
};
use crate::utils::time::now_millis;
use crate::utils::validation::{validate_required_text, MAX_NAME_LEN};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

const REASON_IGNORED: &str = "Ignorato manualmente";
const REASON_MANUAL: &str = "Abbinamento manuale";
const REASON_INVOICE_FROM_TX: &str = "Fattura creata da transazione bancaria";
const REASON_CASHFLOW_FROM_TX: &str = "Movimento creato da transazione bancaria";
const NOTE_CASHFLOW_FROM_TX: &str = "Movimento creato da riconciliazione bancaria";

#[derive(Debug, Deserialize)]
pub struct UploadStatementRequest {
    pub file_name: String,
    /// Raw CSV text of the bank statement
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub session: ReconciliationSession,
    pub transactions: Vec<BankTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct ManualMatchRequest {
    pub cashflow: String,
    pub invoice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCashflowRequest {
    pub invoice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTransactionsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionRow {
    pub transaction: String,
    pub suggestion: MatchSuggestion,
}

#[derive(Debug, Serialize)]
pub struct RepairResult {
    /// Auto-created cashflows re-linked to the invoice their bank
    /// transaction points at
    pub relinked: usize,
    /// Dangling invoice references cleared
    pub cleared: i64,
}

fn bucket_delta(status: MatchStatus, amount: i64) -> CounterDelta {
    let mut delta = CounterDelta::default();
    match status {
        MatchStatus::Pending => delta.pending = amount,
        MatchStatus::Matched | MatchStatus::Manual => delta.matched = amount,
        MatchStatus::Ignored => delta.ignored = amount,
    }
    delta
}

fn combine(a: CounterDelta, b: CounterDelta) -> CounterDelta {
    CounterDelta {
        total: a.total + b.total,
        matched: a.matched + b.matched,
        pending: a.pending + b.pending,
        ignored: a.ignored + b.ignored,
    }
}

fn transition(from: MatchStatus, to: MatchStatus) -> CounterDelta {
    combine(bucket_delta(from, -1), bucket_delta(to, 1))
}

async fn load_session(
    repo: &ReconciliationRepository,
    user: &CurrentUser,
    id: &str,
) -> AppResult<ReconciliationSession> {
    repo.find_session(&user.company, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))
}

fn ensure_open(session: &ReconciliationSession) -> AppResult<()> {
    if session.is_closed() {
        return Err(AppError::new(ErrorCode::SessionClosed));
    }
    Ok(())
}

async fn load_transaction(
    repo: &ReconciliationRepository,
    user: &CurrentUser,
    id: &str,
) -> AppResult<BankTransaction> {
    repo.find_transaction(&user.company, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TransactionNotFound))
}

/// Fetch the owning session of a transaction and reject closed ones
async fn open_session_of(
    repo: &ReconciliationRepository,
    user: &CurrentUser,
    tx: &BankTransaction,
) -> AppResult<ReconciliationSession> {
    let session = load_session(repo, user, &tx.session.to_string()).await?;
    ensure_open(&session)?;
    Ok(session)
}

/// GET /api/reconciliation/sessions
pub async fn list_sessions(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Vec<ReconciliationSession>>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let sessions = repo.list_sessions(&user.company).await?;
    Ok(ok(sessions))
}

/// POST /api/reconciliation/sessions
///
/// Parses the uploaded CSV, creates the session and its transactions, and
/// runs the exact-amount quick matcher over every line.
pub async fn upload_statement(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UploadStatementRequest>,
) -> AppResult<ApiResponse<UploadResult>> {
    validate_required_text(&payload.file_name, "file_name", MAX_NAME_LEN)?;
    let parsed = parse_statement(payload.content.as_bytes())?;
    if parsed.transactions.is_empty() {
        return Err(AppError::new(ErrorCode::StatementEmpty));
    }

    let invoices = InvoiceRepository::new(state.get_db())
        .find_all(&user.company, InvoiceFilter::default())
        .await?;
    let cashflows = CashflowRepository::new(state.get_db())
        .find_all(&user.company, CashflowFilter::default())
        .await?;

    let repo = ReconciliationRepository::new(state.get_db());
    let total = parsed.transactions.len() as i64;

    let session = repo
        .create_session(ReconciliationSession {
            id: None,
            company: user.company.clone(),
            file_name: payload.file_name,
            upload_date: now_millis(),
            periodo: format_periodo(parsed.periodo_dal, parsed.periodo_al),
            periodo_dal: parsed.periodo_dal,
            periodo_al: parsed.periodo_al,
            numero_conto: parsed.numero_conto,
            saldo_iniziale: parsed.saldo_iniziale,
            saldo_finale: parsed.saldo_finale,
            total_transactions: total,
            matched_count: 0,
            pending_count: 0,
            ignored_count: 0,
            status: Default::default(),
            closed_date: None,
        })
        .await?;
    let session_id = session
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Session record has no id"))?;

    let mut matched = 0i64;
    let mut transactions = Vec::with_capacity(parsed.transactions.len());
    for line in parsed.transactions {
        let mut tx = BankTransaction {
            id: None,
            company: user.company.clone(),
            session: session_id.clone(),
            data: line.data,
            data_valuta: line.data_valuta,
            causale: line.causale,
            descrizione: line.descrizione,
            importo: line.importo,
            tipo: line.tipo,
            saldo: line.saldo,
            match_status: MatchStatus::Pending,
            matched_invoice: None,
            matched_cashflow: None,
            match_confidence: None,
            match_reason: None,
        };

        if let Some(suggestion) = quick_match(&tx, &invoices, &cashflows) {
            if suggestion.is_match() {
                tx.match_status = MatchStatus::Matched;
                tx.matched_invoice = suggestion.invoice;
                tx.matched_cashflow = suggestion.cashflow;
                tx.match_confidence = Some(suggestion.confidence);
                tx.match_reason = Some(suggestion.reason);
                matched += 1;
            }
        }

        transactions.push(repo.create_transaction(tx).await?);
    }

    repo.apply_counter_delta(
        &session_id,
        CounterDelta {
            total: 0,
            matched,
            pending: total - matched,
            ignored: 0,
        },
    )
    .await?;

    let session = load_session(&repo, &user, &session_id.to_string()).await?;
    Ok(ok_with_message(
        "Estratto conto caricato",
        UploadResult {
            session,
            transactions,
        },
    ))
}

/// GET /api/reconciliation/sessions/{id}
pub async fn get_session(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReconciliationSession>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    Ok(ok(session))
}

/// DELETE /api/reconciliation/sessions/{id}
pub async fn delete_session(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = ReconciliationRepository::new(state.get_db());
    if !repo.delete_session(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::SessionNotFound));
    }
    Ok(ok_with_message("Sessione eliminata", ()))
}

/// POST /api/reconciliation/sessions/{id}/close
pub async fn close_session(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReconciliationSession>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    ensure_open(&session)?;
    let session_id = session
        .id
        .ok_or_else(|| AppError::internal("Session record has no id"))?;
    let closed = repo
        .set_session_status(&session_id, crate::db::models::SessionStatus::Closed)
        .await?;
    Ok(ok_with_message("Sessione chiusa", closed))
}

/// POST /api/reconciliation/sessions/{id}/reopen
pub async fn reopen_session(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReconciliationSession>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    let session_id = session
        .id
        .ok_or_else(|| AppError::internal("Session record has no id"))?;
    let reopened = repo
        .set_session_status(&session_id, crate::db::models::SessionStatus::Open)
        .await?;
    Ok(ok_with_message("Sessione riaperta", reopened))
}

/// GET /api/reconciliation/sessions/{id}/transactions
pub async fn list_transactions(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<BankTransaction>>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    let session_id = session
        .id
        .ok_or_else(|| AppError::internal("Session record has no id"))?;
    let transactions = repo.list_transactions(&user.company, &session_id).await?;
    Ok(ok(transactions))
}

/// POST /api/reconciliation/sessions/{id}/transactions/delete
pub async fn delete_transactions(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<DeleteTransactionsRequest>,
) -> AppResult<ApiResponse<()>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    ensure_open(&session)?;
    let session_id = session
        .id
        .ok_or_else(|| AppError::internal("Session record has no id"))?;

    let removed = repo
        .delete_transactions(&user.company, &payload.ids)
        .await?;
    let mut delta = CounterDelta {
        total: -(removed.len() as i64),
        ..Default::default()
    };
    for status in removed {
        delta = combine(delta, bucket_delta(status, -1));
    }
    repo.apply_counter_delta(&session_id, delta).await?;
    Ok(ok_with_message("Transazioni eliminate", ()))
}

/// POST /api/reconciliation/sessions/{id}/suggest
///
/// Runs the fuzzy matcher over every pending transaction and stores the
/// usable suggestions without changing any match status; confirmation
/// stays with the user.
pub async fn suggest_session(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<SuggestionRow>>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    ensure_open(&session)?;
    let session_id = session
        .id
        .ok_or_else(|| AppError::internal("Session record has no id"))?;

    let transactions = repo.list_transactions(&user.company, &session_id).await?;
    let invoices = InvoiceRepository::new(state.get_db())
        .find_all(&user.company, InvoiceFilter::default())
        .await?;
    let cashflows = CashflowRepository::new(state.get_db())
        .find_all(&user.company, CashflowFilter::default())
        .await?;

    let suggestions = suggest_matches_batch(&transactions, &invoices, &cashflows).await;
    let mut rows = Vec::new();
    for (tx_id, suggestion) in suggestions {
        if !suggestion.is_match() {
            continue;
        }
        repo.apply_match(
            &user.company,
            &tx_id.to_string(),
            MatchStatus::Pending,
            suggestion.invoice.clone(),
            suggestion.cashflow.clone(),
            Some(suggestion.confidence),
            Some(suggestion.reason.clone()),
        )
        .await?;
        rows.push(SuggestionRow {
            transaction: tx_id.to_string(),
            suggestion,
        });
    }
    Ok(ok(rows))
}

/// GET /api/reconciliation/sessions/{id}/report
pub async fn report(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DifferenceReport>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    let session_id = session
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Session record has no id"))?;
    let transactions = repo.list_transactions(&user.company, &session_id).await?;
    let cashflows = CashflowRepository::new(state.get_db())
        .find_all(&user.company, CashflowFilter::default())
        .await?;
    let invoices = InvoiceRepository::new(state.get_db())
        .find_all(&user.company, InvoiceFilter::default())
        .await?;

    Ok(ok(difference_report(
        &session,
        &transactions,
        &cashflows,
        &invoices,
    )))
}

/// GET /api/reconciliation/sessions/{id}/side-by-side
pub async fn side_by_side(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<SideBySideRow>>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    let session_id = session
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Session record has no id"))?;
    let transactions = repo.list_transactions(&user.company, &session_id).await?;
    let cashflows = CashflowRepository::new(state.get_db())
        .find_all(&user.company, CashflowFilter::default())
        .await?;

    Ok(ok(crate::reconciliation::side_by_side(
        &session,
        &transactions,
        &cashflows,
    )))
}

/// GET /api/reconciliation/sessions/{id}/unmatched
pub async fn unmatched(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UnmatchedData>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let session = load_session(&repo, &user, &id).await?;
    let session_id = session
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Session record has no id"))?;
    let transactions = repo.list_transactions(&user.company, &session_id).await?;
    let cashflows = CashflowRepository::new(state.get_db())
        .find_all(&user.company, CashflowFilter::default())
        .await?;

    Ok(ok(crate::reconciliation::unmatched_data(
        &session,
        &transactions,
        &cashflows,
    )))
}

/// DELETE /api/reconciliation/transactions/{id}
pub async fn delete_transaction(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let tx = load_transaction(&repo, &user, &id).await?;
    open_session_of(&repo, &user, &tx).await?;

    repo.delete_transaction(&user.company, &id).await?;
    let delta = combine(
        CounterDelta {
            total: -1,
            ..Default::default()
        },
        bucket_delta(tx.match_status, -1),
    );
    repo.apply_counter_delta(&tx.session, delta).await?;
    Ok(ok_with_message("Transazione eliminata", ()))
}

/// POST /api/reconciliation/transactions/{id}/suggest
pub async fn suggest_transaction(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MatchSuggestion>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let tx = load_transaction(&repo, &user, &id).await?;
    open_session_of(&repo, &user, &tx).await?;
    if tx.match_status != MatchStatus::Pending {
        return Err(AppError::new(ErrorCode::TransactionNotPending));
    }

    let invoices = InvoiceRepository::new(state.get_db())
        .find_all(&user.company, InvoiceFilter::default())
        .await?;
    let cashflows = CashflowRepository::new(state.get_db())
        .find_all(&user.company, CashflowFilter::default())
        .await?;

    let suggestion = suggest_match(&tx, &invoices, &cashflows);
    if suggestion.is_match() {
        repo.apply_match(
            &user.company,
            &id,
            MatchStatus::Pending,
            suggestion.invoice.clone(),
            suggestion.cashflow.clone(),
            Some(suggestion.confidence),
            Some(suggestion.reason.clone()),
        )
        .await?;
    }
    Ok(ok(suggestion))
}

/// POST /api/reconciliation/transactions/{id}/confirm
///
/// Promotes a stored suggestion to a confirmed match.
pub async fn confirm_match(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BankTransaction>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let tx = load_transaction(&repo, &user, &id).await?;
    open_session_of(&repo, &user, &tx).await?;
    if tx.match_status != MatchStatus::Pending {
        return Err(AppError::new(ErrorCode::TransactionNotPending));
    }
    if tx.matched_cashflow.is_none() {
        return Err(AppError::invalid_request(
            "Nessun abbinamento suggerito da confermare",
        ));
    }

    let updated = repo
        .apply_match(
            &user.company,
            &id,
            MatchStatus::Matched,
            tx.matched_invoice.clone(),
            tx.matched_cashflow.clone(),
            tx.match_confidence,
            tx.match_reason.clone(),
        )
        .await?;
    repo.apply_counter_delta(
        &tx.session,
        transition(MatchStatus::Pending, MatchStatus::Matched),
    )
    .await?;
    Ok(ok_with_message("Abbinamento confermato", updated))
}

/// POST /api/reconciliation/transactions/{id}/ignore
pub async fn ignore_transaction(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BankTransaction>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let tx = load_transaction(&repo, &user, &id).await?;
    open_session_of(&repo, &user, &tx).await?;
    if tx.match_status != MatchStatus::Pending {
        return Err(AppError::new(ErrorCode::TransactionNotPending));
    }

    let updated = repo
        .apply_match(
            &user.company,
            &id,
            MatchStatus::Ignored,
            None,
            None,
            None,
            Some(REASON_IGNORED.to_string()),
        )
        .await?;
    repo.apply_counter_delta(
        &tx.session,
        transition(MatchStatus::Pending, MatchStatus::Ignored),
    )
    .await?;
    Ok(ok_with_message("Transazione ignorata", updated))
}

/// POST /api/reconciliation/transactions/{id}/match
pub async fn manual_match(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ManualMatchRequest>,
) -> AppResult<ApiResponse<BankTransaction>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let tx = load_transaction(&repo, &user, &id).await?;
    open_session_of(&repo, &user, &tx).await?;

    let cashflow = CashflowRepository::new(state.get_db())
        .find_by_id(&user.company, &payload.cashflow)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CashflowNotFound))?;
    let cashflow_id = cashflow
        .id
        .ok_or_else(|| AppError::internal("Cashflow record has no id"))?;

    let invoice_id = match &payload.invoice {
        Some(raw) => {
            let invoice = InvoiceRepository::new(state.get_db())
                .find_by_id(&user.company, raw)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;
            invoice.id
        }
        None => None,
    };

    let updated = repo
        .apply_match(
            &user.company,
            &id,
            MatchStatus::Manual,
            invoice_id,
            Some(cashflow_id),
            Some(100),
            Some(REASON_MANUAL.to_string()),
        )
        .await?;
    repo.apply_counter_delta(&tx.session, transition(tx.match_status, MatchStatus::Manual))
        .await?;
    Ok(ok_with_message("Abbinamento manuale registrato", updated))
}

/// POST /api/reconciliation/transactions/{id}/unmatch
pub async fn unmatch(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BankTransaction>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let tx = load_transaction(&repo, &user, &id).await?;
    open_session_of(&repo, &user, &tx).await?;

    let updated = repo
        .apply_match(
            &user.company,
            &id,
            MatchStatus::Pending,
            None,
            None,
            None,
            None,
        )
        .await?;
    repo.apply_counter_delta(
        &tx.session,
        transition(tx.match_status, MatchStatus::Pending),
    )
    .await?;
    Ok(ok_with_message("Abbinamento rimosso", updated))
}

/// POST /api/reconciliation/transactions/{id}/create-invoice
///
/// Creates an effective invoice straight from the statement line and
/// records the pairing as a manual match.
pub async fn create_invoice_from_transaction(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BankTransaction>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let tx = load_transaction(&repo, &user, &id).await?;
    open_session_of(&repo, &user, &tx).await?;
    if tx.match_status != MatchStatus::Pending {
        return Err(AppError::new(ErrorCode::TransactionNotPending));
    }

    use chrono::Datelike;
    let invoice = InvoiceRepository::new(state.get_db())
        .create(
            &user.company,
            InvoiceCreate {
                data: tx.data,
                data_scadenza: None,
                mese: tx.data.month(),
                anno: tx.data.year(),
                nome_progetto: tx.descrizione.clone(),
                tipo: tx.tipo,
                stato_fatturazione: StatoFatturazione::Effettivo,
                spesa: None,
                tipo_spesa: None,
                note: Some(REASON_INVOICE_FROM_TX.to_string()),
                flusso: tx.importo,
                iva: Decimal::ZERO,
                percentuale_iva: 0,
                percentuale_fatturazione: 100,
                checked: false,
            },
        )
        .await?;

    let updated = repo
        .apply_match(
            &user.company,
            &id,
            MatchStatus::Manual,
            invoice.id,
            None,
            Some(100),
            Some(REASON_INVOICE_FROM_TX.to_string()),
        )
        .await?;
    repo.apply_counter_delta(
        &tx.session,
        transition(MatchStatus::Pending, MatchStatus::Manual),
    )
    .await?;
    Ok(ok_with_message("Fattura creata", updated))
}

/// POST /api/reconciliation/transactions/{id}/create-cashflow
///
/// Creates an effective cashflow record mirroring the statement line,
/// optionally linked to an invoice, and matches the transaction to it.
pub async fn create_cashflow_from_transaction(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<CreateCashflowRequest>>,
) -> AppResult<ApiResponse<BankTransaction>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let tx = load_transaction(&repo, &user, &id).await?;
    open_session_of(&repo, &user, &tx).await?;
    if tx.match_status != MatchStatus::Pending {
        return Err(AppError::new(ErrorCode::TransactionNotPending));
    }

    let invoice_id = match payload.and_then(|Json(p)| p.invoice) {
        Some(raw) => {
            let invoice = InvoiceRepository::new(state.get_db())
                .find_by_id(&user.company, &raw)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?;
            invoice.id
        }
        None => None,
    };

    let record = CashflowRepository::new(state.get_db())
        .create(
            &user.company,
            CashflowCreate {
                invoice: invoice_id.clone(),
                data_pagamento: Some(tx.data),
                importo: Some(tx.importo),
                tipo: Some(tx.tipo),
                descrizione: Some(tx.descrizione.clone()),
                categoria: None,
                note: Some(NOTE_CASHFLOW_FROM_TX.to_string()),
                stato_fatturazione: StatoFatturazione::Effettivo,
            },
        )
        .await?;
    let cashflow_id = record
        .id
        .ok_or_else(|| AppError::internal("Cashflow record has no id"))?;

    let updated = repo
        .apply_match(
            &user.company,
            &id,
            MatchStatus::Manual,
            invoice_id,
            Some(cashflow_id),
            Some(100),
            Some(REASON_CASHFLOW_FROM_TX.to_string()),
        )
        .await?;
    repo.apply_counter_delta(
        &tx.session,
        transition(MatchStatus::Pending, MatchStatus::Manual),
    )
    .await?;
    Ok(ok_with_message("Movimento creato", updated))
}

/// POST /api/reconciliation/repair-orphans
///
/// Re-links auto-created cashflows that lost their invoice reference and
/// clears invoice links pointing at deleted invoices.
pub async fn repair_orphans(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<RepairResult>> {
    let repo = ReconciliationRepository::new(state.get_db());
    let cashflow_repo = CashflowRepository::new(state.get_db());

    let mut transactions = Vec::new();
    for session in repo.list_sessions(&user.company).await? {
        if let Some(session_id) = session.id {
            transactions.extend(repo.list_transactions(&user.company, &session_id).await?);
        }
    }
    let cashflows = cashflow_repo
        .find_all(&user.company, CashflowFilter::default())
        .await?;

    let links = crate::reconciliation::orphan_invoice_links(&cashflows, &transactions);
    let relinked = links.len();
    for (cashflow_id, invoice_id) in links {
        cashflow_repo
            .update(
                &user.company,
                &cashflow_id.to_string(),
                CashflowUpdate {
                    invoice: Some(invoice_id),
                    ..Default::default()
                },
            )
            .await?;
    }

    let cleared = cashflow_repo.repair_orphans(&user.company).await?;
    Ok(ok_with_message(
        "Riparazione completata",
        RepairResult { relinked, cleared },
    ))
}
