//! Bank balance handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{BankBalance, BankBalanceCreate, BankBalanceUpdate};
use crate::db::repository::BankBalanceRepository;
use crate::utils::validation::{validate_optional_text, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct BankBalanceQuery {
    pub anno: Option<i32>,
}

/// GET /api/bank-balances?anno=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<BankBalanceQuery>,
) -> AppResult<ApiResponse<Vec<BankBalance>>> {
    let repo = BankBalanceRepository::new(state.get_db());
    let balances = repo.find_all(&user.company, query.anno).await?;
    Ok(ok(balances))
}

/// GET /api/bank-balances/{id}
pub async fn get_one(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BankBalance>> {
    let repo = BankBalanceRepository::new(state.get_db());
    let balance = repo
        .find_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BankBalanceNotFound))?;
    Ok(ok(balance))
}

/// POST /api/bank-balances
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BankBalanceCreate>,
) -> AppResult<ApiResponse<BankBalance>> {
    validate_optional_text(&payload.conto, "conto", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let repo = BankBalanceRepository::new(state.get_db());
    let balance = repo.create(&user.company, payload).await?;
    Ok(ok_with_message("Saldo registrato", balance))
}

/// PUT /api/bank-balances/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<BankBalanceUpdate>,
) -> AppResult<ApiResponse<BankBalance>> {
    validate_optional_text(&payload.conto, "conto", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let repo = BankBalanceRepository::new(state.get_db());
    let balance = repo.update(&user.company, &id, payload).await?;
    Ok(ok_with_message("Saldo aggiornato", balance))
}

/// DELETE /api/bank-balances/{id}
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = BankBalanceRepository::new(state.get_db());
    if !repo.delete(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::BankBalanceNotFound));
    }
    Ok(ok_with_message("Saldo eliminato", ()))
}
