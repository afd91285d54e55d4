//! Deal handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Deal, DealCreate, DealStage, DealUpdate};
use crate::db::repository::DealRepository;
use crate::utils::validation::{
    validate_optional_text, validate_percentage, validate_required_text, MAX_NAME_LEN,
};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct DealQuery {
    pub stage: Option<DealStage>,
}

/// GET /api/deals?stage=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<DealQuery>,
) -> AppResult<ApiResponse<Vec<Deal>>> {
    let repo = DealRepository::new(state.get_db());
    let deals = repo.find_all(&user.company, query.stage).await?;
    Ok(ok(deals))
}

/// GET /api/deals/{id}
pub async fn get_one(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Deal>> {
    let repo = DealRepository::new(state.get_db());
    let deal = repo
        .find_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DealNotFound))?;
    Ok(ok(deal))
}

/// POST /api/deals
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DealCreate>,
) -> AppResult<ApiResponse<Deal>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    if let Some(probability) = payload.probability {
        validate_percentage(probability, "probability")?;
    }

    let repo = DealRepository::new(state.get_db());
    let deal = repo.create(&user.company, payload).await?;
    Ok(ok_with_message("Trattativa creata", deal))
}

/// PUT /api/deals/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<DealUpdate>,
) -> AppResult<ApiResponse<Deal>> {
    validate_optional_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    if let Some(probability) = payload.probability {
        validate_percentage(probability, "probability")?;
    }

    let repo = DealRepository::new(state.get_db());
    let deal = repo.update(&user.company, &id, payload).await?;
    Ok(ok_with_message("Trattativa aggiornata", deal))
}

/// DELETE /api/deals/{id}
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = DealRepository::new(state.get_db());
    if !repo.delete(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::DealNotFound));
    }
    Ok(ok_with_message("Trattativa eliminata", ()))
}
