//! Financial statement handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Category, FinancialItem, FinancialItemCreate, FinancialItemUpdate, Section, StatementTotals,
};
use crate::db::repository::FinancialItemRepository;
use crate::utils::validation::{validate_optional_text, validate_required_text, MAX_NAME_LEN};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct FinancialItemQuery {
    pub section: Option<Section>,
}

fn check_pairing(section: Section, category: Category) -> AppResult<()> {
    if category.section() != section {
        return Err(AppError::with_message(
            ErrorCode::SectionCategoryMismatch,
            format!(
                "La categoria '{}' appartiene alla sezione '{}'",
                category.as_str(),
                category.section().as_str()
            ),
        ));
    }
    Ok(())
}

/// GET /api/financial-items?section=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<FinancialItemQuery>,
) -> AppResult<ApiResponse<Vec<FinancialItem>>> {
    let repo = FinancialItemRepository::new(state.get_db());
    let items = repo.find_all(&user.company, query.section).await?;
    Ok(ok(items))
}

/// GET /api/financial-items/totals
pub async fn totals(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<StatementTotals>> {
    let repo = FinancialItemRepository::new(state.get_db());
    let items = repo.find_all(&user.company, None).await?;
    Ok(ok(StatementTotals::compute(&items)))
}

/// GET /api/financial-items/{id}
pub async fn get_one(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<FinancialItem>> {
    let repo = FinancialItemRepository::new(state.get_db());
    let item = repo
        .find_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::FinancialItemNotFound))?;
    Ok(ok(item))
}

/// POST /api/financial-items
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<FinancialItemCreate>,
) -> AppResult<ApiResponse<FinancialItem>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    check_pairing(payload.section, payload.category)?;

    let repo = FinancialItemRepository::new(state.get_db());
    let item = repo.create(&user.company, payload).await?;
    Ok(ok_with_message("Voce di bilancio creata", item))
}

/// PUT /api/financial-items/{id}
///
/// The section/category pairing is checked against the values the item
/// will end up with, not just the ones in the payload.
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<FinancialItemUpdate>,
) -> AppResult<ApiResponse<FinancialItem>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;

    let repo = FinancialItemRepository::new(state.get_db());
    let current = repo
        .find_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::FinancialItemNotFound))?;

    let section = payload.section.unwrap_or(current.section);
    let category = payload.category.unwrap_or(current.category);
    check_pairing(section, category)?;

    let item = repo.update(&user.company, &id, payload).await?;
    Ok(ok_with_message("Voce di bilancio aggiornata", item))
}

/// DELETE /api/financial-items/{id}
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = FinancialItemRepository::new(state.get_db());
    if !repo.delete(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::FinancialItemNotFound));
    }
    Ok(ok_with_message("Voce di bilancio eliminata", ()))
}
