//! Company profile handlers

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Company;
use crate::db::repository::UserRepository;
use crate::utils::validation::{validate_optional_text, MAX_NAME_LEN, MAX_URL_LEN};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

/// GET /api/company
pub async fn get_company(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Company>> {
    let repo = UserRepository::new(state.get_db());
    let company = repo
        .find_company(&user.company)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CompanyNotFound))?;
    Ok(ok(company))
}

/// PUT /api/company
pub async fn update_company(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CompanyUpdate>,
) -> AppResult<ApiResponse<Company>> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() || name.len() > MAX_NAME_LEN {
            return Err(AppError::validation("Invalid company name"));
        }
    }
    validate_optional_text(&payload.logo_url, "logo_url", MAX_URL_LEN)?;

    let repo = UserRepository::new(state.get_db());
    let company = repo
        .update_company(&user.company, payload.name, payload.logo_url)
        .await?;
    Ok(ok_with_message("Azienda aggiornata", company))
}
