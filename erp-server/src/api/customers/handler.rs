//! Customer handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Customer, CustomerCreate, CustomerStatus, CustomerUpdate};
use crate::db::repository::CustomerRepository;
use crate::utils::validation::{
    validate_optional_text, validate_required_text, MAX_ADDRESS_LEN, MAX_NAME_LEN,
    MAX_SHORT_TEXT_LEN,
};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub status: Option<CustomerStatus>,
    /// Case-insensitive match over name, company name and email
    pub search: Option<String>,
}

fn validate_create(payload: &CustomerCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.company_name, "company_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.vat_id, "vat_id", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.sdi_code, "sdi_code", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

fn validate_update(payload: &CustomerUpdate) -> AppResult<()> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.company_name, "company_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.vat_id, "vat_id", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.sdi_code, "sdi_code", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// GET /api/customers?status=&search=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<CustomerQuery>,
) -> AppResult<ApiResponse<Vec<Customer>>> {
    let repo = CustomerRepository::new(state.get_db());
    let customers = repo
        .find_all(&user.company, query.status, query.search)
        .await?;
    Ok(ok(customers))
}

/// GET /api/customers/{id}
pub async fn get_one(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Customer>> {
    let repo = CustomerRepository::new(state.get_db());
    let customer = repo
        .find_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
    Ok(ok(customer))
}

/// POST /api/customers
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<ApiResponse<Customer>> {
    validate_create(&payload)?;
    let repo = CustomerRepository::new(state.get_db());
    let customer = repo.create(&user.company, payload).await?;
    Ok(ok_with_message("Cliente creato", customer))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<ApiResponse<Customer>> {
    validate_update(&payload)?;
    let repo = CustomerRepository::new(state.get_db());
    let customer = repo.update(&user.company, &id, payload).await?;
    Ok(ok_with_message("Cliente aggiornato", customer))
}

/// DELETE /api/customers/{id}
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = CustomerRepository::new(state.get_db());
    if !repo.delete(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::CustomerNotFound));
    }
    Ok(ok_with_message("Cliente eliminato", ()))
}
