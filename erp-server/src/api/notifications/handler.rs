//! Notification handlers

use axum::extract::{Path, State};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::InvoiceNotification;
use crate::db::repository::NotificationRepository;
use crate::notifications::scan_company;
use crate::utils::{ok, ok_with_message, ApiResponse, AppResult};

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    /// Invoices currently raising an alert
    pub alerted: usize,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Vec<InvoiceNotification>>> {
    let repo = NotificationRepository::new(state.get_db());
    let notifications = repo.list_open(&user.company).await?;
    Ok(ok(notifications))
}

/// POST /api/notifications/refresh
///
/// On-demand due-date scan, same logic the background scheduler runs.
pub async fn refresh(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<RefreshResult>> {
    let alerted = scan_company(&state, &user.company).await?;
    Ok(ok(RefreshResult { alerted }))
}

/// POST /api/notifications/{id}/dismiss
pub async fn dismiss(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<InvoiceNotification>> {
    let repo = NotificationRepository::new(state.get_db());
    let notification = repo.dismiss(&user.company, &id).await?;
    Ok(ok_with_message("Notifica archiviata", notification))
}
