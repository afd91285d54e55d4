//! Email dispatch handlers
//!
//! Thin wrappers over the gateway client. Every field of the send request
//! is optional at the wire level; missing ones are reported together
//! instead of failing on the first.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{SettingsRepository, UserRepository};
use crate::services::InvitationEmail;
use crate::utils::{ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct SendInvitationRequest {
    pub to_email: Option<String>,
    pub to_name: Option<String>,
    pub inviter_name: Option<String>,
    pub company_name: Option<String>,
    pub invite_token: Option<String>,
    pub role: Option<String>,
    /// When present, must be the caller's own company
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    pub email: String,
}

/// POST /api/email/send-invitation
pub async fn send_invitation(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SendInvitationRequest>,
) -> AppResult<ApiResponse<()>> {
    let mut missing: Vec<&str> = Vec::new();
    if payload.to_email.as_deref().unwrap_or("").is_empty() {
        missing.push("to_email");
    }
    if payload.to_name.as_deref().unwrap_or("").is_empty() {
        missing.push("to_name");
    }
    if payload.invite_token.as_deref().unwrap_or("").is_empty() {
        missing.push("invite_token");
    }
    if !missing.is_empty() {
        return Err(AppError::validation("Campi obbligatori mancanti")
            .with_detail("missing", missing.join(", ")));
    }

    if let Some(company_id) = &payload.company_id {
        if *company_id != user.company.to_string() {
            return Err(AppError::permission_denied(
                "Cannot send invitations for another company",
            ));
        }
    }

    let company_name = match payload.company_name {
        Some(name) if !name.is_empty() => name,
        _ => UserRepository::new(state.get_db())
            .find_company(&user.company)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CompanyNotFound))?
            .name,
    };

    let message = InvitationEmail {
        to_email: payload.to_email.unwrap_or_default(),
        to_name: payload.to_name.unwrap_or_default(),
        inviter_name: payload.inviter_name.unwrap_or_else(|| user.name.clone()),
        company_name,
        invite_token: payload.invite_token.unwrap_or_default(),
        role: payload.role.unwrap_or_else(|| "user".to_string()),
    };

    let settings = SettingsRepository::new(state.get_db())
        .email_settings(&user.company)
        .await?;
    state
        .email
        .send_invitation(settings.as_ref(), &message, &state.config.invite_base_url)
        .await?;

    Ok(ok_with_message("Email inviata", ()))
}

/// POST /api/email/test
///
/// Sends a fixed probe message so a fresh configuration can be verified.
pub async fn send_test(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<TestEmailRequest>,
) -> AppResult<ApiResponse<()>> {
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }

    let settings = SettingsRepository::new(state.get_db())
        .email_settings(&user.company)
        .await?;
    let probe = InvitationEmail::test_probe(&payload.email);
    state
        .email
        .send_invitation(settings.as_ref(), &probe, &state.config.invite_base_url)
        .await?;

    Ok(ok_with_message("Email di prova inviata", ()))
}
