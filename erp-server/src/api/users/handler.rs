//! User management handlers

use axum::extract::{Path, State};
use axum::Json;
use chrono::DateTime;
use serde::Deserialize;
use validator::Validate;

use shared::client::{CompleteInvitationRequest, InvitationInfo, LoginResponse};

use crate::api::auth::handler::login_response;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    CompanyUserDetail, Invitation, InvitationStatus, InviteCreate, MembershipUpdate, Role, User,
};
use crate::db::repository::{parse_id, RepoError, SettingsRepository, UserRepository};
use crate::security_log;
use crate::services::InvitationEmail;
use crate::utils::time::now_millis;
use crate::utils::validation::{validate_password, validate_required_text, MAX_NAME_LEN};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(email)]
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// GET /api/users
pub async fn list_members(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Vec<CompanyUserDetail>>> {
    let repo = UserRepository::new(state.get_db());
    let members = repo.list_members(&user.company).await?;
    Ok(ok(members))
}

/// POST /api/users/invite
///
/// The invitation is created even when the email cannot be delivered; the
/// response message says which of the two happened.
pub async fn invite(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<InviteRequest>,
) -> AppResult<ApiResponse<Invitation>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let repo = UserRepository::new(state.get_db());
    let inviter_id = parse_id(&user.id)?;
    let invitation = repo
        .create_invitation(
            &user.company,
            &inviter_id,
            InviteCreate {
                email: payload.email.clone(),
                name: payload.name.clone(),
                role: payload.role,
            },
        )
        .await?;

    let company = repo
        .find_company(&user.company)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CompanyNotFound))?;

    let email_settings = SettingsRepository::new(state.get_db())
        .email_settings(&user.company)
        .await?;
    let message = InvitationEmail {
        to_email: invitation.email.clone(),
        to_name: invitation.name.clone(),
        inviter_name: user.name.clone(),
        company_name: company.name,
        invite_token: invitation.token.clone(),
        role: invitation.role.as_str().to_string(),
    };

    security_log!(
        "INFO",
        "invitation_created",
        email = invitation.email.clone(),
        invited_by = user.email.clone()
    );

    match state
        .email
        .send_invitation(email_settings.as_ref(), &message, &state.config.invite_base_url)
        .await
    {
        Ok(()) => Ok(ok_with_message("Invito inviato", invitation)),
        Err(err) => {
            tracing::warn!(error = %err, email = %invitation.email, "Invitation email not sent");
            Ok(ok_with_message(
                format!("Invito creato, email non inviata: {}", err),
                invitation,
            ))
        }
    }
}

fn check_invitation(invitation: &Invitation) -> Result<(), AppError> {
    if invitation.status == InvitationStatus::Accepted {
        return Err(AppError::new(ErrorCode::InvitationAlreadyAccepted));
    }
    if invitation.is_expired(now_millis()) {
        return Err(AppError::new(ErrorCode::InvitationExpired));
    }
    Ok(())
}

/// GET /api/users/validate-invitation/{token} (public)
pub async fn validate_invitation(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<ApiResponse<InvitationInfo>> {
    let repo = UserRepository::new(state.get_db());
    let invitation = repo
        .find_invitation_by_token(&token)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvitationNotFound))?;
    check_invitation(&invitation)?;

    let company = repo
        .find_company(&invitation.company)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CompanyNotFound))?;

    let expires_at = DateTime::from_timestamp_millis(invitation.expires_at)
        .map(|d| d.to_rfc3339())
        .unwrap_or_default();

    Ok(ok(InvitationInfo {
        email: invitation.email,
        name: invitation.name,
        role: invitation.role.as_str().to_string(),
        company_name: company.name,
        expires_at,
    }))
}

/// POST /api/users/complete-invitation (public)
///
/// Creates the account if the email is new, otherwise attaches the existing
/// account to the inviting company, then returns a ready session.
pub async fn complete_invitation(
    State(state): State<ServerState>,
    Json(payload): Json<CompleteInvitationRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    validate_password(&payload.password)?;

    let repo = UserRepository::new(state.get_db());
    let invitation = repo
        .find_invitation_by_token(&payload.token)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvitationNotFound))?;
    check_invitation(&invitation)?;

    let account = match repo.find_user_by_email(&invitation.email).await? {
        Some(existing) => existing,
        None => {
            let password_hash = User::hash_password(&payload.password)
                .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;
            repo.create_user(&invitation.email, &invitation.name, &password_hash, true)
                .await?
        }
    };
    let user_id = account
        .id
        .clone()
        .ok_or_else(|| AppError::internal("User record has no id"))?;

    let membership = repo
        .add_membership(&invitation.company, &user_id, invitation.role, true)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::UserAlreadyInCompany),
            other => other.into(),
        })?;
    repo.mark_invitation_accepted(&invitation).await?;

    let company = repo
        .find_company(&invitation.company)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CompanyNotFound))?;

    security_log!(
        "INFO",
        "invitation_accepted",
        email = account.email.clone(),
        company = company.name.clone()
    );

    let response = login_response(&state, &account, &company, &membership)?;
    Ok(ok_with_message("Invito accettato", response))
}

/// GET /api/users/invitations
pub async fn list_invitations(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Vec<Invitation>>> {
    let repo = UserRepository::new(state.get_db());
    let invitations = repo.list_pending_invitations(&user.company).await?;
    Ok(ok(invitations))
}

/// DELETE /api/users/invitations/{id}
pub async fn delete_invitation(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = UserRepository::new(state.get_db());
    if !repo.delete_invitation(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::InvitationNotFound));
    }
    Ok(ok_with_message("Invito eliminato", ()))
}

/// PUT /api/users/{id}
///
/// Role change or active toggle. Admins cannot edit their own membership,
/// and the last active admin cannot be demoted or deactivated.
pub async fn update_membership(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<MembershipUpdate>,
) -> AppResult<ApiResponse<crate::db::models::CompanyUser>> {
    let repo = UserRepository::new(state.get_db());
    let target = repo
        .find_membership_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MembershipNotFound))?;

    let self_id = parse_id(&user.id)?;
    if target.user == self_id {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }

    if target.role == Role::Admin && target.is_active {
        let demoting = matches!(payload.role, Some(r) if r != Role::Admin);
        let deactivating = payload.is_active == Some(false);
        if (demoting || deactivating) && repo.count_active_admins(&user.company).await? <= 1 {
            let code = if demoting {
                ErrorCode::LastAdminRole
            } else {
                ErrorCode::LastAdminActive
            };
            return Err(AppError::new(code));
        }
    }

    let updated = repo
        .update_membership(&user.company, &id, payload.role, payload.is_active)
        .await?;

    security_log!(
        "INFO",
        "membership_updated",
        membership = id,
        changed_by = user.email.clone()
    );
    Ok(ok_with_message("Membro aggiornato", updated))
}

/// DELETE /api/users/{id}
pub async fn remove_member(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let repo = UserRepository::new(state.get_db());
    let target = repo
        .find_membership_by_id(&user.company, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MembershipNotFound))?;

    let self_id = parse_id(&user.id)?;
    if target.user == self_id {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }
    if target.role == Role::Admin
        && target.is_active
        && repo.count_active_admins(&user.company).await? <= 1
    {
        return Err(AppError::new(ErrorCode::LastAdminDelete));
    }

    if !repo.delete_membership(&user.company, &id).await? {
        return Err(AppError::new(ErrorCode::MembershipNotFound));
    }

    security_log!(
        "WARN",
        "membership_removed",
        membership = id,
        removed_by = user.email.clone()
    );
    Ok(ok_with_message("Membro rimosso", ()))
}
