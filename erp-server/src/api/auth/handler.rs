//! Authentication handlers

use std::time::Duration;

use axum::extract::State;
use axum::Json;

use shared::client::{
    ChangePasswordRequest, ConfirmEmailRequest, LoginRequest, LoginResponse, RegisterRequest,
    UserInfo,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Company, CompanyUser, Role, User};
use crate::db::repository::{parse_id, RepoError, UserRepository};
use crate::security_log;
use crate::utils::validation::{
    validate_password, validate_required_text, MAX_EMAIL_LEN, MAX_NAME_LEN,
};
use crate::utils::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCode};

/// Fixed delay applied to every login attempt so response timing does not
/// reveal whether the email exists
const LOGIN_DELAY: Duration = Duration::from_millis(500);

/// Message shown when the membership is deactivated
const ACCOUNT_DISABLED_MSG: &str = "Account disabilitato. Contatta l'amministratore.";

fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(())
}

pub(crate) fn login_response(
    state: &ServerState,
    user: &User,
    company: &Company,
    membership: &CompanyUser,
) -> AppResult<LoginResponse> {
    let user_id = user
        .id
        .as_ref()
        .ok_or_else(|| AppError::internal("User record has no id"))?
        .to_string();
    let company_id = company
        .id
        .as_ref()
        .ok_or_else(|| AppError::internal("Company record has no id"))?
        .to_string();

    let token = state
        .get_jwt_service()
        .generate_token(&user_id, &user.email, &user.name, membership.role, &company_id)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    Ok(LoginResponse {
        token,
        user: UserInfo {
            id: user_id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: membership.role.as_str().to_string(),
            company_id,
            company_name: company.name.clone(),
            is_active: membership.is_active,
        },
    })
}

/// POST /api/auth/register
///
/// Creates the user, the company and the admin membership in one step and
/// returns a ready-to-use session.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_required_text(&payload.admin_name, "adminName", MAX_NAME_LEN)?;
    validate_required_text(&payload.company_name, "companyName", MAX_NAME_LEN)?;

    let password_hash = User::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let repo = UserRepository::new(state.get_db());
    let (user, company, membership) = repo
        .register_company_admin(
            &payload.email,
            &payload.admin_name,
            &password_hash,
            &payload.company_name,
        )
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::UserEmailExists),
            other => other.into(),
        })?;

    security_log!(
        "INFO",
        "user_registered",
        email = user.email.clone(),
        company = company.name.clone()
    );

    let response = login_response(&state, &user, &company, &membership)?;
    Ok(ok_with_message("Registrazione completata", response))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same error; a deactivated
/// membership is reported explicitly.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    tokio::time::sleep(LOGIN_DELAY).await;

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let verified = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !verified {
        security_log!("WARN", "login_failed", email = payload.email.clone());
        return Err(AppError::invalid_credentials());
    }

    let user_id = user
        .id
        .clone()
        .ok_or_else(|| AppError::internal("User record has no id"))?;
    let membership = repo
        .find_membership_for_user(&user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CompanyRequired))?;
    if !membership.is_active {
        security_log!("WARN", "login_disabled", email = payload.email.clone());
        return Err(AppError::with_message(
            ErrorCode::AccountDisabled,
            ACCOUNT_DISABLED_MSG,
        ));
    }

    let company = repo
        .find_company(&membership.company)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CompanyNotFound))?;

    security_log!("INFO", "login_success", email = user.email.clone());
    let response = login_response(&state, &user, &company, &membership)?;
    Ok(ok(response))
}

/// POST /api/auth/confirm-email
///
/// The confirmation token is the access token issued at registration; a
/// valid one proves control of the session and flips the flag.
pub async fn confirm_email(
    State(state): State<ServerState>,
    Json(payload): Json<ConfirmEmailRequest>,
) -> AppResult<ApiResponse<()>> {
    let claims = state
        .get_jwt_service()
        .validate_token(&payload.token)
        .map_err(|_| AppError::invalid_token("Invalid confirmation token"))?;

    let user_id = parse_id(&claims.sub)?;
    let repo = UserRepository::new(state.get_db());
    let user = repo.set_email_confirmed(&user_id).await?;

    security_log!("INFO", "email_confirmed", email = user.email);
    Ok(ok_with_message("Email confermata", ()))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<UserInfo>> {
    let repo = UserRepository::new(state.get_db());
    let company = repo
        .find_company(&user.company)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CompanyNotFound))?;
    let user_id = parse_id(&user.id)?;
    let membership = repo
        .find_membership(&user.company, &user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MembershipNotFound))?;

    Ok(ok(UserInfo {
        id: user.id,
        email: user.email,
        name: user.name,
        role: membership.role.as_str().to_string(),
        company_id: user.company.to_string(),
        company_name: company.name,
        is_active: membership.is_active,
    }))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    validate_password(&payload.new_password)?;

    let user_id = parse_id(&user.id)?;
    let repo = UserRepository::new(state.get_db());
    let account = repo
        .find_user_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let verified = account
        .verify_password(&payload.current_password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !verified {
        return Err(AppError::new(ErrorCode::PasswordMismatch));
    }

    let password_hash = User::hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;
    repo.update_password(&user_id, &password_hash).await?;

    security_log!("INFO", "password_changed", user_id = user.id);
    Ok(ok_with_message("Password aggiornata", ()))
}

/// DELETE /api/auth/delete-account
///
/// Removes the account and all its memberships. The only administrator of
/// a company cannot remove themselves.
pub async fn delete_account(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    let user_id = parse_id(&user.id)?;
    let repo = UserRepository::new(state.get_db());

    if user.role == Role::Admin {
        let admins = repo.count_active_admins(&user.company).await?;
        if admins <= 1 {
            return Err(AppError::new(ErrorCode::LastAdminDelete));
        }
    }

    repo.delete_user(&user_id).await?;
    security_log!("WARN", "account_deleted", user_id = user.id, email = user.email);
    Ok(ok_with_message("Account eliminato", ()))
}
