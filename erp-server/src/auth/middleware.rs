//! Authentication Middleware
//!
//! JWT validation plus role gates for the management endpoints.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use shared::error::{AppError, ErrorCode};

/// Public API routes that skip authentication
const PUBLIC_ROUTES: [&str; 5] = [
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/confirm-email",
    "/api/users/complete-invitation",
    "/api/health",
];

fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path) || path.starts_with("/api/users/validate-invitation/")
}

/// Authentication middleware
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`, then
/// injects [`CurrentUser`] into the request extensions. OPTIONS requests,
/// non-API paths, and the public routes above pass through untouched.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // CORS preflight
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes fall through to their own 404 handling
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public(path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Admin-only middleware (user management, invitations)
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

/// Admin or manager (company settings, imports, reconciliation)
pub async fn require_manage_company(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.role.can_manage_company() {
        security_log!(
            "WARN",
            "manager_required",
            user_id = user.id.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::RoleRequired));
    }

    Ok(next.run(req).await)
}

/// Any role except viewer may mutate business data. Read-only verbs pass
/// through so viewers can still list and fetch.
pub async fn require_edit(req: Request, next: Next) -> Result<Response, AppError> {
    if matches!(
        *req.method(),
        http::Method::GET | http::Method::HEAD | http::Method::OPTIONS
    ) {
        return Ok(next.run(req).await);
    }

    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.role.can_edit() {
        security_log!(
            "WARN",
            "edit_denied",
            user_id = user.id.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::permission_denied(
            "Viewers cannot modify data".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
