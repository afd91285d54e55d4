//! Client-facing DTOs for auth and user flows
//!
//! Request/response bodies shared between the server and API clients.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Login request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub company_id: String,
    pub company_name: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Registration request: first user + company in one step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub admin_name: String,
    pub company_name: String,
}

/// Email confirmation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmEmailRequest {
    pub token: String,
}

/// Password change request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Invitation details returned by token validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationInfo {
    pub email: String,
    pub name: String,
    pub role: String,
    pub company_name: String,
    pub expires_at: String,
}

/// Invitation completion request: set the password for an invited account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteInvitationRequest {
    pub token: String,
    pub password: String,
}
