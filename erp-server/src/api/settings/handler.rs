//! Company settings handlers

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AiProvider, AppSettings, EmailSettings};
use crate::db::repository::SettingsRepository;
use crate::utils::{ok, ok_with_message, ApiResponse, AppResult};

/// Placeholder returned instead of stored secrets; a PUT carrying it back
/// keeps the stored value
const SECRET_MASK: &str = "********";

#[derive(Debug, Default, Deserialize)]
pub struct AppSettingsUpdate {
    pub default_ai_provider: Option<AiProvider>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub notification_refresh_interval: Option<u8>,
}

fn mask(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| !v.is_empty()) {
        *value = Some(SECRET_MASK.to_string());
    }
}

fn unmask(incoming: &mut Option<String>, stored: Option<String>) {
    if incoming.as_deref() == Some(SECRET_MASK) {
        *incoming = stored;
    }
}

fn masked_app(mut settings: AppSettings) -> AppSettings {
    mask(&mut settings.anthropic_api_key);
    mask(&mut settings.openai_api_key);
    settings
}

fn masked_email(mut settings: EmailSettings) -> EmailSettings {
    mask(&mut settings.smtp_password);
    mask(&mut settings.google_refresh_token);
    mask(&mut settings.google_client_secret);
    settings
}

/// GET /api/settings/app
pub async fn get_app(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<AppSettings>> {
    let repo = SettingsRepository::new(state.get_db());
    let settings = repo.app_settings(&user.company).await?;
    Ok(ok(masked_app(settings)))
}

/// PUT /api/settings/app
pub async fn put_app(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AppSettingsUpdate>,
) -> AppResult<ApiResponse<AppSettings>> {
    let repo = SettingsRepository::new(state.get_db());
    let mut settings = repo.app_settings(&user.company).await?;

    if let Some(provider) = payload.default_ai_provider {
        settings.default_ai_provider = provider;
    }
    if let Some(key) = payload.anthropic_api_key {
        settings.anthropic_api_key = match key.as_str() {
            SECRET_MASK => settings.anthropic_api_key.take(),
            "" => None,
            _ => Some(key),
        };
    }
    if let Some(key) = payload.openai_api_key {
        settings.openai_api_key = match key.as_str() {
            SECRET_MASK => settings.openai_api_key.take(),
            "" => None,
            _ => Some(key),
        };
    }
    if let Some(interval) = payload.notification_refresh_interval {
        settings.notification_refresh_interval = interval;
    }

    settings.validate()?;
    let saved = repo.save_app_settings(settings).await?;
    Ok(ok_with_message("Impostazioni salvate", masked_app(saved)))
}

/// GET /api/settings/email
pub async fn get_email(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Option<EmailSettings>>> {
    let repo = SettingsRepository::new(state.get_db());
    let settings = repo.email_settings(&user.company).await?;
    Ok(ok(settings.map(masked_email)))
}

/// PUT /api/settings/email
pub async fn put_email(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(mut payload): Json<EmailSettings>,
) -> AppResult<ApiResponse<EmailSettings>> {
    let repo = SettingsRepository::new(state.get_db());
    if let Some(stored) = repo.email_settings(&user.company).await? {
        unmask(&mut payload.smtp_password, stored.smtp_password);
        unmask(&mut payload.google_refresh_token, stored.google_refresh_token);
        unmask(&mut payload.google_client_secret, stored.google_client_secret);
    }

    payload.validate()?;
    let saved = repo.save_email_settings(&user.company, payload).await?;
    Ok(ok_with_message(
        "Impostazioni email salvate",
        masked_email(saved),
    ))
}
