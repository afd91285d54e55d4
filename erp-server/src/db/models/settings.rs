//! Company Settings Models
//!
//! Two singleton rows per company: application preferences and the email
//! delivery configuration. Email settings are validated on write so a
//! half-filled provider never reaches the dispatcher.

use super::serde_helpers;
use super::CompanyId;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use surrealdb::RecordId;

/// Settings row ID type
pub type SettingsId = RecordId;

/// AI provider used by the reconciliation suggestion engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Anthropic,
    Openai,
}

impl Default for AiProvider {
    fn default() -> Self {
        AiProvider::Anthropic
    }
}

/// Per-company application preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SettingsId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    #[serde(default)]
    pub default_ai_provider: AiProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    /// Minutes between invoice due-date scans; 1, 3 or 5
    #[serde(default = "default_refresh_interval")]
    pub notification_refresh_interval: u8,
}

fn default_refresh_interval() -> u8 {
    5
}

impl AppSettings {
    pub fn defaults_for(company: CompanyId) -> Self {
        Self {
            id: None,
            company,
            default_ai_provider: AiProvider::default(),
            anthropic_api_key: None,
            openai_api_key: None,
            notification_refresh_interval: default_refresh_interval(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if ![1, 3, 5].contains(&self.notification_refresh_interval) {
            return Err(AppError::new(ErrorCode::ValueOutOfRange).with_detail(
                "notification_refresh_interval",
                serde_json::json!(self.notification_refresh_interval),
            ));
        }
        Ok(())
    }
}

/// Email delivery provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailProvider {
    #[serde(rename = "smtp")]
    Smtp,
    #[serde(rename = "google-oauth2")]
    GoogleOauth2,
}

impl Default for EmailProvider {
    fn default() -> Self {
        EmailProvider::Smtp
    }
}

/// Per-company email configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailSettings {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SettingsId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub company: Option<CompanyId>,
    #[serde(default)]
    pub email_provider: EmailProvider,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub smtp_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_port: Option<u16>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub smtp_secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_from_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_from_name: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub google_oauth2_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_client_secret: Option<String>,
}

impl EmailSettings {
    /// The active provider is fully filled in and enabled
    pub fn is_configured(&self) -> bool {
        match self.email_provider {
            EmailProvider::Smtp => self.smtp_enabled && self.validate_smtp().is_ok(),
            EmailProvider::GoogleOauth2 => {
                self.google_oauth2_enabled && self.validate_oauth2().is_ok()
            }
        }
    }

    /// Reject configurations where the enabled provider is missing fields
    pub fn validate(&self) -> Result<(), AppError> {
        if self.smtp_enabled {
            self.validate_smtp()?;
        }
        if self.google_oauth2_enabled {
            self.validate_oauth2()?;
        }
        Ok(())
    }

    fn validate_smtp(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("smtp_host", &self.smtp_host),
            ("smtp_user", &self.smtp_user),
            ("smtp_password", &self.smtp_password),
            ("smtp_from_email", &self.smtp_from_email),
        ] {
            if value.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(AppError::new(ErrorCode::EmailSettingsInvalid)
                    .with_detail("missing", serde_json::json!(field)));
            }
        }
        match self.smtp_port {
            Some(p) if p >= 1 => Ok(()),
            _ => Err(AppError::new(ErrorCode::EmailSettingsInvalid)
                .with_detail("missing", serde_json::json!("smtp_port"))),
        }
    }

    fn validate_oauth2(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("google_client_id", &self.google_client_id),
            ("google_client_secret", &self.google_client_secret),
            ("google_refresh_token", &self.google_refresh_token),
            ("google_user_email", &self.google_user_email),
        ] {
            if value.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(AppError::new(ErrorCode::EmailSettingsInvalid)
                    .with_detail("missing", serde_json::json!(field)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_settings() -> EmailSettings {
        EmailSettings {
            email_provider: EmailProvider::Smtp,
            smtp_enabled: true,
            smtp_host: Some("smtp.example.com".into()),
            smtp_port: Some(587),
            smtp_user: Some("mailer".into()),
            smtp_password: Some("secret".into()),
            smtp_from_email: Some("noreply@example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_refresh_interval_values() {
        let company = RecordId::from_table_key("company", "c1");
        let mut s = AppSettings::defaults_for(company);
        assert_eq!(s.notification_refresh_interval, 5);
        for v in [1u8, 3, 5] {
            s.notification_refresh_interval = v;
            assert!(s.validate().is_ok());
        }
        s.notification_refresh_interval = 2;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_smtp_validation() {
        let ok = smtp_settings();
        assert!(ok.validate().is_ok());
        assert!(ok.is_configured());

        let mut missing_host = smtp_settings();
        missing_host.smtp_host = None;
        assert!(missing_host.validate().is_err());
        assert!(!missing_host.is_configured());

        let mut no_port = smtp_settings();
        no_port.smtp_port = None;
        assert!(no_port.validate().is_err());
    }

    #[test]
    fn test_disabled_provider_skips_validation() {
        let mut s = smtp_settings();
        s.smtp_enabled = false;
        s.smtp_host = None;
        assert!(s.validate().is_ok());
        assert!(!s.is_configured());
    }

    #[test]
    fn test_oauth2_validation() {
        let s = EmailSettings {
            email_provider: EmailProvider::GoogleOauth2,
            google_oauth2_enabled: true,
            google_user_email: Some("me@gmail.com".into()),
            google_refresh_token: Some("tok".into()),
            google_client_id: Some("cid".into()),
            google_client_secret: Some("sec".into()),
            ..Default::default()
        };
        assert!(s.validate().is_ok());
        assert!(s.is_configured());

        let mut missing = s.clone();
        missing.google_refresh_token = None;
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_provider_serde_labels() {
        assert_eq!(
            serde_json::to_string(&EmailProvider::GoogleOauth2).unwrap(),
            "\"google-oauth2\""
        );
        assert_eq!(
            serde_json::to_string(&AiProvider::Anthropic).unwrap(),
            "\"anthropic\""
        );
    }
}
