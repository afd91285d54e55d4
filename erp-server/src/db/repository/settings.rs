//! Settings Repository
//!
//! Application and email settings, one row per company. Reads fall back to
//! defaults so a fresh company works without a setup step.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{AppSettings, CompanyId, EmailSettings};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

#[derive(Clone)]
pub struct SettingsRepository {
    base: BaseRepository,
}

impl SettingsRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn app_settings(&self, company: &CompanyId) -> RepoResult<AppSettings> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM app_settings WHERE company = $company LIMIT 1")
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<AppSettings> = result.take(0)?;
        Ok(rows
            .into_iter()
            .next()
            .unwrap_or_else(|| AppSettings::defaults_for(company.clone())))
    }

    pub async fn save_app_settings(&self, settings: AppSettings) -> RepoResult<AppSettings> {
        let mut result = self
            .base
            .db()
            .query(
                r#"LET $existing = (SELECT id FROM app_settings
                    WHERE company = $company LIMIT 1);
                IF array::len($existing) > 0 THEN
                    (UPDATE app_settings SET
                        default_ai_provider = $settings.default_ai_provider,
                        anthropic_api_key = $settings.anthropic_api_key,
                        openai_api_key = $settings.openai_api_key,
                        notification_refresh_interval = $settings.notification_refresh_interval
                    WHERE company = $company RETURN AFTER)
                ELSE
                    (CREATE app_settings CONTENT $settings RETURN AFTER)
                END;"#,
            )
            .bind(("company", settings.company.clone()))
            .bind(("settings", settings))
            .await?;
        let rows: Vec<AppSettings> = result.take(1)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to save app settings".to_string()))
    }

    pub async fn email_settings(&self, company: &CompanyId) -> RepoResult<Option<EmailSettings>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM email_settings WHERE company = $company LIMIT 1")
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<EmailSettings> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn save_email_settings(
        &self,
        company: &CompanyId,
        mut settings: EmailSettings,
    ) -> RepoResult<EmailSettings> {
        settings.company = Some(company.clone());
        let mut result = self
            .base
            .db()
            .query(
                r#"LET $existing = (SELECT id FROM email_settings
                    WHERE company = $company LIMIT 1);
                IF array::len($existing) > 0 THEN
                    (UPDATE email_settings CONTENT $settings
                    WHERE company = $company RETURN AFTER)
                ELSE
                    (CREATE email_settings CONTENT $settings RETURN AFTER)
                END;"#,
            )
            .bind(("company", company.clone()))
            .bind(("settings", settings))
            .await?;
        let rows: Vec<EmailSettings> = result.take(1)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to save email settings".to_string()))
    }
}
