//! Invoice Notification Repository
//!
//! One row per invoice at most. The due-date scanner upserts, the UI
//! dismisses, and invoice edits that clear the alert condition dismiss
//! automatically.

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{CompanyId, InvoiceId, InvoiceNotification};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Open notifications for the panel, most urgent first
    pub async fn list_open(&self, company: &CompanyId) -> RepoResult<Vec<InvoiceNotification>> {
        let rows: Vec<InvoiceNotification> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM invoice_notification
                WHERE company = $company AND dismissed = false
                ORDER BY data_scadenza ASC"#,
            )
            .bind(("company", company.clone()))
            .await?
            .take(0)?;
        Ok(rows)
    }

    pub async fn find_by_invoice(
        &self,
        invoice: &InvoiceId,
    ) -> RepoResult<Option<InvoiceNotification>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM invoice_notification WHERE invoice = $invoice LIMIT 1")
            .bind(("invoice", invoice.clone()))
            .await?;
        let rows: Vec<InvoiceNotification> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Create or refresh the notification for an invoice. An existing row keeps
    /// its `dismissed` flag, so a dismissed alert does not reappear on every
    /// scan.
    pub async fn upsert(
        &self,
        notification: InvoiceNotification,
    ) -> RepoResult<InvoiceNotification> {
        let mut result = self
            .base
            .db()
            .query(
                r#"LET $existing = (SELECT id FROM invoice_notification
                    WHERE invoice = $invoice LIMIT 1);
                IF array::len($existing) > 0 THEN
                    (UPDATE invoice_notification SET
                        tipo = $tipo,
                        data_scadenza = $data_scadenza
                    WHERE invoice = $invoice RETURN AFTER)
                ELSE
                    (CREATE invoice_notification CONTENT $notification RETURN AFTER)
                END;"#,
            )
            .bind(("invoice", notification.invoice.clone()))
            .bind(("tipo", notification.tipo))
            .bind(("data_scadenza", notification.data_scadenza))
            .bind(("notification", notification))
            .await?;
        let rows: Vec<InvoiceNotification> = result.take(1)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to upsert notification".to_string()))
    }

    pub async fn dismiss(
        &self,
        company: &CompanyId,
        id: &str,
    ) -> RepoResult<InvoiceNotification> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE invoice_notification SET dismissed = true
                WHERE id = $thing AND company = $company RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<InvoiceNotification> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Notification {} not found", id)))
    }

    /// Dismiss without deleting when the invoice no longer qualifies, e.g. it
    /// was marked `Effettivo` or lost its due date.
    pub async fn dismiss_for_invoice(&self, invoice: &InvoiceId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE invoice_notification SET dismissed = true WHERE invoice = $invoice")
            .bind(("invoice", invoice.clone()))
            .await?;
        Ok(())
    }

    /// Remove the row entirely when its invoice is deleted
    pub async fn delete_for_invoice(&self, invoice: &InvoiceId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE invoice_notification WHERE invoice = $invoice")
            .bind(("invoice", invoice.clone()))
            .await?;
        Ok(())
    }
}
