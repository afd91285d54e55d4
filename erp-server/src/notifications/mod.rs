//! Invoice Due-Date Notifications
//!
//! A background scan keeps one `invoice_notification` row per invoice that
//! has a due date and is still `Stimato`: `da_pagare` while the due date is
//! within the lookahead window, upgraded in place to `scaduta` once it
//! passes. Notifications for invoices that stopped qualifying are dismissed,
//! never deleted, so a manual dismissal survives later scans.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::MissedTickBehavior;

use crate::core::ServerState;
use crate::db::models::{CompanyId, InvoiceNotification, NotificationKind};
use crate::db::repository::{
    InvoiceRepository, NotificationRepository, RepoResult, SettingsRepository, UserRepository,
};
use crate::utils::time::{days_between, now_millis, today};

/// Days ahead of the due date at which a `da_pagare` alert appears
const DUE_SOON_DAYS: i64 = 7;

/// The scheduler ticks once a minute; each company runs on its own
/// configured multiple of that tick
const TICK: Duration = Duration::from_secs(60);

/// Classify an invoice due date against a reference day
pub fn classify_due_date(due: NaiveDate, reference: NaiveDate) -> Option<NotificationKind> {
    if due < reference {
        return Some(NotificationKind::Scaduta);
    }
    if days_between(reference, due) <= DUE_SOON_DAYS {
        return Some(NotificationKind::DaPagare);
    }
    None
}

/// Run the due-date scan for one company.
///
/// Upserts a notification for every qualifying invoice and dismisses rows
/// whose invoice no longer qualifies. Returns how many invoices currently
/// carry an alert condition.
pub async fn scan_company(state: &ServerState, company: &CompanyId) -> RepoResult<usize> {
    let invoice_repo = InvoiceRepository::new(state.get_db());
    let notification_repo = NotificationRepository::new(state.get_db());

    let reference = today();
    let due_invoices = invoice_repo.find_due(company).await?;

    let mut alerted_ids = Vec::new();
    for invoice in &due_invoices {
        let (Some(id), Some(due)) = (invoice.id.clone(), invoice.data_scadenza) else {
            continue;
        };
        let Some(kind) = classify_due_date(due, reference) else {
            continue;
        };

        notification_repo
            .upsert(InvoiceNotification {
                id: None,
                company: company.clone(),
                invoice: id.clone(),
                tipo: kind,
                data_scadenza: due,
                dismissed: false,
                created_at: now_millis(),
            })
            .await?;
        alerted_ids.push(id.to_string());
    }

    // Open notifications whose invoice fell out of the scan (paid, due date
    // cleared, deleted) are dismissed in place
    for notification in notification_repo.list_open(company).await? {
        if !alerted_ids.contains(&notification.invoice.to_string()) {
            notification_repo
                .dismiss_for_invoice(&notification.invoice)
                .await?;
        }
    }

    Ok(alerted_ids.len())
}

/// Spawn the periodic due-date scanner.
///
/// Ticks every minute; a company is scanned when the elapsed minute count
/// is a multiple of its `notification_refresh_interval` (1, 3 or 5). The
/// first tick scans everything so alerts are current right after startup.
/// The task stops when the state's cancellation token fires.
pub fn spawn_scheduler(state: ServerState) {
    tokio::spawn(async move {
        let shutdown = state.shutdown.clone();
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut minutes: u64 = 0;

        tracing::info!("Notification scheduler started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Notification scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    run_due_scans(&state, minutes).await;
                    minutes += 1;
                }
            }
        }
    });
}

/// Scan every company whose refresh interval divides the elapsed minutes
async fn run_due_scans(state: &ServerState, minutes: u64) {
    let user_repo = UserRepository::new(state.get_db());
    let settings_repo = SettingsRepository::new(state.get_db());

    let companies = match user_repo.list_companies().await {
        Ok(companies) => companies,
        Err(e) => {
            tracing::warn!(error = %e, "Notification scan could not list companies");
            return;
        }
    };

    for company in companies {
        let Some(company_id) = company.id else {
            continue;
        };

        let interval = match settings_repo.app_settings(&company_id).await {
            Ok(settings) => u64::from(settings.notification_refresh_interval.max(1)),
            Err(e) => {
                tracing::warn!(company = %company_id, error = %e, "Falling back to default refresh interval");
                5
            }
        };
        if minutes % interval != 0 {
            continue;
        }

        match scan_company(state, &company_id).await {
            Ok(open) => {
                tracing::debug!(company = %company_id, open, "Due-date scan completed");
            }
            Err(e) => {
                tracing::warn!(company = %company_id, error = %e, "Due-date scan failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overdue_is_scaduta() {
        let reference = date(2026, 3, 15);
        assert_eq!(
            classify_due_date(date(2026, 3, 14), reference),
            Some(NotificationKind::Scaduta)
        );
    }

    #[test]
    fn test_within_window_is_da_pagare() {
        let reference = date(2026, 3, 15);
        assert_eq!(
            classify_due_date(date(2026, 3, 15), reference),
            Some(NotificationKind::DaPagare)
        );
        assert_eq!(
            classify_due_date(date(2026, 3, 22), reference),
            Some(NotificationKind::DaPagare)
        );
    }

    #[test]
    fn test_far_future_not_alerted() {
        let reference = date(2026, 3, 15);
        assert_eq!(classify_due_date(date(2026, 3, 23), reference), None);
        assert_eq!(classify_due_date(date(2026, 6, 1), reference), None);
    }
}
