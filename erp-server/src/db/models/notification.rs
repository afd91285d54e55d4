//! Invoice Notification Model
//!
//! One active notification per invoice: `da_pagare` while the due date is
//! close, upgraded in place to `scaduta` once it passes.

use super::invoice::InvoiceId;
use super::serde_helpers;
use super::CompanyId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Notification ID type
pub type NotificationId = RecordId;

/// Notification severity, driven by the invoice due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DaPagare,
    Scaduta,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::DaPagare => "da_pagare",
            NotificationKind::Scaduta => "scaduta",
        }
    }
}

/// Invoice due notification matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceNotification {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<NotificationId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    #[serde(with = "serde_helpers::record_id")]
    pub invoice: InvoiceId,
    pub tipo: NotificationKind,
    pub data_scadenza: NaiveDate,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub dismissed: bool,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&NotificationKind::DaPagare).unwrap(),
            "\"da_pagare\""
        );
        let k: NotificationKind = serde_json::from_str("\"scaduta\"").unwrap();
        assert_eq!(k, NotificationKind::Scaduta);
    }
}
