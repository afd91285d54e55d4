//! Bank Reconciliation Models
//!
//! A reconciliation session owns the transactions parsed from one bank
//! statement upload. Transactions move through `pending` to `matched`,
//! `manual` or `ignored`; the session keeps running counters so the list
//! view never scans transactions.

use super::cashflow::CashflowId;
use super::invoice::{FlowDirection, InvoiceId};
use super::serde_helpers;
use super::CompanyId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Reconciliation session ID type
pub type SessionId = RecordId;

/// Bank transaction ID type
pub type BankTransactionId = RecordId;

/// Session lifecycle; closed sessions reject every mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Closed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Open
    }
}

/// Match state of a single bank transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Matched,
    Manual,
    Ignored,
}

impl Default for MatchStatus {
    fn default() -> Self {
        MatchStatus::Pending
    }
}

impl MatchStatus {
    /// Matched and manual both count as reconciled
    pub fn is_reconciled(&self) -> bool {
        matches!(self, MatchStatus::Matched | MatchStatus::Manual)
    }
}

/// One statement upload with its running counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationSession {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SessionId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    pub file_name: String,
    pub upload_date: i64,
    /// Human readable statement period, e.g. "01/01/2026 - 31/01/2026"
    pub periodo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodo_dal: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodo_al: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero_conto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saldo_iniziale: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saldo_finale: Option<Decimal>,
    #[serde(default)]
    pub total_transactions: i64,
    #[serde(default)]
    pub matched_count: i64,
    #[serde(default)]
    pub pending_count: i64,
    #[serde(default)]
    pub ignored_count: i64,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_date: Option<i64>,
}

impl ReconciliationSession {
    pub fn is_closed(&self) -> bool {
        self.status == SessionStatus::Closed
    }
}

/// One statement line; `importo` is stored as an absolute value with the
/// sign folded into `tipo`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<BankTransactionId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    #[serde(with = "serde_helpers::record_id")]
    pub session: SessionId,
    pub data: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_valuta: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causale: Option<String>,
    pub descrizione: String,
    pub importo: Decimal,
    pub tipo: FlowDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saldo: Option<Decimal>,
    #[serde(default)]
    pub match_status: MatchStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub matched_invoice: Option<InvoiceId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub matched_cashflow: Option<CashflowId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_confidence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

/// Match fields reset together when a transaction goes back to pending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_status: Option<MatchStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub matched_invoice: Option<InvoiceId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub matched_cashflow: Option<CashflowId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_confidence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Closed).unwrap(),
            "\"closed\""
        );
        assert_eq!(
            serde_json::to_string(&MatchStatus::Pending).unwrap(),
            "\"pending\""
        );
        let s: MatchStatus = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(s, MatchStatus::Manual);
    }

    #[test]
    fn test_reconciled_states() {
        assert!(MatchStatus::Matched.is_reconciled());
        assert!(MatchStatus::Manual.is_reconciled());
        assert!(!MatchStatus::Pending.is_reconciled());
        assert!(!MatchStatus::Ignored.is_reconciled());
    }
}
