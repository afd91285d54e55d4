//! Bank Balance Model
//!
//! Periodic bank balance snapshots, one row per statement date.

use super::serde_helpers;
use super::CompanyId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Bank balance ID type
pub type BankBalanceId = RecordId;

/// Bank balance snapshot matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankBalance {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<BankBalanceId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    pub data: NaiveDate,
    pub saldo: Decimal,
    /// Account label when the company tracks more than one account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: i64,
}

/// Create bank balance payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankBalanceCreate {
    pub data: NaiveDate,
    pub saldo: Decimal,
    pub conto: Option<String>,
    pub note: Option<String>,
}

/// Update bank balance payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankBalanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saldo: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
