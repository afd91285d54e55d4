//! Invoice Model
//!
//! Invoices carry the estimated/actual billing state and the VAT split;
//! the invoice total is always `flusso + iva`.

use super::serde_helpers;
use super::CompanyId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Invoice ID type
pub type InvoiceId = RecordId;

/// Money flow direction, shared by invoices, cashflow records and bank
/// transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowDirection {
    Entrata,
    Uscita,
}

impl FlowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowDirection::Entrata => "Entrata",
            FlowDirection::Uscita => "Uscita",
        }
    }
}

/// Billing state of an invoice or cashflow record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatoFatturazione {
    Stimato,
    Effettivo,
    Nessuno,
}

impl Default for StatoFatturazione {
    fn default() -> Self {
        StatoFatturazione::Stimato
    }
}

/// Invoice record matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<InvoiceId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    /// Document date
    pub data: NaiveDate,
    /// Due date; drives the payment notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_scadenza: Option<NaiveDate>,
    /// Accounting month (1-12) and year the invoice belongs to
    pub mese: u32,
    pub anno: i32,
    pub nome_progetto: String,
    pub tipo: FlowDirection,
    #[serde(default)]
    pub stato_fatturazione: StatoFatturazione,
    /// Expense label, shown in place of the project name for `Uscita` rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spesa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_spesa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Net amount
    #[serde(default)]
    pub flusso: Decimal,
    /// VAT amount
    #[serde(default)]
    pub iva: Decimal,
    #[serde(default)]
    pub percentuale_iva: i64,
    #[serde(default)]
    pub percentuale_fatturazione: i64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub checked: bool,
    pub created_at: i64,
}

impl Invoice {
    /// Gross total: net amount plus VAT
    pub fn total(&self) -> Decimal {
        self.flusso + self.iva
    }
}

/// Create invoice payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreate {
    pub data: NaiveDate,
    pub data_scadenza: Option<NaiveDate>,
    pub mese: u32,
    pub anno: i32,
    pub nome_progetto: String,
    pub tipo: FlowDirection,
    #[serde(default)]
    pub stato_fatturazione: StatoFatturazione,
    pub spesa: Option<String>,
    pub tipo_spesa: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub flusso: Decimal,
    #[serde(default)]
    pub iva: Decimal,
    #[serde(default)]
    pub percentuale_iva: i64,
    #[serde(default = "default_percentuale_fatturazione")]
    pub percentuale_fatturazione: i64,
    #[serde(default)]
    pub checked: bool,
}

fn default_percentuale_fatturazione() -> i64 {
    100
}

/// Update invoice payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_scadenza: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mese: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anno: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome_progetto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<FlowDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stato_fatturazione: Option<StatoFatturazione>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spesa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_spesa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flusso: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iva: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentuale_iva: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentuale_fatturazione: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_total() {
        let inv = Invoice {
            id: None,
            company: RecordId::from_table_key("company", "c1"),
            data: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            data_scadenza: None,
            mese: 1,
            anno: 2026,
            nome_progetto: "Progetto A".into(),
            tipo: FlowDirection::Entrata,
            stato_fatturazione: StatoFatturazione::Stimato,
            spesa: None,
            tipo_spesa: None,
            note: None,
            flusso: Decimal::new(100000, 2), // 1000.00
            iva: Decimal::new(22000, 2),    // 220.00
            percentuale_iva: 22,
            percentuale_fatturazione: 100,
            checked: false,
            created_at: 0,
        };
        assert_eq!(inv.total(), Decimal::new(122000, 2));
    }

    #[test]
    fn test_stato_serde_italian_labels() {
        assert_eq!(
            serde_json::to_string(&StatoFatturazione::Stimato).unwrap(),
            "\"Stimato\""
        );
        assert_eq!(
            serde_json::to_string(&FlowDirection::Uscita).unwrap(),
            "\"Uscita\""
        );
        let s: StatoFatturazione = serde_json::from_str("\"Effettivo\"").unwrap();
        assert_eq!(s, StatoFatturazione::Effettivo);
    }
}
