//! Cashflow Record Model
//!
//! A cashflow record is a dated money movement. When linked to an invoice it
//! may omit its own amount and direction and inherit them from the invoice.

use super::invoice::{FlowDirection, Invoice, InvoiceId, StatoFatturazione};
use super::serde_helpers;
use super::CompanyId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Cashflow record ID type
pub type CashflowId = RecordId;

/// Cashflow record matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowRecord {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CashflowId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub invoice: Option<InvoiceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_pagamento: Option<NaiveDate>,
    /// Own amount; `None` means "take it from the linked invoice"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importo: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<FlowDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descrizione: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub stato_fatturazione: StatoFatturazione,
    pub created_at: i64,
}

impl CashflowRecord {
    /// Effective amount: own `importo` when set, otherwise the linked
    /// invoice total. Records with neither count as zero.
    pub fn effective_amount(&self, invoice: Option<&Invoice>) -> Decimal {
        match self.importo {
            Some(v) => v,
            None => invoice.map(|i| i.total()).unwrap_or_default(),
        }
    }

    /// Effective direction: own `tipo` when set, otherwise the linked
    /// invoice direction. Defaults to `Entrata`.
    pub fn effective_tipo(&self, invoice: Option<&Invoice>) -> FlowDirection {
        self.tipo
            .or_else(|| invoice.map(|i| i.tipo))
            .unwrap_or(FlowDirection::Entrata)
    }
}

/// Create cashflow payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowCreate {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub invoice: Option<InvoiceId>,
    pub data_pagamento: Option<NaiveDate>,
    pub importo: Option<Decimal>,
    pub tipo: Option<FlowDirection>,
    pub descrizione: Option<String>,
    pub categoria: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub stato_fatturazione: StatoFatturazione,
}

/// Update cashflow payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashflowUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub invoice: Option<InvoiceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_pagamento: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importo: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<FlowDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descrizione: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stato_fatturazione: Option<StatoFatturazione>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_invoice(flusso: i64, iva: i64, tipo: FlowDirection) -> Invoice {
        Invoice {
            id: Some(RecordId::from_table_key("invoice", "f1")),
            company: RecordId::from_table_key("company", "c1"),
            data: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            data_scadenza: None,
            mese: 3,
            anno: 2026,
            nome_progetto: "P".into(),
            tipo,
            stato_fatturazione: StatoFatturazione::Effettivo,
            spesa: None,
            tipo_spesa: None,
            note: None,
            flusso: Decimal::new(flusso, 2),
            iva: Decimal::new(iva, 2),
            percentuale_iva: 22,
            percentuale_fatturazione: 100,
            checked: false,
            created_at: 0,
        }
    }

    fn sample_record(importo: Option<Decimal>, tipo: Option<FlowDirection>) -> CashflowRecord {
        CashflowRecord {
            id: None,
            company: RecordId::from_table_key("company", "c1"),
            invoice: None,
            data_pagamento: NaiveDate::from_ymd_opt(2026, 3, 5),
            importo,
            tipo,
            descrizione: None,
            categoria: None,
            note: None,
            stato_fatturazione: StatoFatturazione::Nessuno,
            created_at: 0,
        }
    }

    #[test]
    fn test_effective_amount_prefers_own_importo() {
        let inv = sample_invoice(50000, 11000, FlowDirection::Entrata);
        let rec = sample_record(Some(Decimal::new(12345, 2)), None);
        assert_eq!(rec.effective_amount(Some(&inv)), Decimal::new(12345, 2));
    }

    #[test]
    fn test_effective_amount_falls_back_to_invoice_total() {
        let inv = sample_invoice(50000, 11000, FlowDirection::Uscita);
        let rec = sample_record(None, None);
        assert_eq!(rec.effective_amount(Some(&inv)), Decimal::new(61000, 2));
        assert_eq!(rec.effective_tipo(Some(&inv)), FlowDirection::Uscita);
    }

    #[test]
    fn test_effective_defaults_without_invoice() {
        let rec = sample_record(None, None);
        assert_eq!(rec.effective_amount(None), Decimal::ZERO);
        assert_eq!(rec.effective_tipo(None), FlowDirection::Entrata);
    }
}
