//! Session reports
//!
//! Pure aggregation over one session's transactions and the company's
//! cashflow records: difference totals with anomaly detection, the
//! side-by-side comparison rows and the unmatched listing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::billing::{index_invoices, linked_invoice, MONEY_TOLERANCE};
use crate::db::models::{
    serde_helpers, BankTransaction, CashflowId, CashflowRecord, FlowDirection, Invoice, InvoiceId,
    MatchStatus, ReconciliationSession,
};

/// Cashflow notes that mark a record as auto-created by reconciliation
const AUTO_CREATED_MARKER: &str = "da riconciliazione";

/// Anomaly classification in the difference report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    NoBankTransaction,
    AmountMismatch,
}

/// Invoice-linked cashflow that disagrees with the bank statement
#[derive(Debug, Clone, Serialize)]
pub struct Anomaly {
    #[serde(with = "serde_helpers::record_id")]
    pub invoice: InvoiceId,
    pub cashflow_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_transaction_amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub message: String,
}

/// Bank totals against cashflow totals over the session period
#[derive(Debug, Clone, Serialize)]
pub struct DifferenceReport {
    pub total_bank_entrate: Decimal,
    pub total_bank_uscite: Decimal,
    pub total_bank_net: Decimal,
    pub total_cashflow_entrate: Decimal,
    pub total_cashflow_uscite: Decimal,
    pub total_cashflow_net: Decimal,
    pub difference_entrate: Decimal,
    pub difference_uscite: Decimal,
    pub difference_net: Decimal,
    pub matched_count: usize,
    pub unmatched_bank_count: usize,
    pub unmatched_cashflow_count: usize,
    pub reconciliation_percentage: f64,
    pub anomalies: Vec<Anomaly>,
}

/// Row state in the side-by-side comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowStatus {
    Matched,
    BankOnly,
    Unmatched,
    CashflowOnly,
}

/// One comparison row: a bank transaction, a cashflow record, or both
#[derive(Debug, Clone, Serialize)]
pub struct SideBySideRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_transaction: Option<BankTransaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashflow: Option<CashflowRecord>,
    pub match_status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

/// Pending transactions and unreferenced cashflows
#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedData {
    pub unmatched_bank_transactions: Vec<BankTransaction>,
    pub unmatched_cashflows: Vec<CashflowRecord>,
}

/// Build the difference report for one session.
///
/// Ignored transactions are excluded from the bank totals; cashflow totals
/// cover records whose payment date falls inside the session period.
pub fn difference_report(
    session: &ReconciliationSession,
    transactions: &[BankTransaction],
    cashflows: &[CashflowRecord],
    invoices: &[Invoice],
) -> DifferenceReport {
    let by_id = index_invoices(invoices);
    let in_period = cashflows_in_period(cashflows, session.periodo_dal, session.periodo_al);

    let mut bank_entrate = Decimal::ZERO;
    let mut bank_uscite = Decimal::ZERO;
    for tx in transactions {
        if tx.match_status == MatchStatus::Ignored {
            continue;
        }
        match tx.tipo {
            FlowDirection::Entrata => bank_entrate += tx.importo,
            FlowDirection::Uscita => bank_uscite += tx.importo,
        }
    }

    let mut cashflow_entrate = Decimal::ZERO;
    let mut cashflow_uscite = Decimal::ZERO;
    for cf in &in_period {
        let invoice = linked_invoice(cf, &by_id);
        let amount = cf.effective_amount(invoice);
        match cf.effective_tipo(invoice) {
            FlowDirection::Entrata => cashflow_entrate += amount,
            FlowDirection::Uscita => cashflow_uscite += amount,
        }
    }

    let matched_count = transactions
        .iter()
        .filter(|tx| tx.match_status.is_reconciled())
        .count();
    let unmatched_bank_count = transactions
        .iter()
        .filter(|tx| tx.match_status == MatchStatus::Pending)
        .count();

    let referenced = referenced_cashflow_ids(transactions);
    let unmatched_cashflow_count = in_period
        .iter()
        .filter(|cf| !is_referenced(cf, &referenced))
        .count();

    let total = transactions.len() + in_period.len();
    let reconciliation_percentage = if total > 0 {
        (matched_count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let anomalies = detect_anomalies(&in_period, transactions, &by_id);

    DifferenceReport {
        total_bank_entrate: bank_entrate,
        total_bank_uscite: bank_uscite,
        total_bank_net: bank_entrate - bank_uscite,
        total_cashflow_entrate: cashflow_entrate,
        total_cashflow_uscite: cashflow_uscite,
        total_cashflow_net: cashflow_entrate - cashflow_uscite,
        difference_entrate: bank_entrate - cashflow_entrate,
        difference_uscite: bank_uscite - cashflow_uscite,
        difference_net: (bank_entrate - bank_uscite) - (cashflow_entrate - cashflow_uscite),
        matched_count,
        unmatched_bank_count,
        unmatched_cashflow_count,
        reconciliation_percentage,
        anomalies,
    }
}

/// Matched pairs, bank-only rows and cashflow-only rows, date descending.
/// Ignored transactions are dropped entirely.
pub fn side_by_side(
    session: &ReconciliationSession,
    transactions: &[BankTransaction],
    cashflows: &[CashflowRecord],
) -> Vec<SideBySideRow> {
    let in_period = cashflows_in_period(cashflows, session.periodo_dal, session.periodo_al);

    let mut rows: Vec<SideBySideRow> = Vec::new();
    let mut processed: HashSet<String> = HashSet::new();

    for tx in transactions {
        if let Some(cf_id) = &tx.matched_cashflow {
            let matched = in_period.iter().find(|cf| cf.id.as_ref() == Some(cf_id));
            if let Some(cf) = matched {
                processed.insert(cf_id.to_string());
                rows.push(SideBySideRow {
                    bank_transaction: Some(tx.clone()),
                    cashflow: Some((*cf).clone()),
                    match_status: RowStatus::Matched,
                    confidence: tx.match_confidence,
                });
            } else {
                rows.push(SideBySideRow {
                    bank_transaction: Some(tx.clone()),
                    cashflow: None,
                    match_status: RowStatus::BankOnly,
                    confidence: None,
                });
            }
        } else if tx.match_status == MatchStatus::Pending {
            rows.push(SideBySideRow {
                bank_transaction: Some(tx.clone()),
                cashflow: None,
                match_status: RowStatus::Unmatched,
                confidence: None,
            });
        } else if tx.match_status == MatchStatus::Ignored {
            continue;
        } else {
            rows.push(SideBySideRow {
                bank_transaction: Some(tx.clone()),
                cashflow: None,
                match_status: RowStatus::BankOnly,
                confidence: None,
            });
        }
    }

    for cf in &in_period {
        let id = cf.id.as_ref().map(|i| i.to_string()).unwrap_or_default();
        if !processed.contains(&id) {
            rows.push(SideBySideRow {
                bank_transaction: None,
                cashflow: Some((*cf).clone()),
                match_status: RowStatus::CashflowOnly,
                confidence: None,
            });
        }
    }

    rows.sort_by(|a, b| row_date(b).cmp(&row_date(a)));
    rows
}

/// Pending transactions plus cashflows in the period that no non-ignored
/// transaction references
pub fn unmatched_data(
    session: &ReconciliationSession,
    transactions: &[BankTransaction],
    cashflows: &[CashflowRecord],
) -> UnmatchedData {
    let in_period = cashflows_in_period(cashflows, session.periodo_dal, session.periodo_al);
    let referenced = referenced_cashflow_ids(transactions);

    UnmatchedData {
        unmatched_bank_transactions: transactions
            .iter()
            .filter(|tx| tx.match_status == MatchStatus::Pending)
            .cloned()
            .collect(),
        unmatched_cashflows: in_period
            .iter()
            .filter(|cf| !is_referenced(cf, &referenced))
            .map(|cf| (*cf).clone())
            .collect(),
    }
}

/// Auto-created cashflows missing their invoice link, paired with the invoice
/// the referencing bank transaction points at
pub fn orphan_invoice_links(
    cashflows: &[CashflowRecord],
    transactions: &[BankTransaction],
) -> Vec<(CashflowId, InvoiceId)> {
    let mut links = Vec::new();

    for cf in cashflows {
        if cf.invoice.is_some() {
            continue;
        }
        let auto_created = cf
            .note
            .as_deref()
            .is_some_and(|n| n.contains(AUTO_CREATED_MARKER));
        if !auto_created {
            continue;
        }
        let Some(cf_id) = &cf.id else {
            continue;
        };

        let referencing = transactions
            .iter()
            .find(|tx| tx.matched_cashflow.as_ref() == Some(cf_id));
        if let Some(invoice_id) = referencing.and_then(|tx| tx.matched_invoice.clone()) {
            links.push((cf_id.clone(), invoice_id));
        }
    }

    links
}

/// Italian currency rendering: 1234.56 -> "1.234,56 €"
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let formatted = format!("{:.2}", rounded.abs());
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some(parts) => parts,
        None => (formatted.as_str(), "00"),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{},{} €", sign, grouped, dec_part)
}

fn detect_anomalies(
    in_period: &[&CashflowRecord],
    transactions: &[BankTransaction],
    by_id: &HashMap<String, &Invoice>,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for cf in in_period {
        // Standalone cashflows cannot disagree with an invoice
        let Some(invoice) = linked_invoice(cf, by_id) else {
            continue;
        };
        let Some(invoice_id) = invoice.id.clone() else {
            continue;
        };

        let cashflow_amount = cf.effective_amount(Some(invoice));
        let matched_tx = transactions.iter().find(|tx| {
            tx.matched_invoice.as_ref() == Some(&invoice_id)
                && tx.match_status != MatchStatus::Ignored
        });

        match matched_tx {
            None => anomalies.push(Anomaly {
                invoice: invoice_id,
                cashflow_amount,
                bank_transaction_amount: None,
                kind: AnomalyKind::NoBankTransaction,
                message: format!(
                    "Movimento registrato ({}) ma nessuna transazione bancaria trovata nel periodo",
                    format_currency(cashflow_amount)
                ),
            }),
            Some(tx) if (tx.importo - cashflow_amount).abs() > MONEY_TOLERANCE => {
                anomalies.push(Anomaly {
                    invoice: invoice_id,
                    cashflow_amount,
                    bank_transaction_amount: Some(tx.importo),
                    kind: AnomalyKind::AmountMismatch,
                    message: format!(
                        "Discrepanza: registrato {} ma nella banca {}",
                        format_currency(cashflow_amount),
                        format_currency(tx.importo)
                    ),
                });
            }
            Some(_) => {}
        }
    }

    anomalies
}

/// Records whose payment date falls inside the session period; both bounds
/// are required, records without a date stay out
fn cashflows_in_period(
    cashflows: &[CashflowRecord],
    dal: Option<NaiveDate>,
    al: Option<NaiveDate>,
) -> Vec<&CashflowRecord> {
    let (Some(dal), Some(al)) = (dal, al) else {
        return Vec::new();
    };

    cashflows
        .iter()
        .filter(|cf| {
            cf.data_pagamento
                .is_some_and(|d| d >= dal && d <= al)
        })
        .collect()
}

/// Cashflow ids referenced by a non-ignored transaction
fn referenced_cashflow_ids(transactions: &[BankTransaction]) -> HashSet<String> {
    transactions
        .iter()
        .filter(|tx| tx.match_status != MatchStatus::Ignored)
        .filter_map(|tx| tx.matched_cashflow.as_ref().map(|id| id.to_string()))
        .collect()
}

fn is_referenced(cf: &CashflowRecord, referenced: &HashSet<String>) -> bool {
    cf.id
        .as_ref()
        .is_some_and(|id| referenced.contains(&id.to_string()))
}

fn row_date(row: &SideBySideRow) -> Option<NaiveDate> {
    row.bank_transaction
        .as_ref()
        .map(|tx| tx.data)
        .or_else(|| row.cashflow.as_ref().and_then(|cf| cf.data_pagamento))
}
