//! Money calculation utilities using rust_decimal for precision
//!
//! Pure functions over invoices and cashflow records: payment status,
//! effective-amount aggregation, yearly statistics. Everything here takes
//! already-loaded rows; the repositories do the fetching.

use crate::db::models::{CashflowRecord, FlowDirection, Invoice, StatoFatturazione};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Compare two monetary values for equality (within 0.01 tolerance)
#[inline]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

/// Payment state of an invoice, derived from its linked cashflow records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pagato,
    Parziale,
    NonPagato,
}

/// Computed payment figures for one invoice
#[derive(Debug, Clone, Serialize)]
pub struct InvoicePayment {
    pub status: PaymentStatus,
    pub totale_pagato: Decimal,
    pub residuo: Decimal,
}

/// Derive the payment status of an invoice from the cashflow records that
/// link to it. A record without its own `importo` counts as paying the full
/// invoice amount.
pub fn invoice_payment(invoice: &Invoice, linked: &[&CashflowRecord]) -> InvoicePayment {
    let total = invoice.total();
    let totale_pagato: Decimal = linked
        .iter()
        .map(|r| r.importo.unwrap_or(total))
        .sum();

    let status = if totale_pagato >= total - MONEY_TOLERANCE {
        PaymentStatus::Pagato
    } else if totale_pagato > Decimal::ZERO {
        PaymentStatus::Parziale
    } else {
        PaymentStatus::NonPagato
    };

    InvoicePayment {
        status,
        totale_pagato,
        residuo: total - totale_pagato,
    }
}

/// Per-month split of effective cashflow amounts
#[derive(Debug, Clone, Serialize)]
pub struct MonthTotals {
    pub mese: u32,
    pub entrate: Decimal,
    pub uscite: Decimal,
}

/// Yearly cashflow totals: every record whose `data_pagamento` falls in the
/// year contributes its effective amount
#[derive(Debug, Clone, Serialize)]
pub struct CashflowYearTotals {
    pub anno: i32,
    pub total: Decimal,
    pub entrate: Decimal,
    pub uscite: Decimal,
    pub monthly: Vec<MonthTotals>,
}

/// Sum effective amounts for one year, split by tipo and by month.
/// Records without a payment date are excluded.
pub fn cashflow_year_totals(
    anno: i32,
    records: &[CashflowRecord],
    invoices: &[Invoice],
) -> CashflowYearTotals {
    let by_id = index_invoices(invoices);

    let mut entrate = Decimal::ZERO;
    let mut uscite = Decimal::ZERO;
    let mut monthly: Vec<MonthTotals> = (1..=12)
        .map(|mese| MonthTotals {
            mese,
            entrate: Decimal::ZERO,
            uscite: Decimal::ZERO,
        })
        .collect();

    for record in records {
        let Some(date) = record.data_pagamento else {
            continue;
        };
        if date.year() != anno {
            continue;
        }
        let invoice = linked_invoice(record, &by_id);
        let amount = record.effective_amount(invoice);
        let month = date.month() as usize;
        match record.effective_tipo(invoice) {
            FlowDirection::Entrata => {
                entrate += amount;
                monthly[month - 1].entrate += amount;
            }
            FlowDirection::Uscita => {
                uscite += amount;
                monthly[month - 1].uscite += amount;
            }
        }
    }

    CashflowYearTotals {
        anno,
        total: entrate + uscite,
        entrate,
        uscite,
        monthly,
    }
}

/// Count and sum per stato_fatturazione
#[derive(Debug, Clone, Serialize)]
pub struct StatoBreakdown {
    pub stato: StatoFatturazione,
    pub count: u32,
    pub totale: Decimal,
}

/// Count and sum per tipo
#[derive(Debug, Clone, Serialize)]
pub struct TipoBreakdown {
    pub tipo: FlowDirection,
    pub count: u32,
    pub totale: Decimal,
}

/// Yearly invoice statistics with a payment summary
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceYearStats {
    pub anno: i32,
    pub count: u32,
    pub per_stato: Vec<StatoBreakdown>,
    pub per_tipo: Vec<TipoBreakdown>,
    pub pagate: u32,
    pub parziali: u32,
    pub non_pagate: u32,
    pub residuo_totale: Decimal,
}

/// Aggregate one year of invoices. `cashflows` is the full company set; the
/// linkage is resolved here.
pub fn invoice_year_stats(
    anno: i32,
    invoices: &[Invoice],
    cashflows: &[CashflowRecord],
) -> InvoiceYearStats {
    let mut linked: HashMap<String, Vec<&CashflowRecord>> = HashMap::new();
    for record in cashflows {
        if let Some(invoice_id) = &record.invoice {
            linked
                .entry(invoice_id.to_string())
                .or_default()
                .push(record);
        }
    }

    let mut per_stato: Vec<StatoBreakdown> = [
        StatoFatturazione::Stimato,
        StatoFatturazione::Effettivo,
        StatoFatturazione::Nessuno,
    ]
    .into_iter()
    .map(|stato| StatoBreakdown {
        stato,
        count: 0,
        totale: Decimal::ZERO,
    })
    .collect();
    let mut per_tipo: Vec<TipoBreakdown> = [FlowDirection::Entrata, FlowDirection::Uscita]
        .into_iter()
        .map(|tipo| TipoBreakdown {
            tipo,
            count: 0,
            totale: Decimal::ZERO,
        })
        .collect();

    let mut count = 0u32;
    let mut pagate = 0u32;
    let mut parziali = 0u32;
    let mut non_pagate = 0u32;
    let mut residuo_totale = Decimal::ZERO;
    let no_records: Vec<&CashflowRecord> = Vec::new();

    for invoice in invoices.iter().filter(|i| i.anno == anno) {
        count += 1;
        let total = invoice.total();

        for bucket in per_stato.iter_mut() {
            if bucket.stato == invoice.stato_fatturazione {
                bucket.count += 1;
                bucket.totale += total;
            }
        }
        for bucket in per_tipo.iter_mut() {
            if bucket.tipo == invoice.tipo {
                bucket.count += 1;
                bucket.totale += total;
            }
        }

        let records = invoice
            .id
            .as_ref()
            .and_then(|id| linked.get(&id.to_string()))
            .unwrap_or(&no_records);
        let payment = invoice_payment(invoice, records);
        match payment.status {
            PaymentStatus::Pagato => pagate += 1,
            PaymentStatus::Parziale => parziali += 1,
            PaymentStatus::NonPagato => non_pagate += 1,
        }
        if payment.residuo > Decimal::ZERO {
            residuo_totale += payment.residuo;
        }
    }

    InvoiceYearStats {
        anno,
        count,
        per_stato,
        per_tipo,
        pagate,
        parziali,
        non_pagate,
        residuo_totale,
    }
}

/// Index invoices by their string id for linkage lookups
pub fn index_invoices(invoices: &[Invoice]) -> HashMap<String, &Invoice> {
    invoices
        .iter()
        .filter_map(|i| i.id.as_ref().map(|id| (id.to_string(), i)))
        .collect()
}

/// Resolve the invoice a cashflow record links to, if loaded
pub fn linked_invoice<'a>(
    record: &CashflowRecord,
    by_id: &HashMap<String, &'a Invoice>,
) -> Option<&'a Invoice> {
    record
        .invoice
        .as_ref()
        .and_then(|id| by_id.get(&id.to_string()))
        .copied()
}
