//! Deterministic match engine
//!
//! Scores bank transactions against cashflow records. `quick_match` runs at
//! upload time on exact amounts; `suggest_match` is the stricter assisted
//! pipeline behind the suggestion endpoints. All reasons are the Italian
//! strings shown in the client.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;

use crate::billing::{index_invoices, linked_invoice, MONEY_TOLERANCE};
use crate::db::models::{
    serde_helpers, BankTransaction, BankTransactionId, CashflowId, CashflowRecord, Invoice,
    InvoiceId, MatchStatus,
};

/// A suggested amount may differ from the transaction by at most €2
const MAX_SUGGESTION_DIFF: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Pause between transactions in the batch pipeline
const BATCH_PAUSE: Duration = Duration::from_millis(200);

/// Outcome of a match attempt; confidence 0 with both ids unset means no match
#[derive(Debug, Clone, Serialize)]
pub struct MatchSuggestion {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub invoice: Option<InvoiceId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub cashflow: Option<CashflowId>,
    pub confidence: u8,
    pub reason: String,
}

impl MatchSuggestion {
    fn no_match(reason: impl Into<String>) -> Self {
        Self {
            invoice: None,
            cashflow: None,
            confidence: 0,
            reason: reason.into(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.cashflow.is_some()
    }
}

/// Exact-amount match used to pre-score transactions at upload time.
///
/// Candidates are cashflow records of the same effective tipo whose effective
/// amount is within €0.01 of the transaction amount. One candidate scores 80
/// plus bonuses for description and date proximity; several candidates must
/// be disambiguated by description or date or no suggestion is made.
pub fn quick_match(
    tx: &BankTransaction,
    invoices: &[Invoice],
    cashflows: &[CashflowRecord],
) -> Option<MatchSuggestion> {
    let by_id = index_invoices(invoices);

    let candidates: Vec<&CashflowRecord> = cashflows
        .iter()
        .filter(|cf| {
            let invoice = linked_invoice(cf, &by_id);
            cf.effective_tipo(invoice) == tx.tipo
                && (cf.effective_amount(invoice) - tx.importo).abs() < MONEY_TOLERANCE
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }

    if candidates.len() > 1 {
        // Several records share the amount: only an unambiguous description
        // or date signal may pick one
        let desc_matches: Vec<&CashflowRecord> = candidates
            .iter()
            .copied()
            .filter(|cf| candidate_description_match(&tx.descrizione, cf, linked_invoice(cf, &by_id)))
            .collect();
        if desc_matches.len() == 1 {
            return Some(suggestion_for(
                desc_matches[0],
                &by_id,
                95,
                "Corrispondenza esatta di importo e descrizione",
            ));
        }

        let date_matches: Vec<&CashflowRecord> = candidates
            .iter()
            .copied()
            .filter(|cf| {
                cf.data_pagamento
                    .is_some_and(|d| days_between(tx.data, d) <= 7)
            })
            .collect();
        if date_matches.len() == 1 {
            return Some(suggestion_for(
                date_matches[0],
                &by_id,
                85,
                "Corrispondenza di importo e data pagamento vicina",
            ));
        }

        return None;
    }

    let cf = candidates[0];
    let invoice = linked_invoice(cf, &by_id);
    let has_desc = candidate_description_match(&tx.descrizione, cf, invoice);
    let date_close = cf
        .data_pagamento
        .is_some_and(|d| days_between(tx.data, d) <= 30);

    let (confidence, reason) = if has_desc && date_close {
        (95, "Corrispondenza esatta di importo, descrizione e data")
    } else if has_desc {
        (90, "Corrispondenza esatta di importo e descrizione")
    } else if date_close {
        (85, "Corrispondenza esatta di importo e data vicina")
    } else {
        (80, "Corrispondenza esatta dell'importo")
    };

    Some(suggestion_for(cf, &by_id, confidence, reason))
}

/// Assisted pipeline: month prefilter, exact amount, note-word containment.
///
/// Always returns a suggestion; a no-match carries confidence 0 and a reason
/// explaining which movements were available.
pub fn suggest_match(
    tx: &BankTransaction,
    invoices: &[Invoice],
    cashflows: &[CashflowRecord],
) -> MatchSuggestion {
    let by_id = index_invoices(invoices);

    // Same tipo, same month and year. Records without a payment date stay in.
    let prefiltered: Vec<&CashflowRecord> = cashflows
        .iter()
        .filter(|cf| {
            let invoice = linked_invoice(cf, &by_id);
            if cf.effective_tipo(invoice) != tx.tipo {
                return false;
            }
            match cf.data_pagamento {
                None => true,
                Some(d) => d.month() == tx.data.month() && d.year() == tx.data.year(),
            }
        })
        .collect();

    // Amounts must be exactly equal, no tolerance
    let amount_matched: Vec<&CashflowRecord> = prefiltered
        .into_iter()
        .filter(|cf| {
            let invoice = linked_invoice(cf, &by_id);
            cf.effective_amount(invoice) == tx.importo
        })
        .collect();

    if amount_matched.is_empty() {
        return MatchSuggestion::no_match("Nessun movimento disponibile dopo i filtri.");
    }

    // A note word (> 3 alphabetic chars) must appear in the description
    let description = tx.descrizione.to_lowercase();
    let mut survivor: Option<(&CashflowRecord, String)> = None;
    for cf in &amount_matched {
        let invoice = linked_invoice(cf, &by_id);
        if let Some(word) = matching_note_word(&description, cf, invoice) {
            survivor = Some((cf, word));
            break;
        }
    }

    let Some((cf, word)) = survivor else {
        let available = available_note_labels(&amount_matched, &by_id);
        return MatchSuggestion::no_match(format!(
            "Nessuna corrispondenza trovata (movimenti disponibili: {})",
            available
        ));
    };

    let suggestion = MatchSuggestion {
        // The invoice id always comes from the matched cashflow
        invoice: cf.invoice.clone(),
        cashflow: cf.id.clone(),
        confidence: 95,
        reason: format!("Match: {} trovato in note", word.to_uppercase()),
    };

    verify_suggestion(suggestion, tx, &by_id, cashflows)
}

/// Walk pending transactions sequentially, pausing between each.
///
/// Transactions already matched, manually matched or ignored keep their
/// state and are skipped.
pub async fn suggest_matches_batch(
    transactions: &[BankTransaction],
    invoices: &[Invoice],
    cashflows: &[CashflowRecord],
) -> Vec<(BankTransactionId, MatchSuggestion)> {
    let mut results = Vec::new();

    for (i, tx) in transactions.iter().enumerate() {
        if tx.match_status != MatchStatus::Pending {
            continue;
        }
        let Some(id) = tx.id.clone() else {
            continue;
        };

        results.push((id, suggest_match(tx, invoices, cashflows)));

        if i < transactions.len() - 1 {
            tokio::time::sleep(BATCH_PAUSE).await;
        }
    }

    results
}

/// Reject suggestions whose amount drifted past €2 and clamp confidence.
///
/// The exact-equality filter upstream makes the rejection rare; the guard
/// protects manual calls that bypass the pipeline.
fn verify_suggestion(
    mut suggestion: MatchSuggestion,
    tx: &BankTransaction,
    by_id: &std::collections::HashMap<String, &Invoice>,
    cashflows: &[CashflowRecord],
) -> MatchSuggestion {
    let Some(cashflow_id) = &suggestion.cashflow else {
        return suggestion;
    };

    let matched = cashflows
        .iter()
        .find(|cf| cf.id.as_ref() == Some(cashflow_id));
    if let Some(cf) = matched {
        let invoice = linked_invoice(cf, by_id);
        let cf_amount = cf.effective_amount(invoice);
        let diff = (cf_amount - tx.importo).abs();
        if diff > MAX_SUGGESTION_DIFF {
            return MatchSuggestion::no_match(format!(
                "Match respinto: importi non corrispondenti (transazione €{:.2} vs movimento €{:.2}, diff €{:.2})",
                tx.importo, cf_amount, diff
            ));
        }
    }

    suggestion.confidence = suggestion.confidence.min(100);
    suggestion
}

fn suggestion_for(
    cf: &CashflowRecord,
    by_id: &std::collections::HashMap<String, &Invoice>,
    confidence: u8,
    reason: &str,
) -> MatchSuggestion {
    let invoice = linked_invoice(cf, by_id);
    MatchSuggestion {
        invoice: invoice.and_then(|i| i.id.clone()),
        cashflow: cf.id.clone(),
        confidence,
        reason: reason.to_string(),
    }
}

/// Significant-word containment in either direction, over the cashflow note
/// or the linked invoice note
fn candidate_description_match(
    description: &str,
    cf: &CashflowRecord,
    invoice: Option<&Invoice>,
) -> bool {
    has_description_match(description, cf.note.as_deref())
        || invoice.is_some_and(|i| has_description_match(description, i.note.as_deref()))
}

fn has_description_match(description: &str, notes: Option<&str>) -> bool {
    let Some(notes) = notes else {
        return false;
    };
    if description.is_empty() || notes.is_empty() {
        return false;
    }

    let desc = description.to_lowercase();
    let notes = notes.to_lowercase();
    let desc_words: Vec<&str> = desc
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect();
    let note_words: Vec<&str> = notes
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect();

    desc_words
        .iter()
        .any(|dw| note_words.iter().any(|nw| nw.contains(dw) || dw.contains(nw)))
}

/// First note word (> 3 chars, alphabetic only) contained in the lowercased
/// transaction description. Notes are split on whitespace and asterisks.
fn matching_note_word(
    description: &str,
    cf: &CashflowRecord,
    invoice: Option<&Invoice>,
) -> Option<String> {
    let note_movimento = cf.note.as_deref().unwrap_or("").to_lowercase();
    let note_fattura = invoice
        .and_then(|i| i.note.as_deref())
        .unwrap_or("")
        .to_lowercase();
    let all_notes = format!("{} {}", note_movimento, note_fattura);

    all_notes
        .split(|c: char| c.is_whitespace() || c == '*')
        .filter(|w| w.chars().count() > 3 && w.chars().all(|c| c.is_ascii_alphabetic()))
        .find(|w| description.contains(w))
        .map(|w| w.to_string())
}

/// Up to three distinct note labels for the "no correspondence" reason
fn available_note_labels(
    candidates: &[&CashflowRecord],
    by_id: &std::collections::HashMap<String, &Invoice>,
) -> String {
    let mut labels: Vec<String> = Vec::new();
    for cf in candidates {
        let invoice = linked_invoice(cf, by_id);
        let label = cf
            .note
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                invoice
                    .and_then(|i| i.note.clone())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| "(nessuna nota)".to_string());
        if !labels.contains(&label) {
            labels.push(label);
            if labels.len() == 3 {
                break;
            }
        }
    }
    labels.join(", ")
}

fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}
