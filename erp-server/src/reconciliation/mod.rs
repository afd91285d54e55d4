//! Bank Reconciliation
//!
//! Statement parsing, the deterministic match engine and the session
//! reports. Everything here is pure; persistence lives in
//! [`crate::db::repository::ReconciliationRepository`].

pub mod matching;
pub mod report;
pub mod statement;

pub use matching::{quick_match, suggest_match, suggest_matches_batch, MatchSuggestion};
pub use report::{
    difference_report, format_currency, orphan_invoice_links, side_by_side, unmatched_data,
    DifferenceReport, SideBySideRow, UnmatchedData,
};
pub use statement::{format_periodo, parse_statement, ParsedStatement, ParsedTransaction};
