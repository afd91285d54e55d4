//! Bank statement CSV parsing
//!
//! Handles the CSV exports produced by Italian home banking portals
//! (Crédit Agricole layout by default): a few metadata rows, a labelled
//! header row, then one transaction per line. Dates and amounts arrive in
//! mixed Italian and English notations.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::db::models::FlowDirection;
use crate::utils::{AppError, ErrorCode};

/// Italian month names for the `periodo` label
const MESI: [&str; 12] = [
    "Gennaio",
    "Febbraio",
    "Marzo",
    "Aprile",
    "Maggio",
    "Giugno",
    "Luglio",
    "Agosto",
    "Settembre",
    "Ottobre",
    "Novembre",
    "Dicembre",
];

/// Metadata rows are only expected near the top of the file
const METADATA_SCAN_ROWS: usize = 10;

/// The labelled header must appear within the first rows
const HEADER_SCAN_ROWS: usize = 15;

/// Parsing stops after this many consecutive empty rows
const MAX_EMPTY_ROWS: usize = 3;

/// Everything extracted from one statement file
#[derive(Debug, Clone, Default)]
pub struct ParsedStatement {
    pub numero_conto: Option<String>,
    pub saldo_iniziale: Option<Decimal>,
    pub saldo_finale: Option<Decimal>,
    pub periodo_dal: Option<NaiveDate>,
    pub periodo_al: Option<NaiveDate>,
    pub transactions: Vec<ParsedTransaction>,
}

/// One statement line; `importo` is the absolute value, the sign lives in `tipo`
#[derive(Debug, Clone)]
pub struct ParsedTransaction {
    pub data: NaiveDate,
    pub data_valuta: Option<NaiveDate>,
    pub causale: Option<String>,
    pub descrizione: String,
    pub importo: Decimal,
    pub tipo: FlowDirection,
    pub saldo: Option<Decimal>,
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    data: usize,
    data_valuta: Option<usize>,
    causale: Option<usize>,
    descrizione: Option<usize>,
    importo: usize,
    saldo: Option<usize>,
}

impl Default for ColumnMap {
    /// Crédit Agricole column order, used when no labelled header is found
    fn default() -> Self {
        Self {
            data: 0,
            data_valuta: Some(1),
            causale: Some(2),
            descrizione: Some(3),
            importo: 4,
            saldo: Some(5),
        }
    }
}

#[derive(Debug, Default)]
struct StatementMetadata {
    numero_conto: Option<String>,
    saldo_iniziale: Option<Decimal>,
    saldo_finale: Option<Decimal>,
    periodo_dal: Option<NaiveDate>,
    periodo_al: Option<NaiveDate>,
}

/// Parse a whole statement file
pub fn parse_statement(bytes: &[u8]) -> Result<ParsedStatement, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            AppError::with_message(
                ErrorCode::StatementParseFailed,
                format!("Failed to read CSV statement: {}", e),
            )
        })?;
        rows.push(record);
    }

    let metadata = extract_metadata(&rows);
    let (start, columns) = find_header(&rows);
    let transactions = parse_transactions(&rows, start, columns);

    Ok(ParsedStatement {
        numero_conto: metadata.numero_conto,
        saldo_iniziale: metadata.saldo_iniziale,
        saldo_finale: metadata.saldo_finale,
        periodo_dal: metadata.periodo_dal,
        periodo_al: metadata.periodo_al,
        transactions,
    })
}

/// Render the statement period with Italian month names:
/// "Gennaio 2026" for a single month, "Gennaio - Marzo 2026" for a range
pub fn format_periodo(dal: Option<NaiveDate>, al: Option<NaiveDate>) -> String {
    let month_name = |d: NaiveDate| MESI[d.month0() as usize];
    match (dal, al) {
        (Some(dal), Some(al)) => {
            if dal.month() == al.month() && dal.year() == al.year() {
                format!("{} {}", month_name(dal), dal.year())
            } else {
                format!("{} - {} {}", month_name(dal), month_name(al), al.year())
            }
        }
        (Some(d), None) | (None, Some(d)) => format!("{} {}", month_name(d), d.year()),
        (None, None) => String::new(),
    }
}

/// Accepts DD/MM/YYYY, DD-MM-YYYY and YYYY-MM-DD
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for format in ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    None
}

/// Parse an amount in Italian ("1.234,56") or English ("1,234.56") notation.
///
/// Currency markers and spaces are stripped; parentheses negate. A lone comma
/// counts as a decimal mark only when followed by exactly two digits.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s = strip_currency(raw).to_string();
    if s.is_empty() {
        return None;
    }

    let negative_parens = s.starts_with('(') && s.ends_with(')') && s.len() > 2;
    if negative_parens {
        s = s[1..s.len() - 1].to_string();
    }
    s.retain(|c| c != ' ' && c != '\u{a0}');

    let has_dot = s.contains('.');
    let has_comma = s.contains(',');

    if has_dot && has_comma {
        // The last separator is the decimal mark
        let dot = s.rfind('.').unwrap_or(0);
        let comma = s.rfind(',').unwrap_or(0);
        if comma > dot {
            s = s.replace('.', "").replace(',', ".");
        } else {
            s = s.replace(',', "");
        }
    } else if has_comma {
        let decimal_comma = s
            .rfind(',')
            .map(|i| {
                let tail = &s[i + 1..];
                tail.len() == 2 && tail.chars().all(|c| c.is_ascii_digit())
            })
            .unwrap_or(false);
        if decimal_comma {
            s = s.replace(',', ".");
        } else {
            s = s.replace(',', "");
        }
    }

    let value: Decimal = s.parse().ok()?;
    Some(if negative_parens { -value } else { value })
}

fn strip_currency(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix('€') {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix('€') {
        s = rest.trim_end();
    }
    if s.len() >= 3 && s.is_char_boundary(s.len() - 3) {
        let (head, tail) = s.split_at(s.len() - 3);
        if tail.eq_ignore_ascii_case("eur") {
            s = head.trim_end();
        }
    }
    if s.len() >= 3 && s.is_char_boundary(3) {
        let (head, tail) = s.split_at(3);
        if head.eq_ignore_ascii_case("eur") {
            s = tail.trim_start();
        }
    }
    s
}

/// Scan the leading rows for labelled metadata cells; the value sits in the
/// cell right of its label
fn extract_metadata(rows: &[csv::StringRecord]) -> StatementMetadata {
    let mut metadata = StatementMetadata::default();

    for row in rows.iter().take(METADATA_SCAN_ROWS) {
        for (i, raw) in row.iter().enumerate() {
            let label = raw.to_lowercase();
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            let next = cell(row, i + 1);

            if label.contains("numero conto") {
                if let Some(v) = next {
                    metadata.numero_conto = Some(v.to_string());
                }
            } else if label.contains("iniziale") {
                if let Some(v) = next.and_then(parse_amount) {
                    metadata.saldo_iniziale = Some(v);
                }
            } else if label.contains("finale") {
                if let Some(v) = next.and_then(parse_amount) {
                    metadata.saldo_finale = Some(v);
                }
            } else if label == "data dal" || label == "dal" {
                if let Some(v) = next.and_then(parse_date) {
                    metadata.periodo_dal = Some(v);
                }
            } else if label == "data al" || label == "al" {
                if let Some(v) = next.and_then(parse_date) {
                    metadata.periodo_al = Some(v);
                }
            }
        }
    }

    metadata
}

/// Find the header row by counting known column labels; three or more make a
/// header. Returns the first transaction row index and the column map.
fn find_header(rows: &[csv::StringRecord]) -> (usize, ColumnMap) {
    for (i, row) in rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        if let Some(columns) = detect_header(row) {
            return (i + 1, columns);
        }
    }
    // No labelled header: assume the default layout and scan from the top.
    // Metadata rows fall out through the date check.
    (0, ColumnMap::default())
}

fn detect_header(row: &csv::StringRecord) -> Option<ColumnMap> {
    let mut data = None;
    let mut data_valuta = None;
    let mut causale = None;
    let mut descrizione = None;
    let mut importo = None;
    let mut saldo = None;

    for (j, raw) in row.iter().enumerate() {
        let label = raw.to_lowercase();
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        // "data valuta" must win over the plain "data" prefix
        if label.contains("data val") {
            data_valuta.get_or_insert(j);
        } else if label.contains("data") {
            data.get_or_insert(j);
        } else if label.contains("causale") {
            causale.get_or_insert(j);
        } else if label.contains("descrizione") {
            descrizione.get_or_insert(j);
        } else if label.contains("importo") {
            importo.get_or_insert(j);
        } else if label.contains("saldo") {
            saldo.get_or_insert(j);
        }
    }

    let matched = [
        data.is_some(),
        data_valuta.is_some(),
        causale.is_some(),
        descrizione.is_some(),
        importo.is_some(),
        saldo.is_some(),
    ]
    .iter()
    .filter(|found| **found)
    .count();

    if matched < 3 {
        return None;
    }

    let defaults = ColumnMap::default();
    Some(ColumnMap {
        data: data.unwrap_or(defaults.data),
        data_valuta,
        causale,
        descrizione,
        importo: importo.unwrap_or(defaults.importo),
        saldo,
    })
}

fn parse_transactions(
    rows: &[csv::StringRecord],
    start: usize,
    columns: ColumnMap,
) -> Vec<ParsedTransaction> {
    let mut transactions = Vec::new();
    let mut consecutive_empty = 0;

    for row in rows.iter().skip(start) {
        if is_empty_row(row) {
            consecutive_empty += 1;
            if consecutive_empty >= MAX_EMPTY_ROWS {
                break;
            }
            continue;
        }
        consecutive_empty = 0;

        // Rows without a valid date are metadata or footers
        let Some(data) = cell(row, columns.data).and_then(parse_date) else {
            continue;
        };
        let Some(importo) = cell(row, columns.importo).and_then(parse_amount) else {
            continue;
        };
        if importo.is_zero() {
            continue;
        }

        transactions.push(ParsedTransaction {
            data,
            data_valuta: columns
                .data_valuta
                .and_then(|j| cell(row, j))
                .and_then(parse_date),
            causale: columns
                .causale
                .and_then(|j| cell(row, j))
                .map(str::to_string),
            descrizione: columns
                .descrizione
                .and_then(|j| cell(row, j))
                .unwrap_or_default()
                .to_string(),
            importo: importo.abs(),
            tipo: if importo >= Decimal::ZERO {
                FlowDirection::Entrata
            } else {
                FlowDirection::Uscita
            },
            saldo: columns.saldo.and_then(|j| cell(row, j)).and_then(parse_amount),
        });
    }

    transactions
}

fn is_empty_row(row: &csv::StringRecord) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn cell(row: &csv::StringRecord, idx: usize) -> Option<&str> {
    row.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_amount_italian_and_english() {
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("12,34"), Some(dec("12.34")));
        // A comma followed by three digits is a thousands separator
        assert_eq!(parse_amount("1,234"), Some(dec("1234")));
        assert_eq!(parse_amount("-50,00"), Some(dec("-50.00")));
        assert_eq!(parse_amount("(100,00)"), Some(dec("-100.00")));
    }

    #[test]
    fn test_parse_amount_currency_markers() {
        assert_eq!(parse_amount("€ 50,00"), Some(dec("50.00")));
        assert_eq!(parse_amount("50,00 €"), Some(dec("50.00")));
        assert_eq!(parse_amount("EUR 10.50"), Some(dec("10.50")));
        assert_eq!(parse_amount("10.50 eur"), Some(dec("10.50")));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(parse_date("10/01/2026"), Some(expected));
        assert_eq!(parse_date("10-01-2026"), Some(expected));
        assert_eq!(parse_date("2026-01-10"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_format_periodo() {
        let r#gen = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mar = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        assert_eq!(format_periodo(Some(r#gen), Some(r#gen)), "Gennaio 2026");
        assert_eq!(format_periodo(Some(r#gen), Some(mar)), "Gennaio - Marzo 2026");
        assert_eq!(format_periodo(Some(r#gen), None), "Gennaio 2026");
        assert_eq!(format_periodo(None, None), "");
    }

    #[test]
    fn test_parse_statement_with_metadata_and_header() {
        let csv = "\
Numero Conto,IT00X0000000000000000000000,,,,
Saldo Iniziale,\"1.000,00\",,,,
Data Dal,01/01/2026,Data Al,31/01/2026,,
Data,Data Valuta,Causale,Descrizione,Importo,Saldo
10/01/2026,10/01/2026,Bonifico,Pagamento fattura,\"1.220,00\",\"2.220,00\"
12/01/2026,13/01/2026,Addebito,Canone mensile,\"-50,00\",\"2.170,00\"
";
        let parsed = parse_statement(csv.as_bytes()).unwrap();
        assert_eq!(
            parsed.numero_conto.as_deref(),
            Some("IT00X0000000000000000000000")
        );
        assert_eq!(parsed.saldo_iniziale, Some(dec("1000.00")));
        assert_eq!(
            parsed.periodo_dal,
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );
        assert_eq!(
            parsed.periodo_al,
            NaiveDate::from_ymd_opt(2026, 1, 31)
        );

        assert_eq!(parsed.transactions.len(), 2);
        let first = &parsed.transactions[0];
        assert_eq!(first.importo, dec("1220.00"));
        assert_eq!(first.tipo, FlowDirection::Entrata);
        assert_eq!(first.descrizione, "Pagamento fattura");
        let second = &parsed.transactions[1];
        assert_eq!(second.importo, dec("50.00"));
        assert_eq!(second.tipo, FlowDirection::Uscita);
    }

    #[test]
    fn test_parse_statement_without_header_uses_default_layout() {
        let csv = "\
10/01/2026,10/01/2026,Bonifico,Pagamento,\"100,00\",\"100,00\"
";
        let parsed = parse_statement(csv.as_bytes()).unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.transactions[0].importo, dec("100.00"));
    }

    #[test]
    fn test_zero_amount_rows_are_skipped() {
        let csv = "\
Data,Descrizione,Importo
10/01/2026,Storno,\"0,00\"
11/01/2026,Vero,\"5,00\"
";
        let parsed = parse_statement(csv.as_bytes()).unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.transactions[0].importo, dec("5.00"));
    }
}
