//! Financial Statement Item Model
//!
//! Line items of the bilancio. Every category belongs to exactly one
//! section; writes that pair a category with the wrong section are rejected.

use super::serde_helpers;
use super::CompanyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Financial statement item ID type
pub type FinancialItemId = RecordId;

/// Statement sections, matching the Italian civil-code layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Stato Patrimoniale")]
    StatoPatrimoniale,
    #[serde(rename = "Conto Economico")]
    ContoEconomico,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::StatoPatrimoniale => "Stato Patrimoniale",
            Section::ContoEconomico => "Conto Economico",
        }
    }
}

/// Statement categories, each tied to a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Attivo,
    Passivo,
    #[serde(rename = "Valore della Produzione")]
    ValoreDellaProduzione,
    #[serde(rename = "Costi della Produzione")]
    CostiDellaProduzione,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Attivo => "Attivo",
            Category::Passivo => "Passivo",
            Category::ValoreDellaProduzione => "Valore della Produzione",
            Category::CostiDellaProduzione => "Costi della Produzione",
        }
    }

    /// The section this category belongs to
    pub fn section(&self) -> Section {
        match self {
            Category::Attivo | Category::Passivo => Section::StatoPatrimoniale,
            Category::ValoreDellaProduzione | Category::CostiDellaProduzione => {
                Section::ContoEconomico
            }
        }
    }
}

/// Financial statement line item matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<FinancialItemId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    pub name: String,
    pub section: Section,
    pub category: Category,
    #[serde(default)]
    pub amount: Decimal,
    pub created_at: i64,
}

/// Aggregated statement view: balance sheet and income statement totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementTotals {
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    /// assets minus liabilities; zero when the sheet balances
    pub equity_gap: Decimal,
    pub production_value: Decimal,
    pub production_costs: Decimal,
    /// A - B of the conto economico
    pub operating_result: Decimal,
}

impl StatementTotals {
    pub fn compute(items: &[FinancialItem]) -> Self {
        let mut totals = StatementTotals::default();
        for item in items {
            match item.category {
                Category::Attivo => totals.total_assets += item.amount,
                Category::Passivo => totals.total_liabilities += item.amount,
                Category::ValoreDellaProduzione => totals.production_value += item.amount,
                Category::CostiDellaProduzione => totals.production_costs += item.amount,
            }
        }
        totals.equity_gap = totals.total_assets - totals.total_liabilities;
        totals.operating_result = totals.production_value - totals.production_costs;
        totals
    }
}

/// Create financial item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialItemCreate {
    pub name: String,
    pub section: Section,
    pub category: Category,
    #[serde(default)]
    pub amount: Decimal,
}

/// Update financial item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: Category, amount: i64) -> FinancialItem {
        FinancialItem {
            id: None,
            company: RecordId::from_table_key("company", "c1"),
            name: "voce".into(),
            section: category.section(),
            category,
            amount: Decimal::new(amount, 2),
            created_at: 0,
        }
    }

    #[test]
    fn test_category_section_pairing() {
        assert_eq!(Category::Attivo.section(), Section::StatoPatrimoniale);
        assert_eq!(Category::Passivo.section(), Section::StatoPatrimoniale);
        assert_eq!(
            Category::ValoreDellaProduzione.section(),
            Section::ContoEconomico
        );
        assert_eq!(
            Category::CostiDellaProduzione.section(),
            Section::ContoEconomico
        );
    }

    #[test]
    fn test_serde_uses_display_labels() {
        assert_eq!(
            serde_json::to_string(&Section::StatoPatrimoniale).unwrap(),
            "\"Stato Patrimoniale\""
        );
        assert_eq!(
            serde_json::to_string(&Category::ValoreDellaProduzione).unwrap(),
            "\"Valore della Produzione\""
        );
        let c: Category = serde_json::from_str("\"Costi della Produzione\"").unwrap();
        assert_eq!(c, Category::CostiDellaProduzione);
    }

    #[test]
    fn test_statement_totals() {
        let items = vec![
            item(Category::Attivo, 100000),
            item(Category::Attivo, 50000),
            item(Category::Passivo, 120000),
            item(Category::ValoreDellaProduzione, 80000),
            item(Category::CostiDellaProduzione, 30000),
        ];
        let t = StatementTotals::compute(&items);
        assert_eq!(t.total_assets, Decimal::new(150000, 2));
        assert_eq!(t.total_liabilities, Decimal::new(120000, 2));
        assert_eq!(t.equity_gap, Decimal::new(30000, 2));
        assert_eq!(t.production_value, Decimal::new(80000, 2));
        assert_eq!(t.production_costs, Decimal::new(30000, 2));
        assert_eq!(t.operating_result, Decimal::new(50000, 2));
    }
}
