//! Deal Model (CRM pipeline)

use super::serde_helpers;
use super::CompanyId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Deal ID type
pub type DealId = RecordId;

/// Pipeline stage of a deal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealStage {
    Lead,
    Qualificazione,
    Proposta,
    Negoziazione,
    Vinto,
    Perso,
}

impl Default for DealStage {
    fn default() -> Self {
        DealStage::Lead
    }
}

/// Deal record matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<DealId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    pub title: String,
    pub customer_name: String,
    #[serde(default)]
    pub value: rust_decimal::Decimal,
    #[serde(default)]
    pub stage: DealStage,
    /// Win probability, 0-100
    #[serde(default)]
    pub probability: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close: Option<NaiveDate>,
    pub created_at: i64,
}

/// Create deal payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealCreate {
    pub title: String,
    pub customer_name: String,
    pub value: Option<rust_decimal::Decimal>,
    #[serde(default)]
    pub stage: DealStage,
    pub probability: Option<i64>,
    pub expected_close: Option<NaiveDate>,
}

/// Update deal payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<rust_decimal::Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<DealStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close: Option<NaiveDate>,
}
