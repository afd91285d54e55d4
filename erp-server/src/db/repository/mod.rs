//! Repository Module
//!
//! CRUD operations for SurrealDB tables. Every query is scoped to a
//! company; a record belonging to another company is reported as not
//! found, never as forbidden.

// Tenancy
pub mod user;

// CRM
pub mod customer;
pub mod deal;

// Finance
pub mod bank_balance;
pub mod cashflow;
pub mod financial_item;
pub mod invoice;

// Reconciliation
pub mod reconciliation;

// Notifications & settings
pub mod notification;
pub mod settings;

// Re-exports
pub use bank_balance::BankBalanceRepository;
pub use cashflow::{CashflowFilter, CashflowRepository};
pub use customer::CustomerRepository;
pub use deal::DealRepository;
pub use financial_item::FinancialItemRepository;
pub use invoice::{InvoiceFilter, InvoiceRepository};
pub use notification::NotificationRepository;
pub use reconciliation::{CounterDelta, ReconciliationRepository};
pub use settings::SettingsRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:id" everywhere
// =============================================================================
//
// All IDs go through surrealdb::RecordId:
//   - parse: let id: RecordId = "invoice:abc".parse()?;
//   - build: let id = RecordId::from_table_key("invoice", "abc");
//   - table name: id.table()
//   - bare key: id.key().to_string()
//   - CRUD: db.select(id) / db.delete(id) take a RecordId directly

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Parse a client-supplied ID, rejecting anything that is not `table:key`
pub fn parse_id(id: &str) -> RepoResult<surrealdb::RecordId> {
    id.parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
}
