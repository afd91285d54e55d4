//! Ncode ERP server
//!
//! Multi-tenant back office for small Italian businesses: CRM, invoicing,
//! cashflow, financial statement, bank reconciliation and invoice due-date
//! notifications, served over a JSON HTTP API backed by embedded SurrealDB.
//!
//! # Module layout
//!
//! ```text
//! erp-server/src/
//! ├── core/            # Config, server, shared state
//! ├── auth/            # JWT auth, roles, route guards
//! ├── api/             # HTTP routes and handlers
//! ├── db/              # Models and repositories
//! ├── billing/         # Payment status and yearly aggregates
//! ├── reconciliation/  # Statement parsing, matching, reports
//! ├── notifications/   # Due-date scanner and scheduler
//! ├── services/        # Email gateway client
//! └── utils/           # Errors, validation, time, logging
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod notifications;
pub mod reconciliation;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - events land on the dedicated "security" target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
