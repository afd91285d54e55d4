//! Database Models

// Serde helpers
pub mod serde_helpers;

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
pub use user::{
    Company, CompanyId, CompanyUser, CompanyUserDetail, CompanyUserId, Invitation, InvitationId,
    InvitationStatus, InviteCreate, MembershipUpdate, Role, User, UserId,
};
pub use customer::{Customer, CustomerCreate, CustomerId, CustomerStatus, CustomerUpdate};
pub use deal::{Deal, DealCreate, DealId, DealStage, DealUpdate};
pub use invoice::{
    FlowDirection, Invoice, InvoiceCreate, InvoiceId, InvoiceUpdate, StatoFatturazione,
};
pub use cashflow::{CashflowCreate, CashflowId, CashflowRecord, CashflowUpdate};
pub use financial_item::{
    Category, FinancialItem, FinancialItemCreate, FinancialItemId, FinancialItemUpdate, Section,
    StatementTotals,
};
pub use bank_balance::{BankBalance, BankBalanceCreate, BankBalanceId, BankBalanceUpdate};
pub use reconciliation::{
    BankTransaction, BankTransactionId, MatchStatus, MatchUpdate, ReconciliationSession,
    SessionId, SessionStatus,
};
pub use notification::{InvoiceNotification, NotificationId, NotificationKind};
pub use settings::{AiProvider, AppSettings, EmailProvider, EmailSettings, SettingsId};
