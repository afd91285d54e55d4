//! Schema Bootstrap
//!
//! Tables are schemaless; records carry whatever the repositories write.
//! Indexes enforce the few uniqueness rules the application relies on and
//! speed up the per-company scans. Every statement is idempotent so this
//! runs on every startup.

use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const SCHEMA: &str = r#"
-- tenancy
DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
DEFINE INDEX IF NOT EXISTS user_email ON TABLE user FIELDS email UNIQUE;
DEFINE TABLE IF NOT EXISTS company SCHEMALESS;
DEFINE TABLE IF NOT EXISTS company_user SCHEMALESS;
DEFINE INDEX IF NOT EXISTS company_user_pair ON TABLE company_user FIELDS company, user UNIQUE;
DEFINE TABLE IF NOT EXISTS invitation SCHEMALESS;
DEFINE INDEX IF NOT EXISTS invitation_token ON TABLE invitation FIELDS token UNIQUE;
DEFINE INDEX IF NOT EXISTS invitation_company ON TABLE invitation FIELDS company;

-- crm
DEFINE TABLE IF NOT EXISTS customer SCHEMALESS;
DEFINE INDEX IF NOT EXISTS customer_company ON TABLE customer FIELDS company;
DEFINE TABLE IF NOT EXISTS deal SCHEMALESS;
DEFINE INDEX IF NOT EXISTS deal_company ON TABLE deal FIELDS company;

-- finance
DEFINE TABLE IF NOT EXISTS invoice SCHEMALESS;
DEFINE INDEX IF NOT EXISTS invoice_company ON TABLE invoice FIELDS company;
DEFINE TABLE IF NOT EXISTS cashflow SCHEMALESS;
DEFINE INDEX IF NOT EXISTS cashflow_company ON TABLE cashflow FIELDS company;
DEFINE INDEX IF NOT EXISTS cashflow_invoice ON TABLE cashflow FIELDS invoice;
DEFINE TABLE IF NOT EXISTS financial_item SCHEMALESS;
DEFINE INDEX IF NOT EXISTS financial_item_company ON TABLE financial_item FIELDS company;
DEFINE TABLE IF NOT EXISTS bank_balance SCHEMALESS;
DEFINE INDEX IF NOT EXISTS bank_balance_company ON TABLE bank_balance FIELDS company;

-- reconciliation
DEFINE TABLE IF NOT EXISTS reconciliation_session SCHEMALESS;
DEFINE INDEX IF NOT EXISTS session_company ON TABLE reconciliation_session FIELDS company;
DEFINE TABLE IF NOT EXISTS bank_transaction SCHEMALESS;
DEFINE INDEX IF NOT EXISTS bank_tx_company ON TABLE bank_transaction FIELDS company;
DEFINE INDEX IF NOT EXISTS bank_tx_session ON TABLE bank_transaction FIELDS session;

-- notifications & settings
DEFINE TABLE IF NOT EXISTS invoice_notification SCHEMALESS;
DEFINE INDEX IF NOT EXISTS notification_invoice ON TABLE invoice_notification FIELDS invoice UNIQUE;
DEFINE INDEX IF NOT EXISTS notification_company ON TABLE invoice_notification FIELDS company;
DEFINE TABLE IF NOT EXISTS app_settings SCHEMALESS;
DEFINE INDEX IF NOT EXISTS app_settings_company ON TABLE app_settings FIELDS company UNIQUE;
DEFINE TABLE IF NOT EXISTS email_settings SCHEMALESS;
DEFINE INDEX IF NOT EXISTS email_settings_company ON TABLE email_settings FIELDS company UNIQUE;
"#;

/// Apply table and index definitions
pub async fn define(db: &Surreal<Db>) -> Result<(), surrealdb::Error> {
    db.query(SCHEMA).await?.check()?;
    Ok(())
}
