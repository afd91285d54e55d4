//! Reconciliation Repository
//!
//! Sessions and their bank transactions. Counter updates are additive and
//! floored at zero so concurrent updates never drive them negative.

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{
    BankTransaction, CashflowId, CompanyId, InvoiceId, MatchStatus, ReconciliationSession,
    SessionId, SessionStatus,
};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

/// Counter deltas applied to a session in one statement
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterDelta {
    pub total: i64,
    pub matched: i64,
    pub pending: i64,
    pub ignored: i64,
}

#[derive(Clone)]
pub struct ReconciliationRepository {
    base: BaseRepository,
}

impl ReconciliationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ---- sessions ----

    pub async fn list_sessions(
        &self,
        company: &CompanyId,
    ) -> RepoResult<Vec<ReconciliationSession>> {
        let sessions: Vec<ReconciliationSession> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM reconciliation_session
                WHERE company = $company
                ORDER BY upload_date DESC"#,
            )
            .bind(("company", company.clone()))
            .await?
            .take(0)?;
        Ok(sessions)
    }

    pub async fn find_session(
        &self,
        company: &CompanyId,
        id: &str,
    ) -> RepoResult<Option<ReconciliationSession>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM reconciliation_session WHERE id = $thing AND company = $company LIMIT 1",
            )
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<ReconciliationSession> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn create_session(
        &self,
        session: ReconciliationSession,
    ) -> RepoResult<ReconciliationSession> {
        let mut result = self
            .base
            .db()
            .query("CREATE reconciliation_session CONTENT $session RETURN AFTER")
            .bind(("session", session))
            .await?;
        let created: Option<ReconciliationSession> = result.take(0)?;
        created.ok_or_else(|| {
            RepoError::Database("Failed to create reconciliation session".to_string())
        })
    }

    /// Apply counter deltas, flooring every counter at zero
    pub async fn apply_counter_delta(
        &self,
        session: &SessionId,
        delta: CounterDelta,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"UPDATE $session SET
                    total_transactions = math::max([total_transactions + $d_total, 0]),
                    matched_count = math::max([matched_count + $d_matched, 0]),
                    pending_count = math::max([pending_count + $d_pending, 0]),
                    ignored_count = math::max([ignored_count + $d_ignored, 0])"#,
            )
            .bind(("session", session.clone()))
            .bind(("d_total", delta.total))
            .bind(("d_matched", delta.matched))
            .bind(("d_pending", delta.pending))
            .bind(("d_ignored", delta.ignored))
            .await?;
        Ok(())
    }

    pub async fn set_session_status(
        &self,
        session: &SessionId,
        status: SessionStatus,
    ) -> RepoResult<ReconciliationSession> {
        let closed_date = match status {
            SessionStatus::Closed => Some(now_millis()),
            SessionStatus::Open => None,
        };
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $session SET
                    status = $status,
                    closed_date = $closed_date
                RETURN AFTER"#,
            )
            .bind(("session", session.clone()))
            .bind(("status", status))
            .bind(("closed_date", closed_date))
            .await?;
        result
            .take::<Option<ReconciliationSession>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Session {} not found", session)))
    }

    /// Delete a session together with its transactions
    pub async fn delete_session(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_session(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Session {} not found", id)))?;
        self.base
            .db()
            .query(
                r#"DELETE bank_transaction WHERE session = $thing;
                DELETE $thing;"#,
            )
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    // ---- transactions ----

    pub async fn list_transactions(
        &self,
        company: &CompanyId,
        session: &SessionId,
    ) -> RepoResult<Vec<BankTransaction>> {
        let txs: Vec<BankTransaction> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM bank_transaction
                WHERE company = $company AND session = $session
                ORDER BY data DESC"#,
            )
            .bind(("company", company.clone()))
            .bind(("session", session.clone()))
            .await?
            .take(0)?;
        Ok(txs)
    }

    pub async fn find_transaction(
        &self,
        company: &CompanyId,
        id: &str,
    ) -> RepoResult<Option<BankTransaction>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM bank_transaction WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<BankTransaction> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn create_transaction(&self, tx: BankTransaction) -> RepoResult<BankTransaction> {
        let mut result = self
            .base
            .db()
            .query("CREATE bank_transaction CONTENT $tx RETURN AFTER")
            .bind(("tx", tx))
            .await?;
        let created: Option<BankTransaction> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create bank transaction".to_string()))
    }

    /// Overwrite the match fields. `None` clears a field, so unmatch and
    /// suggestion application share this one statement.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_match(
        &self,
        company: &CompanyId,
        id: &str,
        status: MatchStatus,
        matched_invoice: Option<InvoiceId>,
        matched_cashflow: Option<CashflowId>,
        match_confidence: Option<u8>,
        match_reason: Option<String>,
    ) -> RepoResult<BankTransaction> {
        let thing = parse_id(id)?;
        self.find_transaction(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Transaction {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    match_status = $status,
                    matched_invoice = $matched_invoice,
                    matched_cashflow = $matched_cashflow,
                    match_confidence = $match_confidence,
                    match_reason = $match_reason
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("status", status))
            .bind(("matched_invoice", matched_invoice))
            .bind(("matched_cashflow", matched_cashflow))
            .bind(("match_confidence", match_confidence))
            .bind(("match_reason", match_reason))
            .await?;

        result
            .take::<Option<BankTransaction>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Transaction {} not found", id)))
    }

    pub async fn delete_transaction(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_transaction(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Transaction {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Delete a batch of transactions and report the match statuses that were
    /// removed, so the caller can roll the session counters back.
    pub async fn delete_transactions(
        &self,
        company: &CompanyId,
        ids: &[String],
    ) -> RepoResult<Vec<MatchStatus>> {
        let mut things = Vec::with_capacity(ids.len());
        for id in ids {
            things.push(parse_id(id)?);
        }
        let mut result = self
            .base
            .db()
            .query(
                r#"LET $victims = (SELECT id, match_status FROM bank_transaction
                    WHERE company = $company AND id IN $things);
                DELETE bank_transaction WHERE id IN $victims.id;
                RETURN $victims.match_status;"#,
            )
            .bind(("company", company.clone()))
            .bind(("things", things))
            .await?;
        let statuses: Vec<MatchStatus> = result.take(2)?;
        Ok(statuses)
    }
}
