//! Bank Balance Repository

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{BankBalance, BankBalanceCreate, BankBalanceUpdate, CompanyId};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

#[derive(Clone)]
pub struct BankBalanceRepository {
    base: BaseRepository,
}

impl BankBalanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(
        &self,
        company: &CompanyId,
        anno: Option<i32>,
    ) -> RepoResult<Vec<BankBalance>> {
        let anno_prefix = anno.map(|y| format!("{}-", y));
        let balances: Vec<BankBalance> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM bank_balance
                WHERE company = $company
                    AND ($anno_prefix = NONE
                        OR string::starts_with(<string> data, $anno_prefix))
                ORDER BY data DESC"#,
            )
            .bind(("company", company.clone()))
            .bind(("anno_prefix", anno_prefix))
            .await?
            .take(0)?;
        Ok(balances)
    }

    pub async fn find_by_id(
        &self,
        company: &CompanyId,
        id: &str,
    ) -> RepoResult<Option<BankBalance>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM bank_balance WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<BankBalance> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn create(
        &self,
        company: &CompanyId,
        data: BankBalanceCreate,
    ) -> RepoResult<BankBalance> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE bank_balance SET
                    company = $company,
                    data = $data,
                    saldo = $saldo,
                    conto = $conto,
                    note = $note,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("company", company.clone()))
            .bind(("data", data.data))
            .bind(("saldo", data.saldo))
            .bind(("conto", data.conto))
            .bind(("note", data.note))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<BankBalance> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create bank balance".to_string()))
    }

    pub async fn update(
        &self,
        company: &CompanyId,
        id: &str,
        data: BankBalanceUpdate,
    ) -> RepoResult<BankBalance> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Bank balance {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    data = IF $has_data THEN $data ELSE data END,
                    saldo = IF $has_saldo THEN $saldo ELSE saldo END,
                    conto = IF $has_conto THEN $conto ELSE conto END,
                    note = IF $has_note THEN $note ELSE note END
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("has_data", data.data.is_some()))
            .bind(("data", data.data))
            .bind(("has_saldo", data.saldo.is_some()))
            .bind(("saldo", data.saldo))
            .bind(("has_conto", data.conto.is_some()))
            .bind(("conto", data.conto))
            .bind(("has_note", data.note.is_some()))
            .bind(("note", data.note))
            .await?;

        result
            .take::<Option<BankBalance>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Bank balance {} not found", id)))
    }

    pub async fn delete(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Bank balance {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
