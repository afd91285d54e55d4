//! Deal Repository

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{CompanyId, Deal, DealCreate, DealStage, DealUpdate};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

#[derive(Clone)]
pub struct DealRepository {
    base: BaseRepository,
}

impl DealRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(
        &self,
        company: &CompanyId,
        stage: Option<DealStage>,
    ) -> RepoResult<Vec<Deal>> {
        let deals: Vec<Deal> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM deal
                WHERE company = $company
                    AND ($stage = NONE OR stage = $stage)
                ORDER BY created_at DESC"#,
            )
            .bind(("company", company.clone()))
            .bind(("stage", stage))
            .await?
            .take(0)?;
        Ok(deals)
    }

    pub async fn find_by_id(&self, company: &CompanyId, id: &str) -> RepoResult<Option<Deal>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM deal WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<Deal> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn create(&self, company: &CompanyId, data: DealCreate) -> RepoResult<Deal> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE deal SET
                    company = $company,
                    title = $title,
                    customer_name = $customer_name,
                    value = $value OR 0,
                    stage = $stage,
                    probability = $probability OR 0,
                    expected_close = $expected_close,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("company", company.clone()))
            .bind(("title", data.title))
            .bind(("customer_name", data.customer_name))
            .bind(("value", data.value))
            .bind(("stage", data.stage))
            .bind(("probability", data.probability))
            .bind(("expected_close", data.expected_close))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Deal> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create deal".to_string()))
    }

    pub async fn update(
        &self,
        company: &CompanyId,
        id: &str,
        data: DealUpdate,
    ) -> RepoResult<Deal> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Deal {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    title = $title OR title,
                    customer_name = $customer_name OR customer_name,
                    value = IF $has_value THEN $value ELSE value END,
                    stage = IF $has_stage THEN $stage ELSE stage END,
                    probability = IF $has_probability THEN $probability ELSE probability END,
                    expected_close = IF $has_expected_close THEN $expected_close ELSE expected_close END
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("title", data.title))
            .bind(("customer_name", data.customer_name))
            .bind(("has_value", data.value.is_some()))
            .bind(("value", data.value))
            .bind(("has_stage", data.stage.is_some()))
            .bind(("stage", data.stage))
            .bind(("has_probability", data.probability.is_some()))
            .bind(("probability", data.probability))
            .bind(("has_expected_close", data.expected_close.is_some()))
            .bind(("expected_close", data.expected_close))
            .await?;

        result
            .take::<Option<Deal>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Deal {} not found", id)))
    }

    pub async fn delete(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Deal {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
