//! Financial Statement Item Repository

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{
    CompanyId, FinancialItem, FinancialItemCreate, FinancialItemUpdate, Section,
};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

#[derive(Clone)]
pub struct FinancialItemRepository {
    base: BaseRepository,
}

impl FinancialItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(
        &self,
        company: &CompanyId,
        section: Option<Section>,
    ) -> RepoResult<Vec<FinancialItem>> {
        let items: Vec<FinancialItem> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM financial_item
                WHERE company = $company
                    AND ($section = NONE OR section = $section)
                ORDER BY name"#,
            )
            .bind(("company", company.clone()))
            .bind(("section", section))
            .await?
            .take(0)?;
        Ok(items)
    }

    pub async fn find_by_id(
        &self,
        company: &CompanyId,
        id: &str,
    ) -> RepoResult<Option<FinancialItem>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM financial_item WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<FinancialItem> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn create(
        &self,
        company: &CompanyId,
        data: FinancialItemCreate,
    ) -> RepoResult<FinancialItem> {
        if data.category.section() != data.section {
            return Err(RepoError::Validation(format!(
                "Category '{}' does not belong to section '{}'",
                data.category.as_str(),
                data.section.as_str()
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE financial_item SET
                    company = $company,
                    name = $name,
                    section = $section,
                    category = $category,
                    amount = $amount,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("company", company.clone()))
            .bind(("name", data.name))
            .bind(("section", data.section))
            .bind(("category", data.category))
            .bind(("amount", data.amount))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<FinancialItem> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create financial item".to_string()))
    }

    pub async fn update(
        &self,
        company: &CompanyId,
        id: &str,
        data: FinancialItemUpdate,
    ) -> RepoResult<FinancialItem> {
        let thing = parse_id(id)?;
        let existing = self
            .find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Financial item {} not found", id)))?;

        // The section/category pair must stay coherent after the update
        let section = data.section.unwrap_or(existing.section);
        let category = data.category.unwrap_or(existing.category);
        if category.section() != section {
            return Err(RepoError::Validation(format!(
                "Category '{}' does not belong to section '{}'",
                category.as_str(),
                section.as_str()
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    section = $section,
                    category = $category,
                    amount = IF $has_amount THEN $amount ELSE amount END
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("name", data.name))
            .bind(("section", section))
            .bind(("category", category))
            .bind(("has_amount", data.amount.is_some()))
            .bind(("amount", data.amount))
            .await?;

        result
            .take::<Option<FinancialItem>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Financial item {} not found", id)))
    }

    pub async fn delete(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Financial item {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
