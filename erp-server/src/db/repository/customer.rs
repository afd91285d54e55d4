//! Customer Repository

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{CompanyId, Customer, CustomerCreate, CustomerStatus, CustomerUpdate};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(
        &self,
        company: &CompanyId,
        status: Option<CustomerStatus>,
        search: Option<String>,
    ) -> RepoResult<Vec<Customer>> {
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let customers: Vec<Customer> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM customer
                WHERE company = $company
                    AND ($status = NONE OR status = $status)
                    AND ($search = NONE
                        OR string::lowercase(name) CONTAINS $search
                        OR string::lowercase(company_name) CONTAINS $search
                        OR string::lowercase(email OR "") CONTAINS $search)
                ORDER BY name"#,
            )
            .bind(("company", company.clone()))
            .bind(("status", status))
            .bind(("search", search))
            .await?
            .take(0)?;
        Ok(customers)
    }

    pub async fn find_by_id(
        &self,
        company: &CompanyId,
        id: &str,
    ) -> RepoResult<Option<Customer>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM customer WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<Customer> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn create(&self, company: &CompanyId, data: CustomerCreate) -> RepoResult<Customer> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE customer SET
                    company = $company,
                    name = $name,
                    company_name = $company_name,
                    email = $email,
                    phone = $phone,
                    address = $address,
                    vat_id = $vat_id,
                    sdi_code = $sdi_code,
                    status = $status,
                    revenue = $revenue OR 0,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("company", company.clone()))
            .bind(("name", data.name))
            .bind(("company_name", data.company_name))
            .bind(("email", data.email))
            .bind(("phone", data.phone))
            .bind(("address", data.address))
            .bind(("vat_id", data.vat_id))
            .bind(("sdi_code", data.sdi_code))
            .bind(("status", data.status))
            .bind(("revenue", data.revenue))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Customer> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create customer".to_string()))
    }

    pub async fn update(
        &self,
        company: &CompanyId,
        id: &str,
        data: CustomerUpdate,
    ) -> RepoResult<Customer> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Customer {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    company_name = $company_name OR company_name,
                    email = IF $has_email THEN $email ELSE email END,
                    phone = IF $has_phone THEN $phone ELSE phone END,
                    address = IF $has_address THEN $address ELSE address END,
                    vat_id = IF $has_vat_id THEN $vat_id ELSE vat_id END,
                    sdi_code = IF $has_sdi_code THEN $sdi_code ELSE sdi_code END,
                    status = IF $has_status THEN $status ELSE status END,
                    revenue = IF $has_revenue THEN $revenue ELSE revenue END
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("name", data.name))
            .bind(("company_name", data.company_name))
            .bind(("has_email", data.email.is_some()))
            .bind(("email", data.email))
            .bind(("has_phone", data.phone.is_some()))
            .bind(("phone", data.phone))
            .bind(("has_address", data.address.is_some()))
            .bind(("address", data.address))
            .bind(("has_vat_id", data.vat_id.is_some()))
            .bind(("vat_id", data.vat_id))
            .bind(("has_sdi_code", data.sdi_code.is_some()))
            .bind(("sdi_code", data.sdi_code))
            .bind(("has_status", data.status.is_some()))
            .bind(("status", data.status))
            .bind(("has_revenue", data.revenue.is_some()))
            .bind(("revenue", data.revenue))
            .await?;

        result
            .take::<Option<Customer>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Customer {} not found", id)))
    }

    pub async fn delete(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Customer {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
