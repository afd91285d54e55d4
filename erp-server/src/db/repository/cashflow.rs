//! Cashflow Repository

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{
    CashflowCreate, CashflowRecord, CashflowUpdate, CompanyId, InvoiceId, StatoFatturazione,
};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

/// List filters; all optional, combined with AND
#[derive(Debug, Clone, Default)]
pub struct CashflowFilter {
    pub anno: Option<i32>,
    pub invoice: Option<InvoiceId>,
    pub stato: Option<StatoFatturazione>,
}

#[derive(Clone)]
pub struct CashflowRepository {
    base: BaseRepository,
}

impl CashflowRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(
        &self,
        company: &CompanyId,
        filter: CashflowFilter,
    ) -> RepoResult<Vec<CashflowRecord>> {
        // Dates are stored as ISO strings, so a year filter is a prefix test
        let anno_prefix = filter.anno.map(|y| format!("{}-", y));
        let records: Vec<CashflowRecord> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM cashflow
                WHERE company = $company
                    AND ($anno_prefix = NONE OR (data_pagamento != NONE
                        AND string::starts_with(<string> data_pagamento, $anno_prefix)))
                    AND ($invoice = NONE OR invoice = $invoice)
                    AND ($stato = NONE OR stato_fatturazione = $stato)
                ORDER BY data_pagamento DESC"#,
            )
            .bind(("company", company.clone()))
            .bind(("anno_prefix", anno_prefix))
            .bind(("invoice", filter.invoice))
            .bind(("stato", filter.stato))
            .await?
            .take(0)?;
        Ok(records)
    }

    pub async fn find_by_id(
        &self,
        company: &CompanyId,
        id: &str,
    ) -> RepoResult<Option<CashflowRecord>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cashflow WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<CashflowRecord> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Records linked to one invoice, for the delete guard and payment status
    pub async fn find_by_invoice(
        &self,
        company: &CompanyId,
        invoice: &InvoiceId,
    ) -> RepoResult<Vec<CashflowRecord>> {
        let records: Vec<CashflowRecord> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM cashflow
                WHERE company = $company AND invoice = $invoice
                ORDER BY data_pagamento"#,
            )
            .bind(("company", company.clone()))
            .bind(("invoice", invoice.clone()))
            .await?
            .take(0)?;
        Ok(records)
    }

    pub async fn create(
        &self,
        company: &CompanyId,
        data: CashflowCreate,
    ) -> RepoResult<CashflowRecord> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE cashflow SET
                    company = $company,
                    invoice = $invoice,
                    data_pagamento = $data_pagamento,
                    importo = $importo,
                    tipo = $tipo,
                    descrizione = $descrizione,
                    categoria = $categoria,
                    note = $note,
                    stato_fatturazione = $stato_fatturazione,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("company", company.clone()))
            .bind(("invoice", data.invoice))
            .bind(("data_pagamento", data.data_pagamento))
            .bind(("importo", data.importo))
            .bind(("tipo", data.tipo))
            .bind(("descrizione", data.descrizione))
            .bind(("categoria", data.categoria))
            .bind(("note", data.note))
            .bind(("stato_fatturazione", data.stato_fatturazione))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<CashflowRecord> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create cashflow record".to_string()))
    }

    pub async fn update(
        &self,
        company: &CompanyId,
        id: &str,
        data: CashflowUpdate,
    ) -> RepoResult<CashflowRecord> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Cashflow record {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    invoice = IF $has_invoice THEN $invoice ELSE invoice END,
                    data_pagamento = IF $has_data_pagamento THEN $data_pagamento ELSE data_pagamento END,
                    importo = IF $has_importo THEN $importo ELSE importo END,
                    tipo = IF $has_tipo THEN $tipo ELSE tipo END,
                    descrizione = IF $has_descrizione THEN $descrizione ELSE descrizione END,
                    categoria = IF $has_categoria THEN $categoria ELSE categoria END,
                    note = IF $has_note THEN $note ELSE note END,
                    stato_fatturazione = IF $has_stato THEN $stato ELSE stato_fatturazione END
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("has_invoice", data.invoice.is_some()))
            .bind(("invoice", data.invoice))
            .bind(("has_data_pagamento", data.data_pagamento.is_some()))
            .bind(("data_pagamento", data.data_pagamento))
            .bind(("has_importo", data.importo.is_some()))
            .bind(("importo", data.importo))
            .bind(("has_tipo", data.tipo.is_some()))
            .bind(("tipo", data.tipo))
            .bind(("has_descrizione", data.descrizione.is_some()))
            .bind(("descrizione", data.descrizione))
            .bind(("has_categoria", data.categoria.is_some()))
            .bind(("categoria", data.categoria))
            .bind(("has_note", data.note.is_some()))
            .bind(("note", data.note))
            .bind(("has_stato", data.stato_fatturazione.is_some()))
            .bind(("stato", data.stato_fatturazione))
            .await?;

        result
            .take::<Option<CashflowRecord>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Cashflow record {} not found", id)))
    }

    pub async fn delete(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Cashflow record {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Detach records whose invoice no longer exists. Returns how many rows
    /// were repaired.
    pub async fn repair_orphans(&self, company: &CompanyId) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query(
                r#"LET $orphans = (SELECT id FROM cashflow
                    WHERE company = $company AND invoice != NONE AND invoice.id = NONE);
                UPDATE cashflow SET invoice = NONE WHERE id IN $orphans.id;
                RETURN array::len($orphans);"#,
            )
            .bind(("company", company.clone()))
            .await?;
        let repaired: Option<i64> = result.take(2)?;
        Ok(repaired.unwrap_or(0))
    }
}
