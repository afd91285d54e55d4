//! Invoice Repository

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{
    CompanyId, FlowDirection, Invoice, InvoiceCreate, InvoiceUpdate, StatoFatturazione,
};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

/// List filters; all optional, combined with AND
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub anno: Option<i32>,
    pub mese: Option<u32>,
    pub tipo: Option<FlowDirection>,
    pub stato: Option<StatoFatturazione>,
}

#[derive(Clone)]
pub struct InvoiceRepository {
    base: BaseRepository,
}

impl InvoiceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(
        &self,
        company: &CompanyId,
        filter: InvoiceFilter,
    ) -> RepoResult<Vec<Invoice>> {
        let invoices: Vec<Invoice> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM invoice
                WHERE company = $company
                    AND ($anno = NONE OR anno = $anno)
                    AND ($mese = NONE OR mese = $mese)
                    AND ($tipo = NONE OR tipo = $tipo)
                    AND ($stato = NONE OR stato_fatturazione = $stato)
                ORDER BY data DESC"#,
            )
            .bind(("company", company.clone()))
            .bind(("anno", filter.anno))
            .bind(("mese", filter.mese))
            .bind(("tipo", filter.tipo))
            .bind(("stato", filter.stato))
            .await?
            .take(0)?;
        Ok(invoices)
    }

    pub async fn find_by_id(&self, company: &CompanyId, id: &str) -> RepoResult<Option<Invoice>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM invoice WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<Invoice> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Invoices with a due date still in estimated state, for the due-date
    /// notification scan
    pub async fn find_due(&self, company: &CompanyId) -> RepoResult<Vec<Invoice>> {
        let invoices: Vec<Invoice> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM invoice
                WHERE company = $company
                    AND data_scadenza != NONE
                    AND stato_fatturazione = 'Stimato'
                ORDER BY data_scadenza"#,
            )
            .bind(("company", company.clone()))
            .await?
            .take(0)?;
        Ok(invoices)
    }

    pub async fn create(&self, company: &CompanyId, data: InvoiceCreate) -> RepoResult<Invoice> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE invoice SET
                    company = $company,
                    data = $data,
                    data_scadenza = $data_scadenza,
                    mese = $mese,
                    anno = $anno,
                    nome_progetto = $nome_progetto,
                    tipo = $tipo,
                    stato_fatturazione = $stato_fatturazione,
                    spesa = $spesa,
                    tipo_spesa = $tipo_spesa,
                    note = $note,
                    flusso = $flusso,
                    iva = $iva,
                    percentuale_iva = $percentuale_iva,
                    percentuale_fatturazione = $percentuale_fatturazione,
                    checked = $checked,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("company", company.clone()))
            .bind(("data", data.data))
            .bind(("data_scadenza", data.data_scadenza))
            .bind(("mese", data.mese))
            .bind(("anno", data.anno))
            .bind(("nome_progetto", data.nome_progetto))
            .bind(("tipo", data.tipo))
            .bind(("stato_fatturazione", data.stato_fatturazione))
            .bind(("spesa", data.spesa))
            .bind(("tipo_spesa", data.tipo_spesa))
            .bind(("note", data.note))
            .bind(("flusso", data.flusso))
            .bind(("iva", data.iva))
            .bind(("percentuale_iva", data.percentuale_iva))
            .bind(("percentuale_fatturazione", data.percentuale_fatturazione))
            .bind(("checked", data.checked))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Invoice> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create invoice".to_string()))
    }

    pub async fn update(
        &self,
        company: &CompanyId,
        id: &str,
        data: InvoiceUpdate,
    ) -> RepoResult<Invoice> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Invoice {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    data = IF $has_data THEN $data ELSE data END,
                    data_scadenza = IF $has_data_scadenza THEN $data_scadenza ELSE data_scadenza END,
                    mese = IF $has_mese THEN $mese ELSE mese END,
                    anno = IF $has_anno THEN $anno ELSE anno END,
                    nome_progetto = $nome_progetto OR nome_progetto,
                    tipo = IF $has_tipo THEN $tipo ELSE tipo END,
                    stato_fatturazione = IF $has_stato THEN $stato ELSE stato_fatturazione END,
                    spesa = IF $has_spesa THEN $spesa ELSE spesa END,
                    tipo_spesa = IF $has_tipo_spesa THEN $tipo_spesa ELSE tipo_spesa END,
                    note = IF $has_note THEN $note ELSE note END,
                    flusso = IF $has_flusso THEN $flusso ELSE flusso END,
                    iva = IF $has_iva THEN $iva ELSE iva END,
                    percentuale_iva = IF $has_percentuale_iva THEN $percentuale_iva ELSE percentuale_iva END,
                    percentuale_fatturazione = IF $has_percentuale_fatturazione THEN $percentuale_fatturazione ELSE percentuale_fatturazione END,
                    checked = IF $has_checked THEN $checked ELSE checked END
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("has_data", data.data.is_some()))
            .bind(("data", data.data))
            .bind(("has_data_scadenza", data.data_scadenza.is_some()))
            .bind(("data_scadenza", data.data_scadenza))
            .bind(("has_mese", data.mese.is_some()))
            .bind(("mese", data.mese))
            .bind(("has_anno", data.anno.is_some()))
            .bind(("anno", data.anno))
            .bind(("nome_progetto", data.nome_progetto))
            .bind(("has_tipo", data.tipo.is_some()))
            .bind(("tipo", data.tipo))
            .bind(("has_stato", data.stato_fatturazione.is_some()))
            .bind(("stato", data.stato_fatturazione))
            .bind(("has_spesa", data.spesa.is_some()))
            .bind(("spesa", data.spesa))
            .bind(("has_tipo_spesa", data.tipo_spesa.is_some()))
            .bind(("tipo_spesa", data.tipo_spesa))
            .bind(("has_note", data.note.is_some()))
            .bind(("note", data.note))
            .bind(("has_flusso", data.flusso.is_some()))
            .bind(("flusso", data.flusso))
            .bind(("has_iva", data.iva.is_some()))
            .bind(("iva", data.iva))
            .bind(("has_percentuale_iva", data.percentuale_iva.is_some()))
            .bind(("percentuale_iva", data.percentuale_iva))
            .bind((
                "has_percentuale_fatturazione",
                data.percentuale_fatturazione.is_some(),
            ))
            .bind(("percentuale_fatturazione", data.percentuale_fatturazione))
            .bind(("has_checked", data.checked.is_some()))
            .bind(("checked", data.checked))
            .await?;

        result
            .take::<Option<Invoice>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Invoice {} not found", id)))
    }

    /// Hard delete; the cashflow guard runs in the handler first
    pub async fn delete(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Invoice {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
