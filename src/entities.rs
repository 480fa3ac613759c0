//! Gene and allele lookups.
//!
//! Genes and alleles are rows of `biologicalentity`; their symbols live in
//! `slotannotation` rows of type `GeneSymbolSlotAnnotation` /
//! `AlleleSymbolSlotAnnotation`. Lookups go by taxon CURIE (joined through
//! `ontologyterm`) or by data provider abbreviation (`dataprovider`), are
//! ordered by primary external id, and page with `LIMIT`/`OFFSET`.

use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

use crate::error::{CurationError, Result};
use crate::search::{Binder, SqlQuery};

const GENE_SYMBOL_SLOT: &str = "GeneSymbolSlotAnnotation";
const ALLELE_SYMBOL_SLOT: &str = "AlleleSymbolSlotAnnotation";

/// A symbol as displayed and as formatted (markup allowed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSlot {
    pub display_text: String,
    pub format_text: String,
}

impl SymbolSlot {
    fn plain(text: String) -> Self {
        Self {
            display_text: text.clone(),
            format_text: text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    pub primary_external_id: String,
    /// Same as the primary external id.
    pub curie: String,
    pub gene_symbol: SymbolSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allele {
    pub primary_external_id: String,
    pub curie: String,
    pub allele_symbol: SymbolSlot,
}

/// Lightweight gene row: id and symbol only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneRecord {
    pub gene_id: String,
    pub gene_symbol: String,
}

/// Lightweight allele row: id and symbol only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlleleRecord {
    pub allele_id: String,
    pub allele_symbol: String,
}

/// Pagination window. `None` means unbounded / from the start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Page {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    fn validate(self) -> Result<Self> {
        if let Some(limit) = self.limit {
            if limit < 0 {
                return Err(CurationError::InvalidRequest(format!(
                    "limit must be >= 0, got {}",
                    limit
                )));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(CurationError::InvalidRequest(format!(
                    "offset must be >= 0, got {}",
                    offset
                )));
            }
        }
        Ok(self)
    }

    /// `LIMIT`/`OFFSET` tail. SQLite only accepts `OFFSET` after a `LIMIT`,
    /// so an offset alone gets an unbounded limit.
    fn push_to(self, sql: &mut String, b: &mut Binder) {
        match (self.limit, self.offset) {
            (None, None) => {}
            (limit, offset) => {
                let limit_ph = b.int(limit.unwrap_or(i64::MAX));
                sql.push_str(&format!("\nLIMIT {}", limit_ph));
                if let Some(offset) = offset {
                    sql.push_str(&format!("\nOFFSET {}", b.int(offset)));
                }
            }
        }
    }
}

/// How an allele query selects its rows.
#[derive(Debug, Clone, Copy)]
enum AlleleScope<'a> {
    Taxon(&'a str),
    DataProvider(&'a str),
}

fn gene_query(taxon_curie: &str, include_obsolete: bool, page: Page) -> SqlQuery {
    let mut b = Binder::default();
    let slot_ph = b.text(GENE_SYMBOL_SLOT);
    let taxon_ph = b.text(taxon_curie);

    let mut sql = format!(
        r#"SELECT be.primaryexternalid AS entity_id, slota.displaytext AS symbol
FROM biologicalentity be
JOIN slotannotation slota ON be.id = slota.singlegene_id
JOIN ontologyterm taxon ON be.taxon_id = taxon.id
WHERE slota.slotannotationtype = {}
  AND taxon.curie = {}"#,
        slot_ph, taxon_ph
    );
    if !include_obsolete {
        sql.push_str("\n  AND slota.obsolete = false\n  AND be.obsolete = false");
    }
    sql.push_str("\nORDER BY be.primaryexternalid");
    page.push_to(&mut sql, &mut b);

    b.finish(sql)
}

fn allele_query(scope: AlleleScope<'_>, page: Page) -> SqlQuery {
    let mut b = Binder::default();
    let slot_ph = b.text(ALLELE_SYMBOL_SLOT);

    let (join, filter) = match scope {
        AlleleScope::Taxon(curie) => (
            "JOIN ontologyterm taxon ON be.taxon_id = taxon.id",
            format!("taxon.curie = {}", b.text(curie)),
        ),
        AlleleScope::DataProvider(abbreviation) => (
            "JOIN dataprovider dp ON be.dataprovider_id = dp.id",
            format!("dp.abbreviation = {}", b.text(abbreviation)),
        ),
    };

    let mut sql = format!(
        r#"SELECT be.primaryexternalid AS entity_id, slota.displaytext AS symbol
FROM biologicalentity be
JOIN allele a ON be.id = a.id
JOIN slotannotation slota ON a.id = slota.singleallele_id
{join}
WHERE slota.obsolete = false
  AND be.obsolete = false
  AND slota.slotannotationtype = {slot_ph}
  AND {filter}
ORDER BY be.primaryexternalid"#,
        join = join,
        slot_ph = slot_ph,
        filter = filter,
    );
    page.push_to(&mut sql, &mut b);

    b.finish(sql)
}

/// Gene and allele lookups over a caller-owned pool.
#[derive(Debug, Clone)]
pub struct EntityLookup {
    pool: AnyPool,
}

impl EntityLookup {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Genes of one taxon (e.g. `NCBITaxon:6239`). Obsolete genes and
    /// obsolete symbols are skipped unless `include_obsolete` is set.
    pub async fn get_genes_by_taxon(
        &self,
        taxon_curie: &str,
        page: Page,
        include_obsolete: bool,
    ) -> Result<Vec<Gene>> {
        let query = gene_query(taxon_curie, include_obsolete, page.validate()?);
        let rows = self.fetch(&query).await?;
        let genes = rows
            .iter()
            .map(|row| {
                let (id, symbol) = id_and_symbol(row)?;
                Ok(Gene {
                    curie: id.clone(),
                    primary_external_id: id,
                    gene_symbol: SymbolSlot::plain(symbol),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(taxon = taxon_curie, genes = genes.len(), "genes fetched");
        Ok(genes)
    }

    /// Non-obsolete genes of one taxon as id/symbol pairs.
    pub async fn get_genes_raw(&self, taxon_curie: &str, page: Page) -> Result<Vec<GeneRecord>> {
        let query = gene_query(taxon_curie, false, page.validate()?);
        self.fetch(&query)
            .await?
            .iter()
            .map(|row| {
                let (gene_id, gene_symbol) = id_and_symbol(row)?;
                Ok(GeneRecord {
                    gene_id,
                    gene_symbol,
                })
            })
            .collect()
    }

    pub async fn get_alleles_by_taxon(&self, taxon_curie: &str, page: Page) -> Result<Vec<Allele>> {
        self.alleles(AlleleScope::Taxon(taxon_curie), page).await
    }

    pub async fn get_alleles_raw(
        &self,
        taxon_curie: &str,
        page: Page,
    ) -> Result<Vec<AlleleRecord>> {
        let query = allele_query(AlleleScope::Taxon(taxon_curie), page.validate()?);
        self.fetch(&query)
            .await?
            .iter()
            .map(|row| {
                let (allele_id, allele_symbol) = id_and_symbol(row)?;
                Ok(AlleleRecord {
                    allele_id,
                    allele_symbol,
                })
            })
            .collect()
    }

    /// Alleles curated by one data provider (e.g. `WB`, `MGI`).
    pub async fn get_alleles_by_data_provider(
        &self,
        data_provider: &str,
        page: Page,
    ) -> Result<Vec<Allele>> {
        self.alleles(AlleleScope::DataProvider(data_provider), page)
            .await
    }

    async fn alleles(&self, scope: AlleleScope<'_>, page: Page) -> Result<Vec<Allele>> {
        let query = allele_query(scope, page.validate()?);
        let alleles = self
            .fetch(&query)
            .await?
            .iter()
            .map(|row| {
                let (id, symbol) = id_and_symbol(row)?;
                Ok(Allele {
                    curie: id.clone(),
                    primary_external_id: id,
                    allele_symbol: SymbolSlot::plain(symbol),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(scope = ?scope, alleles = alleles.len(), "alleles fetched");
        Ok(alleles)
    }

    async fn fetch(&self, query: &SqlQuery) -> Result<Vec<AnyRow>> {
        Ok(query.bound().fetch_all(&self.pool).await?)
    }
}

fn id_and_symbol(row: &AnyRow) -> Result<(String, String)> {
    Ok((row.try_get("entity_id")?, row.try_get("symbol")?))
}
