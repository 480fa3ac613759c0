#![allow(dead_code)]

use agr_curation::config::DbConfig;
use agr_curation::db;
use agr_curation::OntologyType;
use sqlx::AnyPool;
use std::path::Path;

pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

pub async fn sqlite_pool(path: &Path) -> AnyPool {
    db::connect_url(&sqlite_url(path), &DbConfig::default())
        .await
        .unwrap()
}

pub async fn exec(pool: &AnyPool, sql: &str) {
    sqlx::query(sql)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("fixture statement failed: {}\n{}", e, sql));
}

/// (id, curie, name, namespace, ontologytermtype, obsolete)
const TERMS: &[(i64, &str, &str, Option<&str>, &str, bool)] = &[
    (1, "GO:0000001", "mitochondrion inheritance", Some("biological_process"), "GOTerm", false),
    (2, "GO:0000002", "mitochondrial genome maintenance", Some("biological_process"), "GOTerm", false),
    (3, "GO:0005634", "nucleus", Some("cellular_component"), "GOTerm", false),
    (4, "GO:0005635", "nuclear envelope", Some("cellular_component"), "GOTerm", false),
    (5, "GO:0031965", "nuclear membrane", Some("cellular_component"), "GOTerm", false),
    (6, "GO:0000003", "nucleus", Some("cellular_component"), "GOTerm", true),
    (7, "GO:0016301", "kinase activity", Some("molecular_function"), "GOTerm", false),
    (8, "GO:0004672", "protein kinase activity", Some("molecular_function"), "GOTerm", false),
    (9, "GO:0006468", "protein phosphorylation", Some("biological_process"), "GOTerm", false),
    (10, "WBbt:0003681", "pharynx", None, "WBBTTerm", false),
    (11, "ZFA:0000056", "pharynx", None, "ZFATerm", false),
    (12, "WBls:0000038", "L4 larva", None, "WBLSTerm", false),
    (13, "FBdv:00005336", "third instar larval stage", None, "FBDVTerm", false),
    (14, "DOID:0050117", "disease by infectious agent", None, "DOTerm", false),
    (15, "CHEBI:0000015", "Ångström compound", None, "CHEBITerm", false),
];

/// (synonym id, label, term id)
const SYNONYMS: &[(i64, &str, i64)] = &[
    (1, "cell nucleus", 3),
    (2, "horsetail nucleus", 3),
    (3, "horsetail nuclear body", 3),
    (4, "nuclear envelope lumen", 4),
    (5, "EPK", 8),
];

/// Id of the per-type fixture term named `shared label`.
pub fn shared_label_id(ontology_type: OntologyType) -> i64 {
    let index = OntologyType::ALL
        .iter()
        .position(|t| *t == ontology_type)
        .unwrap() as i64;
    1000 + index
}

/// Create and fill a curation database: the terms above plus one
/// `shared label` term for every ontology type.
pub async fn seed_curation_db(pool: &AnyPool) {
    exec(
        pool,
        "CREATE TABLE ontologyterm (
            id INTEGER PRIMARY KEY,
            curie TEXT NOT NULL,
            name TEXT NOT NULL,
            namespace TEXT,
            definition TEXT,
            ontologytermtype TEXT NOT NULL,
            obsolete INTEGER NOT NULL DEFAULT 0
        )",
    )
    .await;
    exec(
        pool,
        "CREATE TABLE synonym (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    )
    .await;
    exec(
        pool,
        "CREATE TABLE ontologyterm_synonym (
            ontologyterm_id INTEGER NOT NULL,
            synonyms_id INTEGER NOT NULL
        )",
    )
    .await;

    for (id, curie, name, namespace, ontology_type, obsolete) in TERMS {
        insert_term(pool, *id, curie, name, *namespace, ontology_type, *obsolete).await;
    }
    for ontology_type in OntologyType::ALL {
        let id = shared_label_id(*ontology_type);
        let curie = format!("{}:{:07}", ontology_type.as_str(), id);
        insert_term(pool, id, &curie, "shared label", None, ontology_type.as_str(), false).await;
    }

    for (id, label, term_id) in SYNONYMS {
        sqlx::query("INSERT INTO synonym (id, name) VALUES ($1, $2)")
            .bind(*id)
            .bind(*label)
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO ontologyterm_synonym (ontologyterm_id, synonyms_id) VALUES ($1, $2)",
        )
        .bind(*term_id)
        .bind(*id)
        .execute(pool)
        .await
        .unwrap();
    }
}

async fn insert_term(
    pool: &AnyPool,
    id: i64,
    curie: &str,
    name: &str,
    namespace: Option<&str>,
    ontology_type: &str,
    obsolete: bool,
) {
    sqlx::query(
        "INSERT INTO ontologyterm (id, curie, name, namespace, definition, ontologytermtype, obsolete)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(curie)
    .bind(name)
    .bind(namespace)
    .bind(format!("Definition of {}.", name))
    .bind(ontology_type)
    .bind(obsolete as i64)
    .execute(pool)
    .await
    .unwrap();
}

/// Tables shared by both sides of a comparison fixture.
pub async fn seed_gene_schema(pool: &AnyPool, with_new_col: bool) {
    let new_col = if with_new_col { ",\n            new_col TEXT" } else { "" };
    exec(
        pool,
        &format!(
            "CREATE TABLE gene (
            id INTEGER PRIMARY KEY,
            symbol TEXT NOT NULL{}
        )",
            new_col
        ),
    )
    .await;
    exec(pool, "CREATE INDEX gene_symbol_index ON gene (symbol)").await;
    exec(
        pool,
        "CREATE TABLE allele (id INTEGER PRIMARY KEY, gene_id INTEGER)",
    )
    .await;
}

/// Taxon terms referenced by the gene/allele fixtures.
pub const C_ELEGANS: &str = "NCBITaxon:6239";
pub const MOUSE: &str = "NCBITaxon:10090";

/// (id, primary external id, taxon term id, data provider id, obsolete)
const ENTITIES: &[(i64, &str, i64, i64, bool)] = &[
    (101, "WBGene00000001", 20, 1, false),
    (102, "WBGene00000002", 20, 1, false),
    (103, "WBGene00000003", 20, 1, true),
    (104, "WBGene00000004", 20, 1, false),
    (105, "MGI:95280", 21, 2, false),
    (201, "WB:WBVar00000001", 20, 1, false),
    (202, "WB:WBVar00000002", 20, 1, false),
    (203, "WB:WBVar00000003", 20, 1, true),
    (204, "MGI:1856155", 21, 2, false),
];

/// (id, gene id, allele id, slot type, display text, obsolete)
const SYMBOL_SLOTS: &[(i64, Option<i64>, Option<i64>, &str, &str, bool)] = &[
    (1, Some(101), None, "GeneSymbolSlotAnnotation", "aap-1", false),
    (2, Some(102), None, "GeneSymbolSlotAnnotation", "aat-1", false),
    (3, Some(103), None, "GeneSymbolSlotAnnotation", "old-1", false),
    (4, Some(104), None, "GeneSymbolSlotAnnotation", "slt-1", true),
    (5, Some(105), None, "GeneSymbolSlotAnnotation", "Pax6", false),
    (6, Some(101), None, "GeneFullNameSlotAnnotation", "AAP-1 full name", false),
    (7, None, Some(201), "AlleleSymbolSlotAnnotation", "e1370", false),
    (8, None, Some(202), "AlleleSymbolSlotAnnotation", "n765", false),
    (9, None, Some(203), "AlleleSymbolSlotAnnotation", "gone1", false),
    (10, None, Some(204), "AlleleSymbolSlotAnnotation", "Pax6<Sey>", false),
];

/// Gene and allele tables on top of [`seed_curation_db`]: four
/// C. elegans genes (one obsolete, one with an obsolete symbol), one mouse
/// gene, three WB alleles (one obsolete) and one MGI allele.
pub async fn seed_entities(pool: &AnyPool) {
    insert_term(pool, 20, C_ELEGANS, "Caenorhabditis elegans", None, "NCBITaxonTerm", false).await;
    insert_term(pool, 21, MOUSE, "Mus musculus", None, "NCBITaxonTerm", false).await;

    exec(
        pool,
        "CREATE TABLE dataprovider (id INTEGER PRIMARY KEY, abbreviation TEXT NOT NULL)",
    )
    .await;
    exec(pool, "INSERT INTO dataprovider (id, abbreviation) VALUES (1, 'WB'), (2, 'MGI')").await;
    exec(
        pool,
        "CREATE TABLE biologicalentity (
            id INTEGER PRIMARY KEY,
            primaryexternalid TEXT NOT NULL,
            taxon_id INTEGER,
            dataprovider_id INTEGER,
            obsolete INTEGER NOT NULL DEFAULT 0
        )",
    )
    .await;
    exec(pool, "CREATE TABLE allele (id INTEGER PRIMARY KEY)").await;
    exec(
        pool,
        "CREATE TABLE slotannotation (
            id INTEGER PRIMARY KEY,
            singlegene_id INTEGER,
            singleallele_id INTEGER,
            slotannotationtype TEXT NOT NULL,
            displaytext TEXT,
            obsolete INTEGER NOT NULL DEFAULT 0
        )",
    )
    .await;

    for (id, external_id, taxon_id, provider_id, obsolete) in ENTITIES {
        sqlx::query(
            "INSERT INTO biologicalentity (id, primaryexternalid, taxon_id, dataprovider_id, obsolete)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*id)
        .bind(*external_id)
        .bind(*taxon_id)
        .bind(*provider_id)
        .bind(*obsolete as i64)
        .execute(pool)
        .await
        .unwrap();
        if *id >= 200 {
            sqlx::query("INSERT INTO allele (id) VALUES ($1)")
                .bind(*id)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    for (id, gene_id, allele_id, slot_type, text, obsolete) in SYMBOL_SLOTS {
        sqlx::query(
            "INSERT INTO slotannotation
                (id, singlegene_id, singleallele_id, slotannotationtype, displaytext, obsolete)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*id)
        .bind(*gene_id)
        .bind(*allele_id)
        .bind(*slot_type)
        .bind(*text)
        .bind(*obsolete as i64)
        .execute(pool)
        .await
        .unwrap();
    }
}
