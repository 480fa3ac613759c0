//! Tiered ontology term search.
//!
//! A search tries progressively looser match strategies against the
//! unified `ontologyterm` table and stops at the first tier that returns
//! rows:
//!
//! ```text
//!   exact ──(no rows)──▶ prefix ──(no rows)──▶ contains
//!     │                    │                      │
//!     ▼                    ▼                      ▼
//!   result               result                result / empty
//! ```
//!
//! Every tier has two query shapes: a direct scan of `ontologyterm`, and a
//! synonym-joined variant that also matches labels from the
//! `ontologyterm_synonym` junction. Each (tier, shape) pair is built by its
//! own function with its own table aliases, so a filter written for one
//! shape can never reference an alias that only exists in the other.
//!
//! Exclusions, the type discriminator and the obsolete flag are always
//! applied in SQL, never by filtering rows afterwards.

use serde::Serialize;
use sqlx::any::{Any, AnyArguments, AnyRow};
use sqlx::{AnyConnection, AnyPool};
use sqlx::query::Query;
use sqlx::Row;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::{CurationError, Result};
use crate::models::OntologyTerm;
use crate::ontology::{self, GoAspect, OntologyType};

const TERM_TABLE: &str = "ontologyterm";
const JUNCTION_TABLE: &str = "ontologyterm_synonym";
const SYNONYM_TABLE: &str = "synonym";

/// One fallback strategy of the search algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Prefix,
    Contains,
}

impl MatchTier {
    /// Tiers in the order they are tried.
    pub const FALLBACK_ORDER: [MatchTier; 3] =
        [MatchTier::Exact, MatchTier::Prefix, MatchTier::Contains];

    const EXACT_ONLY: [MatchTier; 1] = [MatchTier::Exact];

    pub fn as_str(self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Prefix => "prefix",
            MatchTier::Contains => "contains",
        }
    }

    /// Value bound for this tier. Case folding happens in SQL on both
    /// sides of the comparison, never here.
    fn operand(self, text: &str) -> String {
        match self {
            MatchTier::Exact => text.to_string(),
            MatchTier::Prefix => format!("{}%", escape_like(text)),
            MatchTier::Contains => format!("%{}%", escape_like(text)),
        }
    }

    /// Predicate comparing `LOWER(column)` with `LOWER(operand)`, so the
    /// database's own folding rules apply to both sides.
    fn predicate(self, column: &str, placeholder: &str) -> String {
        match self {
            MatchTier::Exact => format!("LOWER({}) = LOWER({})", column, placeholder),
            MatchTier::Prefix | MatchTier::Contains => {
                format!("LOWER({}) LIKE LOWER({}) ESCAPE '\\'", column, placeholder)
            }
        }
    }

    /// Intra-tier ordering. Exact hits sort by name; looser tiers put
    /// shorter (closer) names first.
    fn order_by(self, alias: &str) -> String {
        match self {
            MatchTier::Exact => format!("{a}.name, {a}.id", a = alias),
            MatchTier::Prefix | MatchTier::Contains => {
                format!("LENGTH({a}.name), {a}.name, {a}.id", a = alias)
            }
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escape LIKE metacharacters so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Parameters of one ontology search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub search_text: String,
    pub ontology_type: OntologyType,
    /// Only run the exact tier.
    pub exact: bool,
    /// Also match synonym labels.
    pub include_synonyms: bool,
    /// CURIEs removed from every tier's candidates.
    pub exclude_curies: BTreeSet<String>,
    /// Result bound; the configured default when `None`.
    pub limit: Option<i64>,
    /// Restrict to one `namespace` value (e.g. a GO aspect).
    pub namespace: Option<String>,
}

impl SearchRequest {
    pub fn new(search_text: impl Into<String>, ontology_type: OntologyType) -> Self {
        Self {
            search_text: search_text.into(),
            ontology_type,
            exact: false,
            include_synonyms: false,
            exclude_curies: BTreeSet::new(),
            limit: None,
            namespace: None,
        }
    }

    /// Like [`SearchRequest::new`], validating a discriminator string.
    pub fn parse(search_text: impl Into<String>, ontology_type: &str) -> Result<Self> {
        Ok(Self::new(search_text, ontology_type.parse()?))
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn include_synonyms(mut self, include: bool) -> Self {
        self.include_synonyms = include;
        self
    }

    pub fn exclude<I, S>(mut self, curies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_curies.extend(curies.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn tiers(&self) -> &'static [MatchTier] {
        if self.exact {
            &MatchTier::EXACT_ONLY
        } else {
            &MatchTier::FALLBACK_ORDER
        }
    }
}

/// Terms found by a search and the tier that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct TieredResult {
    /// `None` when no tier matched.
    pub tier: Option<MatchTier>,
    pub terms: Vec<OntologyTerm>,
}

/// A validated request, ready to be turned into SQL.
#[derive(Debug)]
struct Prepared<'a> {
    request: &'a SearchRequest,
    text: String,
    limit: i64,
}

fn prepare<'a>(request: &'a SearchRequest, settings: &SearchConfig) -> Result<Prepared<'a>> {
    let text = request.search_text.trim().to_string();
    if text.is_empty() {
        return Err(CurationError::InvalidRequest(
            "search text must not be empty".to_string(),
        ));
    }

    let limit = request.limit.unwrap_or(settings.default_limit);
    if limit < 1 {
        return Err(CurationError::InvalidRequest(format!(
            "limit must be >= 1, got {}",
            limit
        )));
    }

    Ok(Prepared {
        request,
        text,
        limit: limit.min(settings.max_limit),
    })
}

// ============ SQL construction ============

#[derive(Debug, Clone, PartialEq)]
enum Param {
    Text(String),
    Int(i64),
}

/// SQL text plus its positional parameters.
///
/// Placeholders are numbered `$1..$n` in order of first appearance, which
/// both PostgreSQL and SQLite accept.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub sql: String,
    params: Vec<Param>,
}

impl SqlQuery {
    pub(crate) fn bound(&self) -> Query<'_, Any, AnyArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                Param::Text(s) => query.bind(s.as_str()),
                Param::Int(i) => query.bind(*i),
            };
        }
        query
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

#[derive(Default)]
pub(crate) struct Binder {
    params: Vec<Param>,
}

impl Binder {
    pub(crate) fn text(&mut self, value: impl Into<String>) -> String {
        self.params.push(Param::Text(value.into()));
        format!("${}", self.params.len())
    }

    pub(crate) fn int(&mut self, value: i64) -> String {
        self.params.push(Param::Int(value));
        format!("${}", self.params.len())
    }

    pub(crate) fn list(&mut self, values: &BTreeSet<String>) -> String {
        values
            .iter()
            .map(|v| self.text(v.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn finish(self, sql: String) -> SqlQuery {
        SqlQuery {
            sql,
            params: self.params,
        }
    }
}

/// Build the query for one tier in the join mode the request asks for.
pub fn build_tier_query(
    tier: MatchTier,
    request: &SearchRequest,
    settings: &SearchConfig,
) -> Result<SqlQuery> {
    let prepared = prepare(request, settings)?;
    Ok(tier_query(tier, &prepared))
}

fn tier_query(tier: MatchTier, prepared: &Prepared<'_>) -> SqlQuery {
    if prepared.request.include_synonyms {
        synonym_tier_query(tier, prepared)
    } else {
        direct_tier_query(tier, prepared)
    }
}

/// Term-name-only query. The only alias in scope is `t`.
fn direct_tier_query(tier: MatchTier, prepared: &Prepared<'_>) -> SqlQuery {
    let request = prepared.request;
    let mut b = Binder::default();

    let type_ph = b.text(request.ontology_type.as_str());
    let name_ph = b.text(tier.operand(&prepared.text));

    let mut sql = format!(
        r#"SELECT CAST(t.id AS BIGINT) AS id, t.curie, t.name, t.namespace, t.definition
FROM {term} t
WHERE t.ontologytermtype = {type_ph}
  AND t.obsolete = false
  AND {name_match}"#,
        term = TERM_TABLE,
        type_ph = type_ph,
        name_match = tier.predicate("t.name", &name_ph),
    );

    if let Some(ns) = &request.namespace {
        sql.push_str(&format!("\n  AND t.namespace = {}", b.text(ns.as_str())));
    }
    if !request.exclude_curies.is_empty() {
        sql.push_str(&format!(
            "\n  AND t.curie NOT IN ({})",
            b.list(&request.exclude_curies)
        ));
    }

    let limit_ph = b.int(prepared.limit);
    sql.push_str(&format!(
        "\nORDER BY {}\nLIMIT {}",
        tier.order_by("t"),
        limit_ph
    ));

    b.finish(sql)
}

/// Term-name-or-synonym query.
///
/// Synonym hits are collapsed to distinct term ids inside the
/// `synonym_hits` CTE (aliases `ot`, `ots`, `s`), then left-joined to the
/// outer term scan (alias `st`), so a term matching through several
/// synonyms still yields one row.
fn synonym_tier_query(tier: MatchTier, prepared: &Prepared<'_>) -> SqlQuery {
    let request = prepared.request;
    let operand = tier.operand(&prepared.text);
    let mut b = Binder::default();

    let cte_type_ph = b.text(request.ontology_type.as_str());
    let synonym_ph = b.text(operand.as_str());
    let type_ph = b.text(request.ontology_type.as_str());
    let name_ph = b.text(operand);

    let mut sql = format!(
        r#"WITH synonym_hits AS (
    SELECT DISTINCT ots.ontologyterm_id AS term_id
    FROM {junction} ots
    JOIN {synonym} s ON s.id = ots.synonyms_id
    JOIN {term} ot ON ot.id = ots.ontologyterm_id
    WHERE ot.ontologytermtype = {cte_type_ph}
      AND {synonym_match}
)
SELECT CAST(st.id AS BIGINT) AS id, st.curie, st.name, st.namespace, st.definition
FROM {term} st
LEFT JOIN synonym_hits sh ON sh.term_id = st.id
WHERE st.ontologytermtype = {type_ph}
  AND st.obsolete = false
  AND ({name_match} OR sh.term_id IS NOT NULL)"#,
        junction = JUNCTION_TABLE,
        synonym = SYNONYM_TABLE,
        term = TERM_TABLE,
        cte_type_ph = cte_type_ph,
        synonym_match = tier.predicate("s.name", &synonym_ph),
        type_ph = type_ph,
        name_match = tier.predicate("st.name", &name_ph),
    );

    if let Some(ns) = &request.namespace {
        sql.push_str(&format!("\n  AND st.namespace = {}", b.text(ns.as_str())));
    }
    if !request.exclude_curies.is_empty() {
        sql.push_str(&format!(
            "\n  AND st.curie NOT IN ({})",
            b.list(&request.exclude_curies)
        ));
    }

    let limit_ph = b.int(prepared.limit);
    sql.push_str(&format!(
        "\nORDER BY {}\nLIMIT {}",
        tier.order_by("st"),
        limit_ph
    ));

    b.finish(sql)
}

fn synonyms_query(term_ids: &[i64]) -> SqlQuery {
    let mut b = Binder::default();
    let ids = term_ids
        .iter()
        .map(|id| b.int(*id))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        r#"SELECT CAST(ots.ontologyterm_id AS BIGINT) AS term_id, s.name AS synonym
FROM {junction} ots
JOIN {synonym} s ON s.id = ots.synonyms_id
WHERE ots.ontologyterm_id IN ({ids})
ORDER BY s.name"#,
        junction = JUNCTION_TABLE,
        synonym = SYNONYM_TABLE,
        ids = ids,
    );
    b.finish(sql)
}

// ============ Execution ============

/// Ontology search engine over a caller-owned connection pool.
#[derive(Debug, Clone)]
pub struct OntologySearch {
    pool: AnyPool,
    settings: SearchConfig,
}

impl OntologySearch {
    pub fn new(pool: AnyPool, settings: SearchConfig) -> Self {
        Self { pool, settings }
    }

    fn tier_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.tier_timeout_ms)
    }

    /// Run the tier fallback and return the first non-empty tier's terms.
    pub async fn search_ontology_terms(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<OntologyTerm>> {
        Ok(self.search_with_tier(request).await?.terms)
    }

    /// Like [`search_ontology_terms`](Self::search_ontology_terms), also
    /// reporting which tier matched.
    pub async fn search_with_tier(&self, request: &SearchRequest) -> Result<TieredResult> {
        let prepared = prepare(request, &self.settings)?;
        let mut conn = self.pool.acquire().await?;

        for &tier in request.tiers() {
            let mut terms = self.run_tier(&mut conn, tier, &prepared).await?;
            if terms.is_empty() {
                continue;
            }
            self.attach_synonyms(&mut conn, &mut terms, tier).await?;
            tracing::info!(
                ontology_type = %request.ontology_type,
                tier = %tier,
                hits = terms.len(),
                "ontology search resolved"
            );
            return Ok(TieredResult {
                tier: Some(tier),
                terms,
            });
        }

        tracing::info!(
            ontology_type = %request.ontology_type,
            exact = request.exact,
            "ontology search found nothing"
        );
        Ok(TieredResult {
            tier: None,
            terms: Vec::new(),
        })
    }

    /// Run exactly one tier, with no fallback.
    pub async fn search_tier(
        &self,
        tier: MatchTier,
        request: &SearchRequest,
    ) -> Result<Vec<OntologyTerm>> {
        let prepared = prepare(request, &self.settings)?;
        let mut conn = self.pool.acquire().await?;
        let mut terms = self.run_tier(&mut conn, tier, &prepared).await?;
        self.attach_synonyms(&mut conn, &mut terms, tier).await?;
        Ok(terms)
    }

    /// Anatomy terms from the ontology a data provider curates with.
    pub async fn search_anatomy_terms(
        &self,
        text: &str,
        data_provider: &str,
        limit: Option<i64>,
    ) -> Result<Vec<OntologyTerm>> {
        let ontology_type = ontology::anatomy_ontology(data_provider)?;
        self.convenience_search(SearchRequest::new(text, ontology_type), limit)
            .await
    }

    /// Developmental stage terms from the provider's stage ontology.
    pub async fn search_life_stage_terms(
        &self,
        text: &str,
        data_provider: &str,
        limit: Option<i64>,
    ) -> Result<Vec<OntologyTerm>> {
        let ontology_type = ontology::life_stage_ontology(data_provider)?;
        self.convenience_search(SearchRequest::new(text, ontology_type), limit)
            .await
    }

    /// GO terms, optionally restricted to one aspect.
    pub async fn search_go_terms(
        &self,
        text: &str,
        aspect: Option<GoAspect>,
        limit: Option<i64>,
    ) -> Result<Vec<OntologyTerm>> {
        let mut request = SearchRequest::new(text, OntologyType::GOTerm);
        if let Some(aspect) = aspect {
            request = request.namespace(aspect.namespace());
        }
        self.convenience_search(request, limit).await
    }

    async fn convenience_search(
        &self,
        mut request: SearchRequest,
        limit: Option<i64>,
    ) -> Result<Vec<OntologyTerm>> {
        request.include_synonyms = true;
        request.limit = limit;
        self.search_ontology_terms(&request).await
    }

    async fn run_tier(
        &self,
        conn: &mut AnyConnection,
        tier: MatchTier,
        prepared: &Prepared<'_>,
    ) -> Result<Vec<OntologyTerm>> {
        let query = tier_query(tier, prepared);
        tracing::debug!(
            tier = %tier,
            synonyms = prepared.request.include_synonyms,
            params = query.param_count(),
            "running tier query"
        );

        let rows = self.fetch_with_timeout(conn, &query, tier).await?;
        rows.iter()
            .map(|row| row_to_term(row, prepared.request.ontology_type))
            .collect()
    }

    /// Fill in synonym labels for the terms a tier returned. Runs under
    /// the same tier's time budget.
    async fn attach_synonyms(
        &self,
        conn: &mut AnyConnection,
        terms: &mut [OntologyTerm],
        tier: MatchTier,
    ) -> Result<()> {
        if terms.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = terms.iter().map(|t| t.id).collect();
        let query = synonyms_query(&ids);
        let rows = self.fetch_with_timeout(conn, &query, tier).await?;

        let mut by_term: HashMap<i64, Vec<String>> = HashMap::new();
        for row in &rows {
            let term_id: i64 = row.try_get("term_id")?;
            let synonym: String = row.try_get("synonym")?;
            by_term.entry(term_id).or_default().push(synonym);
        }

        for term in terms.iter_mut() {
            if let Some(mut synonyms) = by_term.remove(&term.id) {
                synonyms.sort();
                synonyms.dedup();
                term.synonyms = synonyms;
            }
        }
        Ok(())
    }

    async fn fetch_with_timeout(
        &self,
        conn: &mut AnyConnection,
        query: &SqlQuery,
        tier: MatchTier,
    ) -> Result<Vec<AnyRow>> {
        let timeout = self.tier_timeout();
        match tokio::time::timeout(timeout, query.bound().fetch_all(&mut *conn)).await {
            Ok(rows) => Ok(rows?),
            Err(_) => {
                tracing::warn!(
                    tier = %tier,
                    timeout_ms = self.settings.tier_timeout_ms,
                    "tier query timed out"
                );
                Err(CurationError::QueryTimeout {
                    tier,
                    timeout_ms: self.settings.tier_timeout_ms,
                })
            }
        }
    }
}

fn row_to_term(row: &AnyRow, ontology_type: OntologyType) -> Result<OntologyTerm> {
    Ok(OntologyTerm {
        id: row.try_get("id")?,
        curie: row.try_get("curie")?,
        name: row.try_get("name")?,
        namespace: row.try_get("namespace")?,
        definition: row.try_get("definition")?,
        ontology_type,
        obsolete: false,
        synonyms: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SearchConfig {
        SearchConfig::default()
    }

    fn query(tier: MatchTier, request: &SearchRequest) -> SqlQuery {
        build_tier_query(tier, request, &settings()).unwrap()
    }

    fn placeholder_count(sql: &str) -> usize {
        let mut max = 0;
        let bytes = sql.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    max = max.max(sql[start..end].parse::<usize>().unwrap());
                }
                i = end;
            } else {
                i += 1;
            }
        }
        max
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(escape_like("nucleus"), "nucleus");
    }

    #[test]
    fn test_operands_per_tier() {
        assert_eq!(MatchTier::Exact.operand("cell"), "cell");
        assert_eq!(MatchTier::Prefix.operand("cell"), "cell%");
        assert_eq!(MatchTier::Contains.operand("5%"), "%5\\%%");
    }

    #[test]
    fn test_empty_text_rejected() {
        let request = SearchRequest::new("   ", OntologyType::GOTerm);
        assert!(matches!(
            build_tier_query(MatchTier::Exact, &request, &settings()),
            Err(CurationError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let request = SearchRequest::new("cell", OntologyType::GOTerm).limit(0);
        assert!(matches!(
            build_tier_query(MatchTier::Exact, &request, &settings()),
            Err(CurationError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_limit_capped_and_defaulted() {
        let request = SearchRequest::new("cell", OntologyType::GOTerm);
        let q = query(MatchTier::Exact, &request);
        assert_eq!(q.params.last(), Some(&Param::Int(20)));

        let request = request.limit(1_000_000);
        let q = query(MatchTier::Exact, &request);
        assert_eq!(q.params.last(), Some(&Param::Int(500)));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(matches!(
            SearchRequest::parse("cell", "NotATerm"),
            Err(CurationError::InvalidOntologyType(_))
        ));
    }

    #[test]
    fn test_exact_only_runs_one_tier() {
        let request = SearchRequest::new("cell", OntologyType::GOTerm).exact(true);
        assert_eq!(request.tiers(), &[MatchTier::Exact]);
        let request = request.exact(false);
        assert_eq!(request.tiers().len(), 3);
    }

    #[test]
    fn test_direct_query_binds_only_its_own_alias() {
        let request = SearchRequest::new("membrane", OntologyType::GOTerm)
            .exclude(["GO:0016020", "GO:0005886"]);
        for tier in MatchTier::FALLBACK_ORDER {
            let q = query(tier, &request);
            assert!(q.sql.contains("t.curie NOT IN ($3, $4)"), "{}", q.sql);
            assert!(!q.sql.contains("st."), "{}", q.sql);
            assert!(!q.sql.contains("sh."), "{}", q.sql);
            assert!(!q.sql.contains("synonym"), "{}", q.sql);
            assert_eq!(placeholder_count(&q.sql), q.param_count());
        }
    }

    #[test]
    fn test_synonym_query_excludes_on_outer_term() {
        let request = SearchRequest::new("nuclear", OntologyType::GOTerm)
            .include_synonyms(true)
            .exclude(["GO:0005634"]);
        for tier in MatchTier::FALLBACK_ORDER {
            let q = query(tier, &request);
            assert!(q.sql.starts_with("WITH synonym_hits AS"));
            assert!(q.sql.contains("st.curie NOT IN ($5)"), "{}", q.sql);
            assert!(q.sql.contains("sh.term_id IS NOT NULL"));
            assert!(q.sql.contains("SELECT DISTINCT ots.ontologyterm_id"));
            assert_eq!(placeholder_count(&q.sql), q.param_count());
        }
    }

    #[test]
    fn test_no_exclusion_clause_when_set_empty() {
        let request = SearchRequest::new("cell", OntologyType::CLTerm);
        assert!(!query(MatchTier::Contains, &request).sql.contains("NOT IN"));
        let request = request.include_synonyms(true);
        assert!(!query(MatchTier::Contains, &request).sql.contains("NOT IN"));
    }

    #[test]
    fn test_exact_tier_uses_equality_not_like() {
        let request = SearchRequest::new(" Nucleus ", OntologyType::GOTerm);
        let q = query(MatchTier::Exact, &request);
        assert!(q.sql.contains("LOWER(t.name) = LOWER($2)"));
        assert!(!q.sql.contains("LIKE"));
        assert_eq!(q.params[1], Param::Text("Nucleus".to_string()));
    }

    #[test]
    fn test_both_sides_folded_in_sql() {
        let request = SearchRequest::new("Ångström", OntologyType::CHEBITerm).include_synonyms(true);
        let q = query(MatchTier::Prefix, &request);
        assert!(q.sql.contains("LOWER(s.name) LIKE LOWER($2) ESCAPE"));
        assert!(q.sql.contains("LOWER(st.name) LIKE LOWER($4) ESCAPE"));
        assert_eq!(q.params[1], Param::Text("Ångström%".to_string()));
    }

    #[test]
    fn test_namespace_filter_precedes_exclusions() {
        let request = SearchRequest::new("kinase", OntologyType::GOTerm)
            .namespace("molecular_function")
            .exclude(["GO:0016301"]);
        let q = query(MatchTier::Prefix, &request);
        assert!(q.sql.contains("t.namespace = $3"));
        assert!(q.sql.contains("t.curie NOT IN ($4)"));
        assert_eq!(q.param_count(), 5);
    }

    #[test]
    fn test_synonyms_query_placeholders() {
        let q = synonyms_query(&[7, 9, 11]);
        assert!(q.sql.contains("IN ($1, $2, $3)"));
        assert_eq!(q.params, vec![Param::Int(7), Param::Int(9), Param::Int(11)]);
    }
}
