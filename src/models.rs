//! Records returned by the ontology search engine.
//!
//! Rows are owned by the upstream curation system; these types are
//! read-only projections of the `ontologyterm` and `synonym` tables.

use serde::Serialize;

use crate::ontology::OntologyType;

/// One ontology concept matched by a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OntologyTerm {
    pub id: i64,
    pub curie: String,
    pub name: String,
    pub namespace: Option<String>,
    pub definition: Option<String>,
    pub ontology_type: OntologyType,
    /// Always `false` for search results; obsolete terms are filtered in SQL.
    pub obsolete: bool,
    /// Alternate labels from the synonym junction, sorted.
    pub synonyms: Vec<String>,
}
