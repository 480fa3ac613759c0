//! # AGR Curation
//!
//! Client library and tooling for the Alliance curation database.
//!
//! Independent components share one connection layer:
//!
//! - **Ontology search**: tiered term lookup (exact → prefix → contains)
//!   across the 45 ontology vocabularies stored in the unified
//!   `ontologyterm` table, with optional synonym matching and CURIE
//!   exclusion.
//! - **Gene and allele lookups**: symbol listings by taxon or data
//!   provider, with pagination.
//! - **Schema drift comparator**: introspects a baseline and a candidate
//!   database, diffs tables, columns and indexes, and publishes a
//!   notification when they have drifted apart.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ OntologySearch │──▶│ tier queries │──▶│  curation DB │
//! └────────────────┘   └──────────────┘   └──────────────┘
//!
//! ┌────────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   introspect   │──▶│ compute_diff │──▶│   Notifier   │
//! │  (base ∥ cand) │   │              │   │  webhook/log │
//! └────────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! agr-curation search "mitochondrion inheritance" --type GOTerm --exact
//! agr-curation anatomy pharynx --provider WB
//! agr-curation go kinase --aspect molecular_function
//! agr-curation compare-schemas --skip-notification
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment fallback |
//! | [`db`] | Connection pools |
//! | [`error`] | Typed failure kinds |
//! | [`ontology`] | Recognized ontology types and provider mappings |
//! | [`models`] | Search result records |
//! | [`entities`] | Gene and allele lookups |
//! | [`search`] | Tiered ontology search |
//! | [`schema`] | Schema snapshots and introspection |
//! | [`diff`] | Snapshot diff and report |
//! | [`notify`] | Drift notification channels |
//! | [`comparator`] | Drift comparison entry points |

pub mod comparator;
pub mod config;
pub mod db;
pub mod diff;
pub mod entities;
pub mod error;
pub mod models;
pub mod notify;
pub mod ontology;
pub mod schema;
pub mod search;

pub use entities::{EntityLookup, Page};
pub use error::{CurationError, Result};
pub use models::OntologyTerm;
pub use ontology::OntologyType;
pub use search::{MatchTier, OntologySearch, SearchRequest};
