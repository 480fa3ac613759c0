//! # AGR Curation CLI (`agr-curation`)
//!
//! Command-line front end for the curation database client. It runs
//! tiered ontology searches and gene/allele listings against the curation
//! database, and triggers schema drift comparisons between two databases.
//!
//! ## Usage
//!
//! ```bash
//! agr-curation --config ./config/agr-curation.toml <command>
//! ```
//!
//! When the config file does not exist, settings are read from the
//! environment (`PERSISTENT_STORE_DB_*`, `AGR_BASELINE_DB_URL`,
//! `AGR_CANDIDATE_DB_URL`, `AGR_NOTIFY_WEBHOOK_URL`).
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `agr-curation search "<text>" --type <T>` | Tiered search in one ontology |
//! | `agr-curation anatomy "<text>" --provider <P>` | Anatomy terms for a data provider |
//! | `agr-curation life-stage "<text>" --provider <P>` | Stage terms for a data provider |
//! | `agr-curation go "<text>"` | GO terms, optionally by aspect |
//! | `agr-curation genes --taxon <CURIE>` | Gene symbols of one taxon |
//! | `agr-curation alleles --taxon <CURIE>` | Allele symbols by taxon or provider |
//! | `agr-curation types` | List recognized ontology types |
//! | `agr-curation compare-schemas` | Diff baseline and candidate schemas |
//!
//! ## Examples
//!
//! ```bash
//! # Exact lookup
//! agr-curation search "mitochondrion inheritance" --type GOTerm --exact
//!
//! # Fallback search including synonyms, excluding one term
//! agr-curation search nucleus --type GOTerm --synonyms --exclude GO:0005634
//!
//! # Drift check without notifying anyone
//! agr-curation compare-schemas --skip-notification
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use agr_curation::comparator::{self, ComparatorEvent};
use agr_curation::config::{self, Config};
use agr_curation::ontology::GoAspect;
use agr_curation::{
    db, notify, EntityLookup, OntologySearch, OntologyTerm, OntologyType, Page, SearchRequest,
};

/// AGR curation database client.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/agr-curation.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "agr-curation",
    about = "Ontology search and schema drift checks for the AGR curation database",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/agr-curation.toml`. If the file is missing,
    /// configuration is taken from environment variables.
    #[arg(long, global = true, default_value = "./config/agr-curation.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Search one ontology with exact → prefix → contains fallback.
    Search {
        /// Text to match against term names.
        text: String,

        /// Ontology type discriminator, e.g. `GOTerm` or `DOTerm`.
        #[arg(long = "type", value_name = "TYPE")]
        ontology_type: String,

        /// Only run the exact tier.
        #[arg(long)]
        exact: bool,

        /// Also match synonym labels.
        #[arg(long)]
        synonyms: bool,

        /// CURIE to leave out of the results. Repeatable.
        #[arg(long, value_name = "CURIE")]
        exclude: Vec<String>,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<i64>,

        /// Restrict to one namespace value.
        #[arg(long)]
        namespace: Option<String>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Anatomy terms from the ontology a data provider uses.
    Anatomy {
        text: String,

        /// Data provider abbreviation (WB, FB, ZFIN, MGI, XB, RGD, HUMAN).
        #[arg(long)]
        provider: String,

        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Developmental stage terms from the provider's stage ontology.
    LifeStage {
        text: String,

        /// Data provider abbreviation (WB, FB, ZFIN, MGI, XB).
        #[arg(long)]
        provider: String,

        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// GO terms, optionally restricted to one aspect.
    Go {
        text: String,

        /// `biological_process`, `molecular_function` or `cellular_component`
        /// (short forms `bp`, `mf`, `cc` accepted).
        #[arg(long)]
        aspect: Option<String>,

        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Genes of one taxon, ordered by primary external id.
    Genes {
        /// Taxon CURIE, e.g. `NCBITaxon:6239`.
        #[arg(long)]
        taxon: String,

        /// Also list obsolete genes and symbols.
        #[arg(long)]
        include_obsolete: bool,

        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        offset: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Alleles of one taxon or one data provider.
    Alleles {
        /// Taxon CURIE, e.g. `NCBITaxon:10090`.
        #[arg(long, conflicts_with = "provider", required_unless_present = "provider")]
        taxon: Option<String>,

        /// Data provider abbreviation, e.g. `WB`.
        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        offset: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// List the recognized ontology types.
    Types,

    /// Compare the baseline and candidate database schemas.
    ///
    /// Prints the outcome as JSON. Exits non-zero when drift was found but
    /// the notification could not be delivered.
    CompareSchemas {
        /// JSON event payload (`skip_notification`, `tables_filter`).
        #[arg(long, value_name = "FILE")]
        event: Option<PathBuf>,

        /// Do not publish a notification even if drift is found.
        #[arg(long)]
        skip_notification: bool,

        /// Only compare this table. Repeatable.
        #[arg(long = "table", value_name = "NAME")]
        tables: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Commands that don't require config
    if let Commands::Types = cli.command {
        for ontology_type in OntologyType::ALL {
            println!("{}", ontology_type);
        }
        return Ok(());
    }

    let cfg = load_or_env(&cli.config)?;

    match cli.command {
        Commands::Types => {}
        Commands::Search {
            text,
            ontology_type,
            exact,
            synonyms,
            exclude,
            limit,
            namespace,
            json,
        } => {
            let mut request = SearchRequest::parse(text, &ontology_type)?
                .exact(exact)
                .include_synonyms(synonyms)
                .exclude(exclude);
            request.limit = limit;
            request.namespace = namespace;

            let search = open_search(&cfg).await?;
            let result = search.search_with_tier(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                match result.tier {
                    Some(tier) => println!("{} match, {} result(s):", tier, result.terms.len()),
                    None => println!("No results."),
                }
                print_terms(&result.terms);
            }
        }
        Commands::Anatomy {
            text,
            provider,
            limit,
            json,
        } => {
            let search = open_search(&cfg).await?;
            let terms = search.search_anatomy_terms(&text, &provider, limit).await?;
            emit_terms(&terms, json)?;
        }
        Commands::LifeStage {
            text,
            provider,
            limit,
            json,
        } => {
            let search = open_search(&cfg).await?;
            let terms = search
                .search_life_stage_terms(&text, &provider, limit)
                .await?;
            emit_terms(&terms, json)?;
        }
        Commands::Go {
            text,
            aspect,
            limit,
            json,
        } => {
            let aspect = aspect.map(|a| a.parse::<GoAspect>()).transpose()?;
            let search = open_search(&cfg).await?;
            let terms = search.search_go_terms(&text, aspect, limit).await?;
            emit_terms(&terms, json)?;
        }
        Commands::Genes {
            taxon,
            include_obsolete,
            limit,
            offset,
            json,
        } => {
            let lookup = EntityLookup::new(db::connect(&cfg).await?);
            let genes = lookup
                .get_genes_by_taxon(&taxon, Page::new(limit, offset), include_obsolete)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&genes)?);
            } else {
                print_symbols(genes.iter().map(|g| (&g.curie, &g.gene_symbol.display_text)));
            }
        }
        Commands::Alleles {
            taxon,
            provider,
            limit,
            offset,
            json,
        } => {
            let lookup = EntityLookup::new(db::connect(&cfg).await?);
            let page = Page::new(limit, offset);
            let alleles = match (taxon, provider) {
                (Some(taxon), _) => lookup.get_alleles_by_taxon(&taxon, page).await?,
                (None, Some(provider)) => {
                    lookup.get_alleles_by_data_provider(&provider, page).await?
                }
                (None, None) => anyhow::bail!("Either --taxon or --provider is required"),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&alleles)?);
            } else {
                print_symbols(
                    alleles
                        .iter()
                        .map(|a| (&a.curie, &a.allele_symbol.display_text)),
                );
            }
        }
        Commands::CompareSchemas {
            event,
            skip_notification,
            tables,
        } => {
            let mut payload = match event {
                Some(path) => read_event(&path)?,
                None => ComparatorEvent::default(),
            };
            payload.skip_notification |= skip_notification;
            if !tables.is_empty() {
                payload.tables_filter = Some(tables);
            }

            let notifier = notify::from_config(&cfg.comparator.notification)?;
            let outcome = comparator::handle_event(&cfg, &payload, notifier.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);

            if let Some(error) = outcome.delivery_error() {
                anyhow::bail!("Drift notification failed: {}", error);
            }
        }
    }

    Ok(())
}

fn load_or_env(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using environment");
        Ok(Config::from_env())
    }
}

async fn open_search(cfg: &Config) -> anyhow::Result<OntologySearch> {
    let pool = db::connect(cfg).await?;
    Ok(OntologySearch::new(pool, cfg.search.clone()))
}

fn read_event(path: &Path) -> anyhow::Result<ComparatorEvent> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse event file: {}", path.display()))
}

fn emit_terms(terms: &[OntologyTerm], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(terms)?);
    } else if terms.is_empty() {
        println!("No results.");
    } else {
        print_terms(terms);
    }
    Ok(())
}

fn print_terms(terms: &[OntologyTerm]) {
    for (i, term) in terms.iter().enumerate() {
        println!("{}. {}  {}", i + 1, term.curie, term.name);
        if let Some(ns) = &term.namespace {
            println!("    namespace: {}", ns);
        }
        if !term.synonyms.is_empty() {
            println!("    synonyms: {}", term.synonyms.join(", "));
        }
    }
}

fn print_symbols<'a>(rows: impl Iterator<Item = (&'a String, &'a String)>) {
    let mut count = 0;
    for (id, symbol) in rows {
        println!("{}\t{}", id, symbol);
        count += 1;
    }
    if count == 0 {
        println!("No results.");
    }
}
