use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub comparator: ComparatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    /// Full connection URL. When absent, built from `PERSISTENT_STORE_DB_*`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}
fn default_acquire_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
    #[serde(default = "default_tier_timeout_ms")]
    pub tier_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            tier_timeout_ms: default_tier_timeout_ms(),
        }
    }
}

fn default_limit() -> i64 {
    20
}
fn default_max_limit() -> i64 {
    500
}
fn default_tier_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ComparatorConfig {
    #[serde(default)]
    pub baseline_url: Option<String>,
    #[serde(default)]
    pub candidate_url: Option<String>,
    #[serde(default = "default_baseline_label")]
    pub baseline_label: String,
    #[serde(default = "default_candidate_label")]
    pub candidate_label: String,
    #[serde(default)]
    pub notification: NotificationConfig,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            baseline_url: None,
            candidate_url: None,
            baseline_label: default_baseline_label(),
            candidate_label: default_candidate_label(),
            notification: NotificationConfig::default(),
        }
    }
}

fn default_baseline_label() -> String {
    "production".to_string()
}
fn default_candidate_label() -> String {
    "alpha".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// HTTP endpoint receiving the drift message. Log-only when absent.
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_notify_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            subject: default_subject(),
            timeout_secs: default_notify_timeout_secs(),
        }
    }
}

fn default_subject() -> String {
    "[AGR] Schema Drift Detected: Alpha vs Production".to_string()
}
fn default_notify_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Configuration assembled from the environment alone.
    ///
    /// Used when no config file is present, e.g. inside a serverless
    /// runtime where everything arrives as environment variables.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("AGR_BASELINE_DB_URL") {
            self.comparator.baseline_url = Some(url);
        }
        if let Ok(url) = std::env::var("AGR_CANDIDATE_DB_URL") {
            self.comparator.candidate_url = Some(url);
        }
        if let Ok(url) = std::env::var("AGR_NOTIFY_WEBHOOK_URL") {
            self.comparator.notification.webhook_url = Some(url);
        }
    }

    /// URL of the curation database used for searches.
    pub fn database_url(&self) -> Result<String> {
        match &self.db.url {
            Some(url) => Ok(url.clone()),
            None => persistent_store_url(|key| std::env::var(key).ok()),
        }
    }
}

/// Build a PostgreSQL URL from the `PERSISTENT_STORE_DB_*` variables.
///
/// Credentials are percent-encoded, so passwords containing `@` or `/`
/// survive the round trip.
fn persistent_store_url(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

    let host = get("PERSISTENT_STORE_DB_HOST", "localhost");
    let port: u16 = get("PERSISTENT_STORE_DB_PORT", "5432")
        .parse()
        .with_context(|| "PERSISTENT_STORE_DB_PORT must be a port number")?;
    let name = get("PERSISTENT_STORE_DB_NAME", "unknown");

    let mut url = reqwest::Url::parse(&format!("postgres://{}:{}/{}", host, port, name))
        .with_context(|| format!("Invalid database host: {}", host))?;
    url.set_username(&get("PERSISTENT_STORE_DB_USERNAME", "unknown"))
        .map_err(|_| anyhow::anyhow!("Cannot set database username"))?;
    url.set_password(Some(&get("PERSISTENT_STORE_DB_PASSWORD", "unknown")))
        .map_err(|_| anyhow::anyhow!("Cannot set database password"))?;

    Ok(url.to_string())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;
    config.apply_env_overrides();
    Ok(config)
}

fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.db.max_connections == 0 {
        anyhow::bail!("db.max_connections must be > 0");
    }

    if config.search.default_limit < 1 {
        anyhow::bail!("search.default_limit must be >= 1");
    }

    if config.search.max_limit < config.search.default_limit {
        anyhow::bail!("search.max_limit must be >= search.default_limit");
    }

    if config.search.tier_timeout_ms == 0 {
        anyhow::bail!("search.tier_timeout_ms must be > 0");
    }

    Ok(config)
}
