use anyhow::Result;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;

use crate::config::{Config, DbConfig};

/// Pool for the curation database named in `[db]`.
pub async fn connect(config: &Config) -> Result<AnyPool> {
    let url = config.database_url()?;
    Ok(connect_url(&url, &config.db).await?)
}

/// Pool for an arbitrary `postgres://` or `sqlite://` URL.
///
/// The pool is owned by the caller; searches and comparisons only borrow
/// connections from it for the duration of one operation.
pub async fn connect_url(url: &str, db: &DbConfig) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(db.max_connections)
        .acquire_timeout(Duration::from_secs(db.acquire_timeout_secs))
        .connect(url)
        .await?;

    tracing::debug!(backend = backend_of(url), "database pool ready");
    Ok(pool)
}

fn backend_of(url: &str) -> &str {
    url.split(':').next().unwrap_or("unknown")
}
