//! Schema drift comparator.
//!
//! Introspects a baseline and a candidate database concurrently, diffs the
//! two snapshots, and publishes one notification when they differ. The
//! entry point for deployment-triggered runs is [`handle_event`], which
//! takes the same JSON payload a serverless invocation receives:
//!
//! ```json
//! {"skip_notification": false, "tables_filter": ["gene", "allele"]}
//! ```

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::AnyPool;
use std::collections::BTreeSet;

use crate::config::Config;
use crate::db;
use crate::diff::{compute_diff, SchemaDiff};
use crate::error::Result;
use crate::notify::{DriftNotification, Notifier};
use crate::schema::introspect;

/// Invocation payload. Both fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComparatorEvent {
    #[serde(default)]
    pub skip_notification: bool,
    #[serde(default)]
    pub tables_filter: Option<Vec<String>>,
}

impl ComparatorEvent {
    /// Tables to restrict the comparison to; an empty list means all.
    fn filter(&self) -> Option<BTreeSet<String>> {
        self.tables_filter
            .as_ref()
            .filter(|tables| !tables.is_empty())
            .map(|tables| tables.iter().cloned().collect())
    }
}

/// What happened to the drift notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Delivered through the named channel.
    Published { channel: String },
    /// Drift found but the caller asked for no notification.
    Skipped,
    /// No drift, nothing to send.
    NotNeeded,
    /// Delivery failed; the diff in the outcome is still valid.
    Failed { error: String },
}

/// Result of one comparator invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparatorOutcome {
    pub status_code: u16,
    pub has_changes: bool,
    /// `None` when there is no drift.
    pub diff: Option<SchemaDiff>,
    pub notification: NotificationStatus,
    pub checked_at: DateTime<Utc>,
}

impl ComparatorOutcome {
    pub fn delivery_error(&self) -> Option<&str> {
        match &self.notification {
            NotificationStatus::Failed { error } => Some(error.as_str()),
            _ => None,
        }
    }
}

/// Introspect both databases and diff them.
///
/// The two introspections run concurrently; the diff waits for both.
/// Both sides are filtered by the same `tables_filter`.
pub async fn compare_schemas(
    baseline: &AnyPool,
    candidate: &AnyPool,
    tables_filter: Option<&BTreeSet<String>>,
) -> Result<SchemaDiff> {
    let (baseline_schema, candidate_schema) = tokio::try_join!(
        introspect(baseline, tables_filter),
        introspect(candidate, tables_filter)
    )?;
    Ok(compute_diff(&baseline_schema, &candidate_schema))
}

/// Compare two pools and notify on drift.
///
/// Fails only if introspection fails. A notification failure is recorded in
/// the returned outcome alongside the diff.
pub async fn run_comparison(
    baseline: &AnyPool,
    candidate: &AnyPool,
    event: &ComparatorEvent,
    notifier: &dyn Notifier,
    labels: (&str, &str),
) -> Result<ComparatorOutcome> {
    let (base_label, target_label) = labels;
    let filter = event.filter();
    let diff = compare_schemas(baseline, candidate, filter.as_ref()).await?;
    let has_changes = !diff.is_empty();

    let notification = if !has_changes {
        tracing::info!("no schema differences found");
        NotificationStatus::NotNeeded
    } else if event.skip_notification {
        tracing::info!("schema drift detected (notification skipped)");
        NotificationStatus::Skipped
    } else {
        let message = DriftNotification::new(diff.clone(), base_label, target_label);
        match notifier.publish(&message).await {
            Ok(()) => {
                tracing::info!(
                    channel = notifier.name(),
                    "schema drift detected and notification sent"
                );
                NotificationStatus::Published {
                    channel: notifier.name().to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(
                    channel = notifier.name(),
                    error = %e,
                    "drift notification failed"
                );
                NotificationStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    };

    Ok(ComparatorOutcome {
        status_code: 200,
        has_changes,
        diff: has_changes.then_some(diff),
        notification,
        checked_at: Utc::now(),
    })
}

/// Serverless-style entry point: connect to both configured databases,
/// compare, notify, and release the pools.
pub async fn handle_event(
    config: &Config,
    event: &ComparatorEvent,
    notifier: &dyn Notifier,
) -> anyhow::Result<ComparatorOutcome> {
    let comparator = &config.comparator;
    let baseline_url = comparator
        .baseline_url
        .as_deref()
        .context("comparator.baseline_url is not set (or AGR_BASELINE_DB_URL)")?;
    let candidate_url = comparator
        .candidate_url
        .as_deref()
        .context("comparator.candidate_url is not set (or AGR_CANDIDATE_DB_URL)")?;

    tracing::info!(
        base = %comparator.baseline_label,
        target = %comparator.candidate_label,
        skip_notification = event.skip_notification,
        "schema comparison triggered"
    );

    let baseline = db::connect_url(baseline_url, &config.db)
        .await
        .with_context(|| "Failed to connect to baseline database")?;
    let candidate = match db::connect_url(candidate_url, &config.db).await {
        Ok(pool) => pool,
        Err(e) => {
            baseline.close().await;
            return Err(e).with_context(|| "Failed to connect to candidate database");
        }
    };

    let outcome = run_comparison(
        &baseline,
        &candidate,
        event,
        notifier,
        (
            comparator.baseline_label.as_str(),
            comparator.candidate_label.as_str(),
        ),
    )
    .await;

    baseline.close().await;
    candidate.close().await;

    Ok(outcome?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_defaults() {
        let event: ComparatorEvent = serde_json::from_str("{}").unwrap();
        assert!(!event.skip_notification);
        assert!(event.filter().is_none());
    }

    #[test]
    fn test_empty_filter_means_all_tables() {
        let event: ComparatorEvent =
            serde_json::from_str(r#"{"tables_filter": []}"#).unwrap();
        assert!(event.filter().is_none());

        let event: ComparatorEvent =
            serde_json::from_str(r#"{"skip_notification": true, "tables_filter": ["gene"]}"#)
                .unwrap();
        assert!(event.skip_notification);
        assert_eq!(event.filter().unwrap().len(), 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ComparatorOutcome {
            status_code: 200,
            has_changes: false,
            diff: None,
            notification: NotificationStatus::NotNeeded,
            checked_at: Utc::now(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["hasChanges"], false);
        assert!(json["diff"].is_null());
        assert_eq!(json["notification"]["status"], "not_needed");
        assert!(outcome.delivery_error().is_none());
    }
}
