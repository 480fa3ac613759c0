//! Drift notifications.
//!
//! When a comparison finds differences, one [`DriftNotification`] is handed
//! to a [`Notifier`]. Delivery is a separate step from diffing: a channel
//! failure is reported as [`CurationError::NotificationDelivery`] and never
//! discards the diff.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::NotificationConfig;
use crate::diff::{format_report, SchemaDiff};
use crate::error::{CurationError, Result};

pub const NOTIFICATION_SOURCE: &str = "lambda-schema-comparator";
pub const DRIFT_EVENT_TYPE: &str = "CONFIRMED_SCHEMA_DRIFT";

const ACTION_REQUIRED: &str =
    "Review these changes and update the curation API client models if needed.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub base: String,
    pub target: String,
}

/// Message body published when schema drift is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftNotification {
    pub source: String,
    pub event_type: String,
    pub comparison: Comparison,
    pub diff: SchemaDiff,
    pub summary: String,
    pub action_required: String,
}

impl DriftNotification {
    pub fn new(diff: SchemaDiff, base: &str, target: &str) -> Self {
        let summary = format!(
            "The {} database has schema changes that differ from {}.\n\n{}",
            target,
            base,
            format_report(&diff, base, target)
        );
        Self {
            source: NOTIFICATION_SOURCE.to_string(),
            event_type: DRIFT_EVENT_TYPE.to_string(),
            comparison: Comparison {
                base: base.to_string(),
                target: target.to_string(),
            },
            diff,
            summary,
            action_required: ACTION_REQUIRED.to_string(),
        }
    }
}

/// A channel drift messages are published to.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Deliver one message.
    async fn publish(&self, message: &DriftNotification) -> Result<()>;
}

/// POSTs the message as JSON to an HTTP endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    subject: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, config: &NotificationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CurationError::NotificationDelivery(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            subject: config.subject.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, message: &DriftNotification) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header("X-Notification-Subject", &self.subject)
            .json(message)
            .send()
            .await
            .map_err(|e| CurationError::NotificationDelivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CurationError::NotificationDelivery(format!(
                "{} returned {}: {}",
                self.url,
                status,
                body.trim()
            )));
        }
        Ok(())
    }
}

/// Writes the message to the log. Used when no channel is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, message: &DriftNotification) -> Result<()> {
        let body = serde_json::to_string(message)
            .map_err(|e| CurationError::NotificationDelivery(e.to_string()))?;
        tracing::warn!(event_type = %message.event_type, body = %body, "schema drift");
        Ok(())
    }
}

/// The channel configured under `[comparator.notification]`.
pub fn from_config(config: &NotificationConfig) -> Result<Box<dyn Notifier>> {
    match &config.webhook_url {
        Some(url) => Ok(Box::new(WebhookNotifier::new(url.clone(), config)?)),
        None => Ok(Box::new(LogNotifier)),
    }
}
