//! Error taxonomy for the search engine and the schema comparator.
//!
//! Callers key retry and alerting decisions off the variant, so database
//! failures are never folded into an empty result and a notification
//! failure never hides a computed diff.

use thiserror::Error;

use crate::search::MatchTier;

/// Errors returned by library operations.
#[derive(Debug, Error)]
pub enum CurationError {
    /// The ontology type is not one of the recognized discriminator values.
    /// Raised before any query is issued.
    #[error("unrecognized ontology type: '{0}'")]
    InvalidOntologyType(String),

    /// The data provider has no ontology for the requested lookup.
    #[error("no {kind} ontology known for data provider '{provider}'")]
    UnknownDataProvider { provider: String, kind: &'static str },

    /// The request itself is malformed (empty text, zero limit, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connectivity or SQL failure reported by the database driver.
    #[error("data access error: {0}")]
    DataAccess(#[from] sqlx::Error),

    /// A tier query exceeded its time budget.
    #[error("{tier} tier query timed out after {timeout_ms} ms")]
    QueryTimeout { tier: MatchTier, timeout_ms: u64 },

    /// The drift notification could not be delivered.
    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),
}

impl CurationError {
    /// Whether the failure is transient and worth retrying with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CurationError::DataAccess(_)
                | CurationError::QueryTimeout { .. }
                | CurationError::NotificationDelivery(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_not_retryable() {
        assert!(!CurationError::InvalidOntologyType("FooTerm".into()).is_retryable());
        assert!(!CurationError::InvalidRequest("empty".into()).is_retryable());
    }

    #[test]
    fn test_timeout_message_names_tier() {
        let err = CurationError::QueryTimeout {
            tier: MatchTier::Contains,
            timeout_ms: 250,
        };
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "contains tier query timed out after 250 ms");
    }
}
