//! Error types for split query execution.
//!
//! This module defines the central `Error` enum, which captures every failure
//! a split query can surface to its caller. Errors are never swallowed and
//! never retried here; a failing sub-range fails the whole query.
//!
//! ## Error Cases
//! - `Cancelled`: The caller's context was cancelled while results were
//!   pending.
//! - `DeadlineExceeded`: The caller's deadline passed while results were
//!   pending.
//! - `TenantResolution`: No tenant could be resolved from the context.
//! - `Subquery`: The downstream handler failed for one of the sub-ranges.
//! - `Merge`: The merger could not combine the partial responses.
//! - `InvalidConfig`: A configuration value was rejected at construction.
//! - `ChannelError`: A worker went away without delivering a result.
//! - `ServiceShutdown`: A query arrived after shutdown began.
//! - `ShutdownTimeout`: Outstanding tasks did not drain in time.

use std::sync::Arc;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for split query execution.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// The parent context was cancelled while waiting on results.
    #[error("Query cancelled")]
    Cancelled,

    /// The parent context's deadline passed while waiting on results.
    #[error("Query deadline exceeded")]
    DeadlineExceeded,

    /// The tenant identity was missing or invalid.
    #[error("Tenant resolution failed: {reason}")]
    TenantResolution { reason: String },

    /// The downstream handler returned an error for a sub-range.
    #[error("Sub-query failed: {0}")]
    Subquery(Arc<dyn core::error::Error + Send + Sync>),

    /// The merger failed to combine partial responses.
    #[error("Merge failed: {reason}")]
    Merge { reason: String },

    /// A configuration value was rejected.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A per-item channel closed before delivering an outcome.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The splitter is shutting down and refuses new queries.
    #[error("Service is shutting down")]
    ServiceShutdown,

    /// Outstanding tasks were still running when shutdown gave up waiting.
    #[error("Shutdown timed out with {pending} task(s) still running")]
    ShutdownTimeout { pending: usize },
}

impl Error {
    /// Wraps a downstream failure as [`Error::Subquery`].
    pub fn subquery<E>(err: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Subquery(Arc::new(err))
    }

    /// Returns `true` for [`Error::Cancelled`] and [`Error::DeadlineExceeded`].
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("store unavailable")]
    struct StoreDown;

    #[test]
    fn subquery_keeps_source_message() {
        let err = Error::subquery(StoreDown);
        assert_eq!(err.to_string(), "Sub-query failed: store unavailable");
        assert!(!err.is_cancellation());
    }

    #[test]
    fn cancellation_variants() {
        assert!(Error::Cancelled.is_cancellation());
        assert!(Error::DeadlineExceeded.is_cancellation());
        assert!(
            !Error::Merge {
                reason: "x".to_string()
            }
            .is_cancellation()
        );
    }
}
