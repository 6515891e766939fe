//! Request-scoped cancellation, deadline, and tenant identity.
//!
//! A [`QueryContext`] travels with every query and every sub-query. It bundles
//! the [`CancellationToken`] that all suspension points observe, an optional
//! deadline inherited by children, and the tenant (org) id the query runs on
//! behalf of.

use crate::error::Error;
use core::time::Duration;
use std::sync::Arc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default)]
pub struct QueryContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    org_id: Option<Arc<str>>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context driven by an existing token, e.g. a service-wide
    /// shutdown token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_org_id(mut self, org_id: impl Into<Arc<str>>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Sets the deadline, keeping the earlier one if a deadline already
    /// exists.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a child context. Cancelling the child leaves the parent
    /// untouched; cancelling the parent cancels the child.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            org_id: self.org_id.clone(),
        }
    }

    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Completes once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Reports why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn child_cancel_does_not_reach_parent() {
        let parent = QueryContext::new().with_org_id("tenant-a");
        let child = parent.child();

        child.cancel();
        child.done().await;

        assert!(matches!(child.err(), Some(Error::Cancelled)));
        assert!(parent.err().is_none());
        assert_eq!(child.org_id(), Some("tenant-a"));
    }

    #[tokio::test]
    async fn parent_cancel_reaches_child() {
        let parent = QueryContext::new();
        let child = parent.child();

        parent.cancel();
        child.done().await;

        assert!(child.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_reports_exceeded() {
        let ctx = QueryContext::new().with_timeout(Duration::from_millis(50));
        assert!(ctx.err().is_none());

        ctx.done().await;

        assert!(matches!(ctx.err(), Some(Error::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_deadline_wins() {
        let early = Instant::now() + Duration::from_millis(10);
        let late = Instant::now() + Duration::from_secs(10);

        let ctx = QueryContext::new().with_deadline(early).with_deadline(late);
        assert_eq!(ctx.deadline(), Some(early));
        assert_eq!(ctx.child().deadline(), Some(early));
    }
}
