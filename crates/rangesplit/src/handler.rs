//! Collaborator traits for executing queries.
//!
//! The splitter never answers a query itself. It forwards each sub-range to a
//! downstream [`Handler`] and only inspects the result through
//! [`Response::entry_count`], which drives the early-exit budget.

use crate::{context::QueryContext, error::Result, query::TimeQuery};
use core::future::Future;
use std::sync::Arc;

/// A partial or complete query result.
pub trait Response: Send + 'static {
    /// Number of result entries contained in this response.
    fn entry_count(&self) -> u64;
}

/// Executes a [`TimeQuery`].
///
/// Implementations must observe `ctx` and return promptly once it is done.
/// Failures should be reported as [`Error::Subquery`] via [`Error::subquery`].
///
/// [`Error::Subquery`]: crate::Error::Subquery
/// [`Error::subquery`]: crate::Error::subquery
pub trait Handler: Send + Sync + 'static {
    type Response: Response;

    fn handle(
        &self,
        ctx: &QueryContext,
        query: TimeQuery,
    ) -> impl Future<Output = Result<Self::Response>> + Send;
}

impl<H> Handler for Arc<H>
where
    H: Handler,
{
    type Response = H::Response;

    fn handle(
        &self,
        ctx: &QueryContext,
        query: TimeQuery,
    ) -> impl Future<Output = Result<Self::Response>> + Send {
        H::handle(self, ctx, query)
    }
}
