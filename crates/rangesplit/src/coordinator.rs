//! Split-by-interval query execution.
//!
//! This module defines [`SplitByInterval`], a [`Handler`] that wraps a
//! downstream handler and answers a time-ranged query by fanning it out over
//! fixed-length sub-ranges.
//!
//! ## Responsibilities
//!
//! - Resolve the tenant and its parallelism limit.
//! - Split the query range with [`split_by_time`], newest first for
//!   [`Direction::Backward`] queries.
//! - Run the sub-ranges through the [`Scheduler`] with the query's limit as
//!   the early-exit budget.
//! - Merge the collected partial responses into one.

use crate::{
    config::SplitConfig,
    context::QueryContext,
    error::{Error, Result},
    handler::Handler,
    limits::Limits,
    merge::Merger,
    pool::{Scheduler, WorkItem},
    query::{Direction, TimeQuery},
    split::split_by_time,
    telemetry,
    tenant::{ContextTenant, TenantResolver},
};
use core::future::Future;
use std::{sync::Arc, time::Instant};
use tokio::time::timeout;

/// Splits queries by a fixed interval and executes the pieces concurrently
/// against the wrapped handler.
///
/// Collaborators are injected at construction:
///
/// - `H`: downstream [`Handler`] answering each sub-range.
/// - `L`: per-tenant [`Limits`].
/// - `M`: [`Merger`] combining partial responses.
/// - `T`: [`TenantResolver`], [`ContextTenant`] by default.
///
/// Because `SplitByInterval` is itself a [`Handler`], it can be wrapped by
/// further middleware, or built through [`SplitByIntervalLayer`].
///
/// [`SplitByIntervalLayer`]: crate::SplitByIntervalLayer
pub struct SplitByInterval<H, L, M, T = ContextTenant> {
    next: Arc<H>,
    limits: L,
    merger: M,
    tenants: T,
    config: SplitConfig,
    scheduler: Scheduler,
}

impl<H, L, M> SplitByInterval<H, L, M, ContextTenant> {
    pub fn new(next: H, limits: L, merger: M, config: SplitConfig) -> Self {
        Self::with_tenant_resolver(next, limits, merger, ContextTenant, config)
    }
}

impl<H, L, M, T> SplitByInterval<H, L, M, T> {
    pub fn with_tenant_resolver(next: H, limits: L, merger: M, tenants: T, config: SplitConfig) -> Self {
        Self {
            next: Arc::new(next),
            limits,
            merger,
            tenants,
            config,
            scheduler: Scheduler::new(),
        }
    }

    pub const fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn inner(&self) -> &H {
        &self.next
    }

    /// Stops accepting queries and waits for outstanding feeder and worker
    /// tasks to finish.
    ///
    /// Queries already running keep going until they return; new calls fail
    /// with [`Error::ServiceShutdown`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShutdownTimeout`] if tasks are still running after
    /// the configured shutdown timeout.
    pub async fn shutdown(&self) -> Result<()> {
        let tasks = self.scheduler.tasks();

        #[cfg(feature = "tracing")]
        tracing::info!("Refusing new queries, draining {} task(s)", tasks.len());
        tasks.close();

        match timeout(self.config.shutdown_timeout(), tasks.wait()).await {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("All split query tasks drained");
                Ok(())
            }
            Err(_) => {
                let pending = tasks.len();
                #[cfg(feature = "tracing")]
                tracing::warn!("Graceful drain timed out ({pending} tasks still active)");
                Err(Error::ShutdownTimeout { pending })
            }
        }
    }
}

impl<H, L, M, T> SplitByInterval<H, L, M, T>
where
    H: Handler,
    L: Limits,
    M: Merger<H::Response>,
    T: TenantResolver,
{
    /// Answers `query` by splitting it into sub-ranges of the configured
    /// interval.
    ///
    /// # Errors
    ///
    /// - [`Error::TenantResolution`] before any work starts.
    /// - Any error from [`Scheduler::process`], unchanged.
    /// - Any error from the merger, unchanged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "split_by_interval",
            skip_all,
            fields(org_id, n_intervals, query = %query.query)
        )
    )]
    pub async fn split_query(&self, ctx: &QueryContext, query: TimeQuery) -> Result<H::Response> {
        let started = Instant::now();
        let org_id = self.tenants.resolve(ctx)?;

        let mut intervals = split_by_time(&query, self.config.interval());

        telemetry::increment_queries();
        telemetry::record_intervals_per_query(intervals.len() as u64);
        #[cfg(feature = "tracing")]
        {
            let span = tracing::Span::current();
            span.record("org_id", org_id.as_str());
            span.record("n_intervals", intervals.len());
        }

        if query.direction == Direction::Backward {
            intervals.reverse();
        }

        let input: Vec<WorkItem<H::Response>> =
            intervals.into_iter().map(WorkItem::new).collect();

        let parallelism = self.limits.max_query_parallelism(&org_id);
        let responses = self
            .scheduler
            .process(ctx, &self.next, parallelism, i64::from(query.limit), input)
            .await?;

        let merged = self.merger.merge(responses)?;
        telemetry::record_query_duration(started.elapsed().as_secs_f64() * 1_000.0);
        Ok(merged)
    }
}

impl<H, L, M, T> Handler for SplitByInterval<H, L, M, T>
where
    H: Handler,
    L: Limits,
    M: Merger<H::Response>,
    T: TenantResolver,
{
    type Response = H::Response;

    fn handle(
        &self,
        ctx: &QueryContext,
        query: TimeQuery,
    ) -> impl Future<Output = Result<Self::Response>> + Send {
        self.split_query(ctx, query)
    }
}
