//! Bounded fan-out of sub-ranges with ordered, budgeted collection.
//!
//! [`Scheduler::process`] starts one feeder task and a bounded set of worker
//! tasks, then reads outcomes back in submission order. Every exit path
//! (completion, early exit, error, cancellation) cancels the query-scoped
//! token exactly once, which releases the feeder and all workers.

use super::{
    feeder::feed,
    item::{Outcome, WorkItem},
    worker::worker_loop,
};
use crate::{
    context::QueryContext,
    error::{Error, Result},
    handler::{Handler, Response},
    telemetry,
};
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// Runs split queries on a tracked set of tokio tasks.
///
/// All feeder and worker tasks are spawned on the scheduler's
/// [`TaskTracker`], so callers can wait for every task to terminate after a
/// query returns or during shutdown.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    tasks: TaskTracker,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker owning every feeder and worker task spawned so far.
    pub const fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    /// Executes `input` on at most `parallelism` workers and collects the
    /// responses in input order.
    ///
    /// Collection stops early, with success, once the summed
    /// [`Response::entry_count`] of the collected prefix reaches `threshold`.
    /// Remaining sub-queries are cancelled in that case.
    ///
    /// # Errors
    ///
    /// - The first failing outcome (in input order) is returned unchanged and
    ///   all collected responses are discarded.
    /// - [`Error::Cancelled`] or [`Error::DeadlineExceeded`] if `ctx` is done
    ///   while an outcome is pending.
    /// - [`Error::ServiceShutdown`] if [`shutdown`] has begun.
    ///
    /// [`shutdown`]: crate::SplitByInterval::shutdown
    pub async fn process<H>(
        &self,
        ctx: &QueryContext,
        handler: &Arc<H>,
        parallelism: usize,
        threshold: i64,
        input: Vec<WorkItem<H::Response>>,
    ) -> Result<Vec<H::Response>>
    where
        H: Handler,
    {
        if self.tasks.is_closed() {
            return Err(Error::ServiceShutdown);
        }

        let ctx = ctx.child();
        // Cancels the feeder and every worker on any return below.
        let _guard = ctx.token().clone().drop_guard();

        let (jobs, pending): (Vec<_>, Vec<_>) =
            input.into_iter().map(WorkItem::into_parts).unzip();

        let jobs = feed(&self.tasks, ctx.clone(), jobs);

        let workers = worker_count(parallelism, pending.len());
        for worker_id in 0..workers {
            self.tasks.spawn(worker_loop(
                worker_id,
                ctx.clone(),
                Arc::clone(handler),
                jobs.clone(),
            ));
        }
        drop(jobs);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            items = pending.len(),
            workers,
            threshold,
            "Dispatching sub-ranges"
        );

        let mut responses = Vec::with_capacity(pending.len());
        let mut remaining = threshold;

        for (index, rx) in pending.into_iter().enumerate() {
            let outcome: Outcome<H::Response> = tokio::select! {
                biased;
                () = ctx.done() => Err(aborted(&ctx)),
                received = rx.recv_async() => match received {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ctx.err().unwrap_or_else(|| Error::ChannelError {
                        context: format!("sub-range {index} closed without an outcome"),
                    })),
                },
            };

            let response = match outcome {
                Ok(response) => response,
                Err(e) => {
                    if e.is_cancellation() {
                        telemetry::increment_cancellations();
                    }
                    #[cfg(feature = "tracing")]
                    tracing::debug!(index, "Aborting split query: {e}");
                    return Err(e);
                }
            };

            let entries = i64::try_from(response.entry_count()).unwrap_or(i64::MAX);
            remaining = remaining.saturating_sub(entries);
            responses.push(response);

            if remaining <= 0 {
                telemetry::increment_early_exits();
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    collected = responses.len(),
                    "Result limit reached, cancelling remaining sub-ranges"
                );
                return Ok(responses);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(collected = responses.len(), "All sub-ranges completed");
        Ok(responses)
    }
}

/// Number of workers to start: never more than there are items to run.
///
/// A parallelism of zero is treated as one so a query always makes progress.
pub(crate) fn worker_count(parallelism: usize, items: usize) -> usize {
    parallelism.max(1).min(items)
}

fn aborted(ctx: &QueryContext) -> Error {
    ctx.err().unwrap_or(Error::Cancelled)
}
