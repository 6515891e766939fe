use super::item::Job;
use crate::{context::QueryContext, handler::Handler, telemetry};
use std::sync::Arc;

/// Worker task that executes sub-ranges pulled from the shared job channel.
///
/// For every [`Job`], the worker runs the downstream handler under `ctx` and
/// then hands the outcome to the scheduler over the job's private rendezvous
/// channel. The worker only ever waits on its own delivery, so workers finish
/// out of order while the scheduler still reads in submission order.
///
/// The loop ends when the shared channel closes or when `ctx` is done while a
/// delivery is pending; in the latter case the outcome is dropped.
///
/// # Arguments
///
/// - `worker_id`: Index of this worker within the current query (used for
///   logs/tracing).
/// - `ctx`: The query-scoped context shared by the feeder and all workers.
/// - `handler`: Downstream executor for individual sub-ranges.
/// - `jobs`: Shared multi-consumer channel fed by the feeder.
pub(crate) async fn worker_loop<H>(
    worker_id: usize,
    ctx: QueryContext,
    handler: Arc<H>,
    jobs: flume::Receiver<Job<H::Response>>,
) where
    H: Handler,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    while let Ok(Job { query, tx }) = jobs.recv_async().await {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!(
            "interval",
            worker_id,
            query = %query.query,
            start = ?query.start,
            end = ?query.end,
            direction = ?query.direction,
            limit = query.limit,
        );

        let step = async {
            telemetry::increment_subqueries();
            let outcome = handler.handle(&ctx, query).await;
            if outcome.is_err() {
                telemetry::increment_subquery_errors();
            }

            tokio::select! {
                biased;
                () = ctx.done() => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Worker {worker_id} dropping outcome, query is done");
                    false
                }
                delivered = tx.send_async(outcome) => {
                    if let Err(_e) = delivered {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("Worker {worker_id} failed to deliver outcome: {_e}");
                    }
                    true
                }
            }
        };

        #[cfg(feature = "tracing")]
        let step = {
            use tracing::Instrument;
            step.instrument(span)
        };

        if !step.await {
            break;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}
