use super::item::Job;
use crate::context::QueryContext;
use tokio_util::task::TaskTracker;

/// Streams `jobs`, in order, onto a shared rendezvous channel.
///
/// The returned receiver is cloned by every worker (multi-consumer). A task
/// spawned on `tasks` sends each job in turn and then drops the sender, which
/// closes the channel and lets idle workers exit. Each send is raced against
/// `ctx`, so the task stops mid-sequence once the query is cancelled instead
/// of waiting on workers that will never receive again.
pub(crate) fn feed<R>(
    tasks: &TaskTracker,
    ctx: QueryContext,
    jobs: Vec<Job<R>>,
) -> flume::Receiver<Job<R>>
where
    R: Send + 'static,
{
    let (tx, rx) = flume::bounded(0);

    tasks.spawn(async move {
        for job in jobs {
            tokio::select! {
                biased;
                () = ctx.done() => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("Feeder stopping on cancellation");
                    return;
                }
                sent = tx.send_async(job) => {
                    if sent.is_err() {
                        #[cfg(feature = "tracing")]
                        tracing::trace!("Feeder stopping, all workers are gone");
                        return;
                    }
                }
            }
        }
    });

    rx
}
