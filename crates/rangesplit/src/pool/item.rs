use crate::{error::Result, query::TimeQuery};

/// Result of executing one sub-range: a response or the error that aborts the
/// whole query.
pub type Outcome<R> = Result<R>;

/// A sub-range paired with its private, single-use response channel.
///
/// The channel is a rendezvous channel (capacity zero): the worker that runs
/// the sub-range blocks on delivery until the scheduler takes the outcome or
/// the query is cancelled. Exactly one worker writes to it and only the
/// scheduler reads from it, each at most once.
pub struct WorkItem<R> {
    query: TimeQuery,
    tx: flume::Sender<Outcome<R>>,
    rx: flume::Receiver<Outcome<R>>,
}

impl<R> WorkItem<R> {
    pub fn new(query: TimeQuery) -> Self {
        let (tx, rx) = flume::bounded(0);
        Self { query, tx, rx }
    }

    pub const fn query(&self) -> &TimeQuery {
        &self.query
    }

    /// Separates the worker's half from the scheduler's half.
    pub(crate) fn into_parts(self) -> (Job<R>, flume::Receiver<Outcome<R>>) {
        (
            Job {
                query: self.query,
                tx: self.tx,
            },
            self.rx,
        )
    }
}

/// The half of a [`WorkItem`] handed to a worker.
pub(crate) struct Job<R> {
    pub(crate) query: TimeQuery,
    pub(crate) tx: flume::Sender<Outcome<R>>,
}

impl<R> From<TimeQuery> for WorkItem<R> {
    fn from(query: TimeQuery) -> Self {
        Self::new(query)
    }
}
