use core::time::Duration;
use rangesplit::{Error, Handler, QueryContext, Response, Result, TimeQuery};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::sleep;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Ingester for sub-range {index} is unavailable")]
    Unavailable { index: usize },
}

/// Entries returned for one sub-range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub start: u64,
    pub end: u64,
    pub entries: u64,
}

/// A merged or partial query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogBatch {
    pub slices: Vec<Slice>,
}

impl Response for LogBatch {
    fn entry_count(&self) -> u64 {
        self.slices.iter().map(|s| s.entries).sum()
    }
}

/// Concatenates partial results in the order they were collected.
pub fn merge_batches(batches: Vec<LogBatch>) -> Result<LogBatch> {
    Ok(LogBatch {
        slices: batches.into_iter().flat_map(|b| b.slices).collect(),
    })
}

/// In-memory log store holding a constant number of entries per second.
///
/// Every lookup waits `latency` before answering, and the sub-range at
/// `fail_index` (counted from `origin` in steps of `interval`) fails.
#[derive(Debug, Clone)]
pub struct SyntheticStore {
    origin: SystemTime,
    interval: Duration,
    entries_per_sec: u64,
    latency: Duration,
    fail_index: Option<usize>,
}

impl SyntheticStore {
    pub const fn new(origin: SystemTime, interval: Duration, entries_per_sec: u64) -> Self {
        Self {
            origin,
            interval,
            entries_per_sec,
            latency: Duration::ZERO,
            fail_index: None,
        }
    }

    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub const fn with_fail_index(mut self, fail_index: Option<usize>) -> Self {
        self.fail_index = fail_index;
        self
    }

    fn index_of(&self, query: &TimeQuery) -> usize {
        let offset = query
            .start
            .duration_since(self.origin)
            .unwrap_or_default()
            .as_nanos();
        usize::try_from(offset / self.interval.as_nanos().max(1)).unwrap_or(usize::MAX)
    }
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

impl Handler for SyntheticStore {
    type Response = LogBatch;

    async fn handle(&self, ctx: &QueryContext, query: TimeQuery) -> Result<LogBatch> {
        let index = self.index_of(&query);

        tokio::select! {
            biased;
            () = ctx.done() => {
                #[cfg(feature = "tracing")]
                tracing::debug!(index, "Sub-range abandoned");
                return Err(ctx.err().unwrap_or(Error::Cancelled));
            }
            () = sleep(self.latency) => {}
        }

        if self.fail_index == Some(index) {
            #[cfg(feature = "tracing")]
            tracing::warn!(index, "Injecting sub-range failure");
            return Err(Error::subquery(StoreError::Unavailable { index }));
        }

        let entries = query.span().as_secs().saturating_mul(self.entries_per_sec);
        Ok(LogBatch {
            slices: vec![Slice {
                start: unix_secs(query.start),
                end: unix_secs(query.end),
                entries,
            }],
        })
    }
}
