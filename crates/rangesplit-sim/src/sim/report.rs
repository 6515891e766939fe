use super::{config::SimConfig, store::LogBatch};
use core::{fmt, time::Duration};
use rangesplit::{Direction, Response};
use serde::Serialize;

/// Outcome of one simulated query, printed once the query returns.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub org_id: &'a str,
    pub direction: Direction,
    pub limit: u32,
    pub interval_secs: u64,
    pub parallelism: usize,
    pub elapsed_ms: f64,
    pub entries: u64,
    pub result: &'a LogBatch,
}

impl<'a> Report<'a> {
    pub fn new(config: &'a SimConfig, result: &'a LogBatch, elapsed: Duration) -> Self {
        Self {
            org_id: &config.org_id,
            direction: config.direction,
            limit: config.limit,
            interval_secs: config.split.interval().as_secs(),
            parallelism: config.parallelism,
            elapsed_ms: elapsed.as_secs_f64() * 1_000.0,
            entries: result.entry_count(),
            result,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} entries from {} sub-range(s) in {:.1}ms (org={}, direction={:?}, limit={}, interval={}s, parallelism={})",
            self.entries,
            self.result.slices.len(),
            self.elapsed_ms,
            self.org_id,
            self.direction,
            self.limit,
            self.interval_secs,
            self.parallelism,
        )?;
        for slice in &self.result.slices {
            writeln!(f, "  [{}, {}) {:>8}", slice.start, slice.end, slice.entries)?;
        }
        Ok(())
    }
}
