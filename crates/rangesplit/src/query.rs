use core::time::Duration;
use std::time::SystemTime;

/// Traversal order of a time-ranged query.
///
/// `Backward` queries want the most recent entries first, so sub-ranges are
/// dispatched newest to oldest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// A query over the half-open time interval `[start, end)`.
///
/// A sub-range produced by the splitter is itself a `TimeQuery`; it carries
/// every field of its parent unchanged except `start` and `end`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeQuery {
    pub query: String,
    /// Maximum number of entries the caller wants back. Also the early-exit
    /// budget when the query is split.
    pub limit: u32,
    pub step: Duration,
    pub direction: Direction,
    pub path: String,
    pub start: SystemTime,
    pub end: SystemTime,
}

impl TimeQuery {
    pub fn new(query: impl Into<String>, start: SystemTime, end: SystemTime) -> Self {
        Self {
            query: query.into(),
            limit: 0,
            step: Duration::ZERO,
            direction: Direction::Forward,
            path: String::new(),
            start,
            end,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Returns a copy of this query restricted to `[start, end)`.
    #[must_use]
    pub fn with_range(&self, start: SystemTime, end: SystemTime) -> Self {
        Self {
            query: self.query.clone(),
            limit: self.limit,
            step: self.step,
            direction: self.direction,
            path: self.path.clone(),
            start,
            end,
        }
    }

    /// Length of the interval, or zero when `start >= end`.
    pub fn span(&self) -> Duration {
        self.end.duration_since(self.start).unwrap_or(Duration::ZERO)
    }
}
