use crate::error::{Error, Result};
use core::time::Duration;

/// Default upper bound on how long [`shutdown`] waits for outstanding tasks.
///
/// [`shutdown`]: crate::SplitByInterval::shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Validated settings for a [`SplitByInterval`](crate::SplitByInterval).
#[derive(Clone, Copy, Debug)]
pub struct SplitConfig {
    interval: Duration,
    shutdown_timeout: Duration,
}

impl SplitConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::InvalidConfig {
                reason: "split interval must be greater than 0".to_string(),
            });
        }
        Ok(Self {
            interval,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        })
    }

    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_interval() {
        assert!(matches!(
            SplitConfig::new(Duration::ZERO),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn keeps_interval() {
        let config = SplitConfig::new(Duration::from_secs(1800)).unwrap();
        assert_eq!(config.interval(), Duration::from_secs(1800));
        assert_eq!(config.shutdown_timeout(), DEFAULT_SHUTDOWN_TIMEOUT);
    }
}
