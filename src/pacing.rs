use std::thread;
use std::time::Duration;

pub const DEFAULT_INTERVAL_SECS: u64 = 4;

/// Fixed pause between two consecutive barcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    interval: Duration,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Non-positive values fall back to the default of four seconds.
    pub fn from_secs(secs: i64) -> Self {
        let secs = u64::try_from(secs)
            .ok()
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_INTERVAL_SECS);
        Self::new(Duration::from_secs(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn wait(&self) {
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_INTERVAL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn non_positive_interval_is_coerced() {
        assert_eq!(RateLimiter::from_secs(0).interval(), Duration::from_secs(4));
        assert_eq!(RateLimiter::from_secs(-3).interval(), Duration::from_secs(4));
        assert_eq!(RateLimiter::from_secs(7).interval(), Duration::from_secs(7));
    }

    #[test]
    fn wait_blocks_for_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(30));
        let start = Instant::now();
        limiter.wait();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
