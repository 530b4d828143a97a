use std::time::Duration;

/// Timing for a provider's reconnect worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Pause before reconnecting after a drop. Skipped on the worker's first wake.
    pub hiccup_delay: Duration,
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    /// Cap for the doubled delay.
    pub max_backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            hiccup_delay: Duration::from_secs(30),
            initial_backoff: Duration::from_secs(60),
            max_backoff: Duration::from_secs(60 * 60),
        }
    }
}

/// Doubling delay between consecutive failed attempts.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            failures: 0,
        }
    }

    pub fn from_policy(policy: &ReconnectPolicy) -> Self {
        Self::new(policy.initial_backoff, policy.max_backoff)
    }

    /// Record a failure and return how long to wait before the next attempt:
    /// `initial * 2^(failures - 1)`, saturating at the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = 1u32
            .checked_shl(self.failures)
            .and_then(|factor| self.initial.checked_mul(factor))
            .map_or(self.max, |d| d.min(self.max));
        self.failures = self.failures.saturating_add(1);
        delay
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }
}
