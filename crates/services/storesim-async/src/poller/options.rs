use std::time::Duration;

use crate::messages::Locale;

/// Ceiling for the retry delay after a transient error
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(10_000);

/// Budgets and pacing for one poll activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// When false, activations start idle and issue no requests
    pub enabled: bool,
    /// Delay before the second attempt
    pub base_interval: Duration,
    /// Ceiling for the steady-state delay
    pub max_interval: Duration,
    /// Wall-clock budget across all attempts
    pub timeout: Duration,
    /// Attempt budget, counting transient failures
    pub max_attempts: u32,
    /// Reconnect slot name (without prefix)
    pub persist_key: Option<String>,
    /// Language of failure messages
    pub locale: Locale,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            base_interval: Duration::from_millis(1500),
            max_interval: Duration::from_millis(5000),
            timeout: Duration::from_millis(120_000),
            max_attempts: 120,
            persist_key: None,
            locale: Locale::default(),
        }
    }
}

impl PollOptions {
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_intervals(mut self, base: Duration, max: Duration) -> Self {
        self.base_interval = base;
        self.max_interval = max;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_persist_key(mut self, key: impl Into<String>) -> Self {
        self.persist_key = Some(key.into());
        self
    }

    #[must_use]
    pub const fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Delay after a still-running response: `min(max, base * (1 + attempt * 0.05))`
    #[must_use]
    pub fn next_interval(&self, attempt: u32) -> Duration {
        let grown = self
            .base_interval
            .mul_f64(f64::from(attempt).mul_add(0.05, 1.0));
        grown.min(self.max_interval)
    }

    /// Delay after a transient failure: `min(max * 2, 10s)`
    #[must_use]
    pub fn retry_interval(&self) -> Duration {
        self.max_interval.saturating_mul(2).min(MAX_RETRY_DELAY)
    }
}
