//! Poller configuration

use std::env;
use std::time::Duration;

const REFRESH_SECS_VAR: &str = "CROSSBAR_DISCOVERY_REFRESH_SECS";
const TIMEOUT_SECS_VAR: &str = "CROSSBAR_DISCOVERY_TIMEOUT_SECS";
const RETRY_ATTEMPTS_VAR: &str = "CROSSBAR_DISCOVERY_RETRY_ATTEMPTS";
const RETRY_DELAY_MS_VAR: &str = "CROSSBAR_DISCOVERY_RETRY_DELAY_MS";

/// Configuration for a [`ServiceDiscovery`](crate::ServiceDiscovery)
/// poller.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Interval between auto-refresh polls
    pub refresh_interval: Duration,

    /// Timeout for each endpoint GET
    pub request_timeout: Duration,

    /// Attempts per endpoint per cycle (retries with linear backoff)
    pub retry_attempts: u32,

    /// Base backoff delay; attempt `n` waits `retry_delay * n`
    pub retry_delay: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl DiscoveryConfig {
    /// Create a config with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the auto-refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the attempts per endpoint per cycle.
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set the base backoff delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Build a config from `CROSSBAR_`-prefixed environment variables,
    /// falling back to the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            refresh_interval: env_secs(REFRESH_SECS_VAR)
                .unwrap_or(defaults.refresh_interval),
            request_timeout: env_secs(TIMEOUT_SECS_VAR)
                .unwrap_or(defaults.request_timeout),
            retry_attempts: env_parsed(RETRY_ATTEMPTS_VAR)
                .unwrap_or(defaults.retry_attempts),
            retry_delay: env_parsed(RETRY_DELAY_MS_VAR)
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        }
    }
}

fn env_secs(var: &str) -> Option<Duration> {
    env_parsed(var).map(Duration::from_secs)
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    env::var(var).ok().and_then(|v| v.parse().ok())
}
