//! Pool configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_SESSION_TTL_MS: u64 = 30 * 60 * 1000;
const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 10 * 60 * 1000;

/// Configuration for the session pool
///
/// Controls how long an idle session may live and how often the cleanup
/// pass runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Idle time-to-live in milliseconds; `None` means sessions are never
    /// evicted by age
    session_ttl_ms: Option<u64>,
    /// Interval in milliseconds between cleanup passes
    cleanup_interval_ms: u64,
}

impl PoolConfig {
    /// Create a new pool configuration.
    ///
    /// # Panics
    ///
    /// Panics if `cleanup_interval_ms` is 0.
    pub fn new(session_ttl_ms: Option<u64>, cleanup_interval_ms: u64) -> Self {
        assert!(
            cleanup_interval_ms > 0,
            "cleanup_interval_ms must be greater than 0"
        );
        Self {
            session_ttl_ms,
            cleanup_interval_ms,
        }
    }

    /// Set the session time-to-live in milliseconds.
    pub fn with_session_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.session_ttl_ms = Some(ttl_ms);
        self
    }

    /// Disable age-based eviction entirely.
    pub fn with_unbounded_ttl(mut self) -> Self {
        self.session_ttl_ms = None;
        self
    }

    /// Set the cleanup interval in milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if `interval_ms` is 0.
    pub fn with_cleanup_interval_ms(mut self, interval_ms: u64) -> Self {
        assert!(interval_ms > 0, "cleanup_interval_ms must be greater than 0");
        self.cleanup_interval_ms = interval_ms;
        self
    }

    /// Get the session time-to-live as a Duration, if bounded.
    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl_ms.map(Duration::from_millis)
    }

    /// Get the cleanup interval as a Duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }
}

impl Default for PoolConfig {
    /// Create a default pool configuration
    ///
    /// Defaults:
    /// - session_ttl: 30 minutes
    /// - cleanup_interval: 10 minutes
    fn default() -> Self {
        Self::new(Some(DEFAULT_SESSION_TTL_MS), DEFAULT_CLEANUP_INTERVAL_MS)
    }
}
