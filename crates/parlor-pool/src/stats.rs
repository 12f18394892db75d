//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Statistics about the session registry's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total number of sessions (idle + active)
    total: usize,
    /// Number of idle sessions eligible for reuse
    idle: usize,
    /// Number of sessions currently in progress
    active: usize,
}

impl PoolStats {
    /// Create new pool statistics
    pub fn new(total: usize, idle: usize, active: usize) -> Self {
        Self {
            total,
            idle,
            active,
        }
    }

    /// Get the total number of sessions
    pub fn total(&self) -> usize {
        self.total
    }

    /// Get the number of idle sessions
    pub fn idle(&self) -> usize {
        self.idle
    }

    /// Get the number of in-progress sessions
    pub fn active(&self) -> usize {
        self.active
    }

    /// Calculate pool utilization as a fraction (0.0 to 1.0)
    ///
    /// Returns 0.0 if total is 0 to avoid division by zero.
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.active as f64 / self.total as f64
        }
    }
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}
