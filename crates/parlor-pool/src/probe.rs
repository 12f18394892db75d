//! Connection liveness probe
//!
//! Confirms a connection is still usable by executing a minimal query
//! and measuring response time.

use std::time::{Duration, Instant};

use parlor_core::Connection;

/// Result of a probe operation
pub type ProbeResult = Result<Duration, ProbeError>;

/// Error that can occur while probing a connection
#[derive(Debug, Clone)]
pub enum ProbeError {
    /// The connection is closed
    ConnectionClosed,
    /// The probe query failed
    QueryFailed(String),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::ConnectionClosed => write!(f, "Connection is closed"),
            ProbeError::QueryFailed(msg) => write!(f, "Probe query failed: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Probe a connection to check that it is alive.
///
/// Executes a minimal query (`SELECT 1`) and returns the round-trip time.
/// Used by the registry before reusing an idle session and by the facade's
/// online check.
pub async fn probe_connection(conn: &dyn Connection) -> ProbeResult {
    if conn.is_closed() {
        return Err(ProbeError::ConnectionClosed);
    }

    let start = Instant::now();
    match conn.query("SELECT 1", &[]).await {
        Ok(_) => Ok(start.elapsed()),
        Err(e) => Err(ProbeError::QueryFailed(e.to_string())),
    }
}
