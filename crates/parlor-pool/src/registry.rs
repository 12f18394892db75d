//! Concurrent session registry
//!
//! Maps session identifiers to the current session entry wrapping that
//! physical connection. All map mutation happens inside one short critical
//! section per call; connection I/O (liveness probes, closes) never runs
//! under the lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use parlor_core::{Connection, ParlorError, Result};

use crate::probe::probe_connection;
use crate::session::Session;
use crate::stats::PoolStats;

/// Registry entry for one physical connection.
///
/// The `in_progress` flag is shared with whichever `Session` currently
/// wraps this connection.
struct SessionEntry {
    connection: Arc<dyn Connection>,
    created_at: Instant,
    in_progress: Arc<AtomicBool>,
}

/// Map plus drain marker, guarded by one mutex.
///
/// `draining` is set by [`SessionRegistry::drain_all`] inside the same
/// critical section that empties the map, so an entry checked out for
/// probing cannot be reinserted after the drain and no new entry can be
/// registered into a drained registry.
struct RegistryState {
    entries: HashMap<u64, SessionEntry>,
    draining: bool,
}

/// Thread-safe registry of pooled sessions keyed by identifier.
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
    /// Next session identifier; identifiers start at 1 and are never reused.
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                entries: HashMap::new(),
                draining: false,
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Acquire a free session, if any exists.
    ///
    /// Scans for an entry that is not in progress, removes it from the map,
    /// probes the connection outside the critical section, and on success
    /// reinserts it under the same id with a refreshed creation timestamp
    /// and a fresh error list. An entry whose probe fails is closed and
    /// dropped, and the scan continues. No ordering is guaranteed across
    /// which free entry is returned.
    ///
    /// If a drain began while the candidate was checked out for probing,
    /// the connection is closed instead of reinserted and `None` is
    /// returned: nothing survives [`SessionRegistry::drain_all`].
    ///
    /// Returns `None` when no live idle entry exists; the caller then opens
    /// a new physical connection and calls [`SessionRegistry::register`].
    pub async fn acquire(&self) -> Option<Session> {
        loop {
            // Take a candidate out of the map so no other caller can race
            // onto it while we probe.
            let (id, entry) = {
                let mut state = self.state.lock();
                if state.draining {
                    return None;
                }
                let id = state
                    .entries
                    .iter()
                    .find(|(_, e)| !e.in_progress.load(Ordering::SeqCst))
                    .map(|(id, _)| *id)?;
                let Some(entry) = state.entries.remove(&id) else {
                    continue;
                };
                (id, entry)
            };

            if let Err(e) = probe_connection(entry.connection.as_ref()).await {
                tracing::debug!(session_id = id, error = %e, "evicting dead idle session");
                if let Err(close_err) = entry.connection.close().await {
                    tracing::warn!(session_id = id, error = %close_err, "close failed during eviction");
                }
                continue;
            }

            let created_at = Instant::now();
            let in_progress = Arc::new(AtomicBool::new(true));
            let draining = {
                let mut state = self.state.lock();
                if state.draining {
                    true
                } else {
                    state.entries.insert(
                        id,
                        SessionEntry {
                            connection: entry.connection.clone(),
                            created_at,
                            in_progress: in_progress.clone(),
                        },
                    );
                    false
                }
            };

            if draining {
                tracing::debug!(session_id = id, "registry drained mid-probe, closing connection");
                if let Err(e) = entry.connection.close().await {
                    tracing::warn!(session_id = id, error = %e, "close failed during drain");
                }
                return None;
            }

            tracing::debug!(session_id = id, "idle session reused");
            return Some(Session::new(id, entry.connection, created_at, in_progress));
        }
    }

    /// Register a freshly opened connection as a brand-new session.
    ///
    /// Identifier assignment is atomic, so concurrent callers never receive
    /// the same id. The returned session is already marked in progress.
    ///
    /// Fails once the registry has been drained; the caller still owns the
    /// connection and is responsible for closing it.
    pub fn register(&self, connection: Arc<dyn Connection>) -> Result<Session> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created_at = Instant::now();
        let in_progress = Arc::new(AtomicBool::new(true));

        {
            let mut state = self.state.lock();
            if state.draining {
                return Err(ParlorError::Configuration("pool is shut down".into()));
            }
            state.entries.insert(
                id,
                SessionEntry {
                    connection: connection.clone(),
                    created_at,
                    in_progress: in_progress.clone(),
                },
            );
        }

        tracing::debug!(session_id = id, "new session registered");
        Ok(Session::new(id, connection, created_at, in_progress))
    }

    /// Evict every idle entry older than `ttl`, measured against a single
    /// `now` snapshot for the whole pass.
    ///
    /// Entries currently in progress are never evicted regardless of age.
    /// Close failures are logged and swallowed; the entry is removed either
    /// way. Returns the number of entries evicted.
    pub async fn evict_expired(&self, ttl: Duration, now: Instant) -> Result<usize> {
        let expired: Vec<(u64, Arc<dyn Connection>)> = {
            let mut state = self.state.lock();
            let ids: Vec<u64> = state
                .entries
                .iter()
                .filter(|(_, e)| {
                    !e.in_progress.load(Ordering::SeqCst)
                        && now.saturating_duration_since(e.created_at) > ttl
                })
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| state.entries.remove(&id).map(|e| (id, e.connection)))
                .collect()
        };

        let count = expired.len();
        for (id, connection) in expired {
            if let Err(e) = connection.close().await {
                tracing::warn!(session_id = id, error = %e, "close failed while evicting expired session");
            } else {
                tracing::debug!(session_id = id, "expired session evicted");
            }
        }

        Ok(count)
    }

    /// Close and remove every entry, in progress or not.
    ///
    /// Used during shutdown. Marks the registry draining before releasing
    /// the lock, so concurrent acquisition and registration cannot slip an
    /// entry past the drain. Per-entry close failures are logged and
    /// swallowed so one bad connection cannot block draining the rest.
    pub async fn drain_all(&self) {
        let drained: Vec<(u64, SessionEntry)> = {
            let mut state = self.state.lock();
            state.draining = true;
            state.entries.drain().collect()
        };

        tracing::info!(count = drained.len(), "draining session registry");
        for (id, entry) in drained {
            if let Err(e) = entry.connection.close().await {
                tracing::warn!(session_id = id, error = %e, "close failed during drain");
            }
        }
    }

    /// Allow hand-outs again after a drain. Called when the facade relinks.
    pub(crate) fn reopen(&self) {
        self.state.lock().draining = false;
    }

    /// Current registry statistics.
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        let total = state.entries.len();
        let active = state
            .entries
            .values()
            .filter(|e| e.in_progress.load(Ordering::SeqCst))
            .count();
        PoolStats::new(total, total - active, active)
    }

    /// Whether an entry exists for the given id.
    pub fn contains(&self, id: u64) -> bool {
        self.state.lock().entries.contains_key(&id)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
