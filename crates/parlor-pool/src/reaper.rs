//! Self-rescheduling cleanup scheduler
//!
//! One background task per pool runs the eviction sweep. A single delayed
//! timer re-arms itself after each pass completes, so at most one pass is
//! ever in flight; a slow sweep can never overlap the next one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use parlor_core::{ParlorError, Result};

use crate::config::PoolConfig;
use crate::registry::SessionRegistry;

/// Handler invoked when an eviction pass fails unexpectedly.
pub type PassFailureHandler = Arc<dyn Fn(&ParlorError) + Send + Sync>;

/// Handler invoked once when the reaper terminates.
pub type CompletionHandler = Arc<dyn Fn() + Send + Sync>;

/// What a cleanup pass sweeps over.
///
/// `SessionRegistry` is the production target. The seam keeps the sweep
/// fallible: a storage- or driver-level failure surfaces through the pass
/// failure handler instead of tearing down the schedule.
#[async_trait]
pub trait EvictionTarget: Send + Sync + 'static {
    /// Evict idle entries older than `ttl`, measured against one `now`
    /// snapshot. Returns the number of entries evicted.
    async fn evict_expired(&self, ttl: Duration, now: Instant) -> Result<usize>;
}

#[async_trait]
impl EvictionTarget for SessionRegistry {
    async fn evict_expired(&self, ttl: Duration, now: Instant) -> Result<usize> {
        SessionRegistry::evict_expired(self, ttl, now).await
    }
}

/// Lifecycle state of the cleanup scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaperState {
    /// Created but not yet armed
    Idle,
    /// Timer armed for the next pass
    Scheduled,
    /// Eviction pass currently executing
    Running,
    /// Stopped; no further passes will run
    Terminated,
}

struct ReaperInner {
    target: Arc<dyn EvictionTarget>,
    config: PoolConfig,
    state: Mutex<ReaperState>,
    terminated: AtomicBool,
    shutdown: Notify,
    on_pass_failure: Option<PassFailureHandler>,
    on_complete: Option<CompletionHandler>,
}

impl ReaperInner {
    fn set_state(&self, state: ReaperState) {
        *self.state.lock() = state;
    }

    async fn run(self: Arc<Self>) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.config.cleanup_interval()) => {
                    if self.terminated.load(Ordering::SeqCst) {
                        break;
                    }
                    self.set_state(ReaperState::Running);
                    self.run_pass().await;
                    if self.terminated.load(Ordering::SeqCst) {
                        break;
                    }
                    // Re-arm relative to completion of this pass.
                    self.set_state(ReaperState::Scheduled);
                }
                _ = self.shutdown.notified() => {
                    break;
                }
            }
        }

        self.set_state(ReaperState::Terminated);
        if let Some(handler) = &self.on_complete {
            handler();
        }
        tracing::debug!("session reaper terminated");
    }

    async fn run_pass(&self) {
        let Some(ttl) = self.config.session_ttl() else {
            // Unbounded TTL: the duty still fires, but nothing ages out.
            return;
        };

        let now = Instant::now();
        match self.target.evict_expired(ttl, now).await {
            Ok(evicted) => {
                if evicted > 0 {
                    tracing::debug!(evicted, "cleanup pass completed");
                }
            }
            Err(e) => {
                // A bad pass must not kill the cleanup duty.
                tracing::warn!(error = %e, "cleanup pass failed");
                if let Some(handler) = &self.on_pass_failure {
                    handler(&e);
                }
            }
        }
    }
}

/// Recurring eviction job for one pool instance.
///
/// Owned by the database facade; armed at initialization and terminated at
/// unlink. Termination is idempotent.
pub struct SessionReaper {
    inner: Arc<ReaperInner>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionReaper {
    /// Build an unarmed reaper sweeping the given target.
    pub fn new(target: Arc<dyn EvictionTarget>, config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(ReaperInner {
                target,
                config,
                state: Mutex::new(ReaperState::Idle),
                terminated: AtomicBool::new(false),
                shutdown: Notify::new(),
                on_pass_failure: None,
                on_complete: None,
            }),
            handle: Mutex::new(None),
        }
    }

    /// Set the handler invoked when an eviction pass fails.
    ///
    /// Must be called before [`SessionReaper::spawn`].
    pub fn with_pass_failure_handler(mut self, handler: PassFailureHandler) -> Self {
        let inner = Arc::get_mut(&mut self.inner)
            .expect("handlers must be installed before the reaper is spawned");
        inner.on_pass_failure = Some(handler);
        self
    }

    /// Set the handler invoked once on termination.
    ///
    /// Must be called before [`SessionReaper::spawn`].
    pub fn with_completion_handler(mut self, handler: CompletionHandler) -> Self {
        let inner = Arc::get_mut(&mut self.inner)
            .expect("handlers must be installed before the reaper is spawned");
        inner.on_complete = Some(handler);
        self
    }

    /// Arm the timer and start the background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> Self {
        self.inner.set_state(ReaperState::Scheduled);
        let task = tokio::spawn(self.inner.clone().run());
        *self.handle.lock() = Some(task);
        tracing::debug!(
            interval_ms = self.inner.config.cleanup_interval().as_millis() as u64,
            "session reaper armed"
        );
        self
    }

    /// Current scheduler state.
    pub fn state(&self) -> ReaperState {
        *self.inner.state.lock()
    }

    /// Stop the scheduler, cancelling any pending timer.
    ///
    /// Waits for the background task to finish, so no pass can run after
    /// this returns. Idempotent.
    pub async fn terminate(&self) {
        if !self.inner.terminated.swap(true, Ordering::SeqCst) {
            self.inner.shutdown.notify_one();
        }
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.await.is_err() {
                tracing::warn!("session reaper task panicked before termination");
            }
        }
    }
}
