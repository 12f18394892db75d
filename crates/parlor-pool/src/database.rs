//! Database facade
//!
//! Public entry point over the registry, the reaper, and the raw
//! connection factory: `initialize`, `get_session`, `is_online`, `unlink`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use parlor_core::{ConnectionFactory, ConnectionParams, ParlorError, Result};

use crate::config::PoolConfig;
use crate::probe::probe_connection;
use crate::reaper::SessionReaper;
use crate::registry::SessionRegistry;
use crate::session::Session;
use crate::stats::PoolStats;

/// Pooled database access facade.
///
/// One instance owns one registry and one cleanup scheduler; there is no
/// ambient global state. Lifecycle is explicit: `initialize` before use,
/// `unlink` at shutdown.
pub struct Database {
    params: ConnectionParams,
    config: PoolConfig,
    factory: Arc<dyn ConnectionFactory>,
    registry: Arc<SessionRegistry>,
    reaper: Mutex<Option<SessionReaper>>,
    linked: AtomicBool,
}

impl Database {
    /// Create an unlinked facade. No connections are opened until
    /// [`Database::initialize`] succeeds and a session is requested.
    pub fn new<F: ConnectionFactory>(
        params: ConnectionParams,
        config: PoolConfig,
        factory: F,
    ) -> Self {
        Self {
            params,
            config,
            factory: Arc::new(factory),
            registry: Arc::new(SessionRegistry::new()),
            reaper: Mutex::new(None),
            linked: AtomicBool::new(false),
        }
    }

    /// Validate connection parameters and start the cleanup scheduler.
    ///
    /// Fails with a configuration error when any required parameter is
    /// missing, or when the facade is already initialized. Must be called
    /// from within a tokio runtime.
    #[tracing::instrument(skip(self), fields(host = %self.params.host, database = %self.params.database))]
    pub fn initialize(&self) -> Result<()> {
        self.params.validate()?;

        if self.linked.swap(true, Ordering::SeqCst) {
            return Err(ParlorError::Configuration(
                "database is already initialized".into(),
            ));
        }

        self.registry.reopen();
        let reaper = SessionReaper::new(self.registry.clone(), self.config.clone()).spawn();
        *self.reaper.lock() = Some(reaper);

        tracing::info!("database facade initialized");
        Ok(())
    }

    /// Hand out a session: reuse an idle one, or open and register a new
    /// physical connection.
    ///
    /// New connections are switched to manual transaction control before
    /// registration. Factory failures surface as connectivity errors;
    /// retry policy belongs to the caller.
    #[tracing::instrument(skip(self))]
    pub async fn get_session(&self) -> Result<Session> {
        if !self.linked.load(Ordering::SeqCst) {
            return Err(ParlorError::Configuration(
                "database is not initialized".into(),
            ));
        }

        if let Some(session) = self.registry.acquire().await {
            return Ok(session);
        }

        let connection = self.factory.open(&self.params).await.map_err(|e| {
            tracing::error!(error = %e, "failed to open new connection");
            ParlorError::Connectivity(e.to_string())
        })?;
        connection.set_auto_commit(false).await?;

        let session = match self.registry.register(connection.clone()) {
            Ok(session) => session,
            Err(e) => {
                // An unlink drained the registry after the linked check;
                // the fresh connection must not outlive it.
                if let Err(close_err) = connection.close().await {
                    tracing::warn!(error = %close_err, "close failed for connection opened during shutdown");
                }
                return Err(e);
            }
        };
        tracing::debug!(session_id = session.id(), "new session opened");
        Ok(session)
    }

    /// Probe whether the database is reachable.
    ///
    /// Acquires a session, probes its connection, and releases it without
    /// finalizing (no statement work occurred). Any failure maps to
    /// `false`; nothing propagates.
    pub async fn is_online(&self) -> bool {
        let mut session = match self.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(error = %e, "online probe could not acquire a session");
                return false;
            }
        };

        let alive = probe_connection(session.connection().as_ref()).await.is_ok();
        session.release();
        alive
    }

    /// Shut the pool down.
    ///
    /// Stops the cleanup scheduler (no further passes run after this
    /// returns) and drains the registry, closing every connection including
    /// those under active sessions; their subsequent statements fail with a
    /// closed-connection error.
    #[tracing::instrument(skip(self))]
    pub async fn unlink(&self) {
        self.linked.store(false, Ordering::SeqCst);

        let reaper = self.reaper.lock().take();
        if let Some(reaper) = reaper {
            reaper.terminate().await;
        }

        self.registry.drain_all().await;
        tracing::info!("database facade unlinked");
    }

    /// Whether the facade is currently linked.
    pub fn is_linked(&self) -> bool {
        self.linked.load(Ordering::SeqCst)
    }

    /// Current registry statistics.
    pub fn stats(&self) -> PoolStats {
        self.registry.stats()
    }

    /// The pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}
