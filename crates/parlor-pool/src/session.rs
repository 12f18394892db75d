//! Session wrapper binding one physical connection to a lifecycle state
//!
//! A `Session` owns exclusive use of a connection while it is in progress,
//! accumulates statement errors in order of occurrence, and ends its active
//! use through commit-or-rollback finalization.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parlor_core::{Connection, ParlorError, QueryResult, Result, Value};

/// A pooled database session.
///
/// The `in_progress` flag is shared with the registry entry for the same
/// id, so finalization immediately makes the session visible as idle to
/// both acquisition and the cleanup pass.
pub struct Session {
    id: u64,
    connection: Arc<dyn Connection>,
    created_at: Instant,
    in_progress: Arc<AtomicBool>,
    errors: Vec<ParlorError>,
}

impl Session {
    pub(crate) fn new(
        id: u64,
        connection: Arc<dyn Connection>,
        created_at: Instant,
        in_progress: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            connection,
            created_at,
            in_progress,
            errors: Vec::new(),
        }
    }

    /// Get the session identifier.
    ///
    /// Identifiers are pool-wide monotonic and never reused, even when the
    /// underlying connection is recycled into a new session wrapper.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// When this session wrapper was created or last handed out.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Whether the session is currently in progress.
    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Append an error to the session's ordered error list. Never fails.
    pub fn record_error(&mut self, err: ParlorError) {
        tracing::debug!(session_id = self.id, error = %err, "error recorded on session");
        self.errors.push(err);
    }

    /// Whether any errors have accumulated during the session's current use.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The accumulated errors, in order of occurrence.
    pub fn errors(&self) -> &[ParlorError] {
        &self.errors
    }

    /// Prepare a statement against this session's connection.
    pub fn prepare(&mut self, sql: impl Into<String>) -> Statement<'_> {
        Statement {
            session: self,
            sql: sql.into(),
        }
    }

    /// Execute a data-modifying statement, recording any failure.
    ///
    /// Returns the number of affected rows, or `None` if the statement
    /// failed and the error was appended to the session's error list.
    pub async fn execute(&mut self, sql: &str, params: &[Value]) -> Option<u64> {
        self.prepare(sql).execute(params).await
    }

    /// Execute a row-returning query, recording any failure.
    pub async fn query(&mut self, sql: &str, params: &[Value]) -> Option<QueryResult> {
        self.prepare(sql).query(params).await
    }

    /// End the session's active use with a commit or rollback.
    ///
    /// Commits only when `commit` is true and no errors were accumulated;
    /// every other case rolls back. A failed commit triggers a best-effort
    /// rollback whose own failure is only logged. After finalization the
    /// session is idle and eligible for reuse or eviction.
    ///
    /// Returns the first accumulated error, if any exist; the remainder
    /// stay available through [`Session::errors`] for diagnostics.
    /// Finalizing an already-idle session is a no-op success.
    #[tracing::instrument(skip(self), fields(session_id = self.id))]
    pub async fn finalize(&mut self, commit: bool) -> Result<()> {
        if !self.in_progress.load(Ordering::SeqCst) {
            return Ok(());
        }

        if commit && self.errors.is_empty() {
            if let Err(e) = self.connection.commit().await {
                tracing::warn!(error = %e, "commit failed, attempting rollback");
                self.errors
                    .push(ParlorError::Finalization(format!("commit failed: {}", e)));
                if let Err(rb) = self.connection.rollback().await {
                    tracing::warn!(error = %rb, "rollback after failed commit also failed");
                }
            }
        } else if let Err(e) = self.connection.rollback().await {
            if self.errors.is_empty() {
                self.errors
                    .push(ParlorError::Finalization(format!("rollback failed: {}", e)));
            } else {
                tracing::warn!(error = %e, "rollback failed, surfacing first accumulated error");
            }
        }

        self.in_progress.store(false, Ordering::SeqCst);

        match self.errors.first() {
            Some(first) => Err(first.clone()),
            None => Ok(()),
        }
    }

    /// Mark the session idle without touching the transaction.
    ///
    /// Used by the facade's online probe, where no statement work occurred.
    pub(crate) fn release(&mut self) {
        self.in_progress.store(false, Ordering::SeqCst);
    }

    pub(crate) fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // A session dropped mid-use stays in-progress forever and is never
        // evicted; surface that in the logs.
        if self.in_progress.load(Ordering::SeqCst) {
            tracing::warn!(
                session_id = self.id,
                "session dropped while still in progress; finalize was not called"
            );
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("in_progress", &self.is_in_progress())
            .field("errors", &self.errors.len())
            .finish()
    }
}

/// A statement prepared against a session's connection.
///
/// Execution failures are captured into the owning session's error list
/// rather than propagated, so a sequence of statements can continue and
/// the caller decides at finalization whether the work commits.
pub struct Statement<'a> {
    session: &'a mut Session,
    sql: String,
}

impl Statement<'_> {
    /// The SQL text of this statement.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Execute as a data-modifying statement.
    pub async fn execute(&mut self, params: &[Value]) -> Option<u64> {
        let result = self.session.connection.execute(&self.sql, params).await;
        match result {
            Ok(result) => Some(result.affected_rows),
            Err(e) => {
                self.session.record_error(e);
                None
            }
        }
    }

    /// Execute as a row-returning query.
    pub async fn query(&mut self, params: &[Value]) -> Option<QueryResult> {
        let result = self.session.connection.query(&self.sql, params).await;
        match result {
            Ok(result) => Some(result),
            Err(e) => {
                self.session.record_error(e);
                None
            }
        }
    }
}
