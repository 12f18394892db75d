//! Connection trait, factory trait, and connection parameters

use crate::{ParlorError, QueryResult, Result, StatementResult, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters required to open a physical database connection.
///
/// `host`, `database`, `user`, and `password` must all be non-empty; the
/// facade validates them before any connection is opened.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Host address
    pub host: String,
    /// Port number (0 means the driver default)
    #[serde(default)]
    pub port: u16,
    /// Database name
    pub database: String,
    /// Username
    pub user: String,
    /// Password
    pub password: String,
}

impl ConnectionParams {
    /// Create connection parameters with the driver-default port.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 0,
            database: database.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Set an explicit port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Validate that every required parameter is present.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ParlorError::Configuration("host is not set".into()));
        }
        if self.database.trim().is_empty() {
            return Err(ParlorError::Configuration("database is not set".into()));
        }
        if self.user.trim().is_empty() {
            return Err(ParlorError::Configuration("user is not set".into()));
        }
        if self.password.trim().is_empty() {
            return Err(ParlorError::Configuration("password is not set".into()));
        }
        Ok(())
    }
}

// Manual Debug so the password never lands in logs.
impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A physical database connection under manual transaction control.
///
/// The pool disables auto-commit before registering a connection, so all
/// statement work happens inside an open transaction that is ended by an
/// explicit `commit` or `rollback`.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "postgres", "mysql")
    fn driver_name(&self) -> &str;

    /// Execute a statement that modifies data (INSERT/UPDATE/DELETE)
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows (SELECT)
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Enable or disable auto-commit on the connection
    async fn set_auto_commit(&self, enabled: bool) -> Result<()>;

    /// Commit the current transaction
    async fn commit(&self) -> Result<()>;

    /// Roll back the current transaction
    async fn rollback(&self) -> Result<()>;

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}

/// Factory trait for opening physical connections
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// Open a new connection with the given parameters
    async fn open(&self, params: &ConnectionParams) -> Result<Arc<dyn Connection>>;
}

#[async_trait]
impl<T: ConnectionFactory> ConnectionFactory for Arc<T> {
    async fn open(&self, params: &ConnectionParams) -> Result<Arc<dyn Connection>> {
        (**self).open(params).await
    }
}
