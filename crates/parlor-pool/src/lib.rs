//! Parlor Pool - Session pooling and lifecycle management
//!
//! This crate hands out reusable database sessions, tracks which ones are
//! in use, retires idle sessions past their time-to-live via a recurring
//! background job, and mediates commit/rollback with per-session error
//! accumulation.
//!
//! # Example
//!
//! ```ignore
//! use parlor_pool::{Database, PoolConfig};
//! use parlor_core::ConnectionParams;
//!
//! let db = Database::new(params, PoolConfig::default(), factory);
//! db.initialize()?;
//!
//! let mut session = db.get_session().await?;
//! session.execute("INSERT INTO audit (event) VALUES (?)", &params).await;
//! session.finalize(true).await?;
//!
//! db.unlink().await;
//! ```

mod config;
mod database;
mod probe;
mod reaper;
mod registry;
mod session;
mod stats;


pub use config::PoolConfig;
pub use database::Database;
pub use probe::{ProbeError, ProbeResult, probe_connection};
pub use reaper::{CompletionHandler, EvictionTarget, PassFailureHandler, ReaperState, SessionReaper};
pub use registry::SessionRegistry;
pub use session::{Session, Statement};
pub use stats::PoolStats;
