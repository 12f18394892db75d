//! Parlor Core - Core abstractions for the database session pool
//!
//! This crate provides the traits and types the pool crates depend on:
//!
//! - `Connection` - Trait for physical database connections
//! - `ConnectionFactory` - Trait for opening new connections
//! - `ConnectionParams` - Validated connection parameters
//! - Common types like `Value`, `Row`, `QueryResult`, `StatementResult`
//! - The `ParlorError` taxonomy and `Result` alias

mod connection;
mod error;
mod types;

pub use connection::*;
pub use error::*;
pub use types::*;
