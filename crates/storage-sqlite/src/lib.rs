//! SQLite storage implementation for fund ledgers.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `fundmetrics-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for funds and their transactions
//! - Database-specific model types (with Diesel derives)
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//!
//! ```text
//! core (domain, calculator)     server (HTTP)
//!          │                          │
//!          └────────────┬─────────────┘
//!                       │
//!                       ▼
//!            storage-sqlite (this crate)
//!                       │
//!                       ▼
//!                   SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod funds;
pub mod transactions;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use funds::FundRepository;
pub use transactions::TransactionRepository;

// Re-export from fundmetrics-core for convenience
pub use fundmetrics_core::errors::{DatabaseError, Error, Result};
