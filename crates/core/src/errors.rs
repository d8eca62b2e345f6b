//! Core error types for the fund metrics engine.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.
//!
//! Undefined metric values (zero PIC, too few cash flows, a solver that does
//! not converge) are never errors: they are reported as `None` on the
//! breakdown. Only contract violations and infrastructure failures surface here.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the fund metrics application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Metrics calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn fund_not_found(fund_id: &str) -> Self {
        Error::NotFound {
            entity: "Fund",
            id: fund_id.to_string(),
        }
    }

    pub fn transaction_not_found(transaction_id: &str) -> Self {
        Error::NotFound {
            entity: "Transaction",
            id: transaction_id.to_string(),
        }
    }

    /// True for both domain and storage-level "record not found" errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::Database(DatabaseError::NotFound(_))
        )
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors raised by the metrics calculator when its input contract is broken.
///
/// The calculator assumes a validated ledger; these variants are the
/// fail-fast signals for input that slipped past the boundary.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Transaction {transaction_id} belongs to fund {actual_fund_id}, expected {expected_fund_id}")]
    ForeignTransaction {
        transaction_id: String,
        expected_fund_id: String,
        actual_fund_id: String,
    },

    #[error("Transaction {transaction_id} ({transaction_type}) on {date} has negative amount {amount}; a positive magnitude is required")]
    NegativeMagnitude {
        transaction_id: String,
        transaction_type: String,
        date: NaiveDate,
        amount: String,
    },

    #[error("Invalid metrics configuration: {0}")]
    InvalidConfig(String),

    #[error("Ledger amounts are too large to compute {0}")]
    Overflow(&'static str),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Unknown metric '{0}'; expected one of pic, dpi, irr, tvpi, rvpi, all")]
    UnknownMetric(String),

    #[error("Unknown transaction type '{0}'")]
    UnknownTransactionType(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date: {0}")]
    DateParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
