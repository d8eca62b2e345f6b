//! Fund Metrics Core - Domain entities, services, and traits.
//!
//! This crate contains the performance-metric logic for private-equity funds.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod funds;
pub mod metrics;
pub mod transactions;

// Re-export the calculator entry points
pub use metrics::{compute_metric, compute_metrics, MetricKind, MetricsBreakdown, MetricsConfig};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
