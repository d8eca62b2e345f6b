//! Metrics module - PIC, DPI, IRR, TVPI and RVPI for a single fund.
//!
//! [`compute_metrics`] is a pure function over a ledger snapshot and a
//! [`MetricsConfig`]; [`MetricsService`] wires it to the repositories.

mod metrics_calculator;
mod metrics_config;
mod metrics_model;
mod metrics_service;
mod metrics_traits;
pub mod xirr;

#[cfg(test)]
mod metrics_calculator_tests;


pub use metrics_calculator::{compute_metric, compute_metrics, terminal_nav, validate_ledger};
pub use metrics_config::MetricsConfig;
pub use metrics_model::{
    AdjustmentNormalization, CashFlow, CashFlowSummary, IrrStatus, MetricKind, MetricResult,
    MetricsBreakdown, PicComponents,
};
pub use metrics_service::MetricsService;
pub use metrics_traits::MetricsServiceTrait;
pub use xirr::{xirr, XirrConfig, XirrOutcome};
