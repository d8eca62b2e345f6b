//! Metrics domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::metrics_config::MetricsConfig;
use crate::errors::{Error, Result, ValidationError};
use crate::transactions::FundTransaction;

/// Closed set of selectable metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Pic,
    Dpi,
    Irr,
    Tvpi,
    Rvpi,
    #[default]
    All,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Pic => "pic",
            MetricKind::Dpi => "dpi",
            MetricKind::Irr => "irr",
            MetricKind::Tvpi => "tvpi",
            MetricKind::Rvpi => "rvpi",
            MetricKind::All => "all",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pic" => Ok(MetricKind::Pic),
            "dpi" => Ok(MetricKind::Dpi),
            "irr" => Ok(MetricKind::Irr),
            "tvpi" => Ok(MetricKind::Tvpi),
            "rvpi" => Ok(MetricKind::Rvpi),
            "all" => Ok(MetricKind::All),
            _ => Err(Error::Validation(ValidationError::UnknownMetric(
                s.to_string(),
            ))),
        }
    }
}

/// One dated flow exactly as fed to the XIRR solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    /// Signed: negative for capital drawn, positive for value returned
    pub amount: Decimal,
    pub label: String,
    /// Source transaction; `None` for the synthesized terminal NAV
    pub transaction_id: Option<String>,
}

/// How a single adjustment was folded into PIC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentNormalization {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub stored_amount: Decimal,
    /// Always `-|stored_amount|`
    pub pic_impact: Decimal,
    /// True when the stored sign was negative (recall convention)
    pub stored_as_recall: bool,
}

/// Components that add up to PIC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PicComponents {
    pub total_capital_calls: Decimal,
    pub capital_call_count: usize,
    /// Signed sum of adjustments as stored
    pub stored_adjustment_total: Decimal,
    /// Sum of adjustment magnitudes subtracted from capital calls
    pub normalized_adjustment_total: Decimal,
    pub adjustments: Vec<AdjustmentNormalization>,
    /// True when adjustments exceeded capital calls and PIC was raised to zero
    pub floored_at_zero: bool,
}

/// Why the IRR is, or is not, defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IrrStatus {
    Computed,
    /// Every flow falls on one date; the IRR is the realized multiple less one
    Instantaneous,
    InsufficientCashFlows,
    NoSignChange,
    NoRootInRange,
    DidNotConverge,
    NumericalError,
}

impl IrrStatus {
    pub fn describe(&self) -> &'static str {
        match self {
            IrrStatus::Computed => "computed",
            IrrStatus::Instantaneous => {
                "all cash flows fall on the same date; instantaneous return reported"
            }
            IrrStatus::InsufficientCashFlows => "fewer than two cash flows",
            IrrStatus::NoSignChange => "cash flows do not contain both outflows and inflows",
            IrrStatus::NoRootInRange => "no rate within the search domain zeroes the NPV",
            IrrStatus::DidNotConverge => "the solver did not converge within its iteration bound",
            IrrStatus::NumericalError => "cash flows could not be evaluated numerically",
        }
    }
}

/// Full derivation of a fund's performance metrics from one ledger snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBreakdown {
    pub fund_id: String,
    /// Date of the terminal NAV flow; `None` only for an empty ledger
    pub as_of_date: Option<NaiveDate>,
    pub pic: Decimal,
    pub total_distributions: Decimal,
    pub dpi: Option<Decimal>,
    /// Percentage, rounded for display
    pub irr: Option<Decimal>,
    /// Solver rate at full precision (0.1 == 10%)
    pub irr_rate: Option<Decimal>,
    pub irr_status: IrrStatus,
    pub irr_iterations: Option<u32>,
    pub tvpi: Option<Decimal>,
    pub rvpi: Option<Decimal>,
    pub terminal_nav: Decimal,
    pub pic_components: PicComponents,
    pub distribution_count: usize,
    pub cash_flow_trace: Vec<CashFlow>,
    /// Ledger entries dated after `as_of_date` that were left out
    pub excluded_after_as_of: usize,
    pub config: MetricsConfig,
}

/// Outflow/inflow totals of the IRR cash-flow trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowSummary {
    pub total_outflows: Decimal,
    pub total_inflows: Decimal,
    pub net_cash_flow: Decimal,
}

impl CashFlowSummary {
    pub fn from_trace(trace: &[CashFlow]) -> Self {
        let total_outflows = trace
            .iter()
            .map(|cf| cf.amount)
            .filter(|amount| *amount < Decimal::ZERO)
            .sum::<Decimal>();
        let total_inflows = trace
            .iter()
            .map(|cf| cf.amount)
            .filter(|amount| *amount > Decimal::ZERO)
            .sum::<Decimal>();
        Self {
            total_outflows,
            total_inflows,
            net_cash_flow: total_outflows + total_inflows,
        }
    }
}

/// A single selected metric with its formula and supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResult {
    pub fund_id: String,
    pub metric: MetricKind,
    pub value: Option<Decimal>,
    pub formula: String,
    pub explanation: String,
    /// Ledger entries that participate in this metric, date ordered
    pub transactions: Vec<FundTransaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_flow_summary: Option<CashFlowSummary>,
    pub breakdown: MetricsBreakdown,
}
