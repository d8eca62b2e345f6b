use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::xirr::XirrConfig;
use crate::constants::DEFAULT_TARGET_TVPI;
use crate::errors::{CalculatorError, Result};

/// Per-call configuration of the metrics calculator.
///
/// Passed explicitly to every calculation so callers (and tests) can vary
/// the target multiple, NAV floor, as-of date and solver bounds per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsConfig {
    /// TVPI the synthesized terminal NAV aims for. `None` disables synthesis.
    pub target_tvpi: Option<Decimal>,
    /// Floor applied to the synthesized terminal NAV; never below zero.
    pub min_terminal_nav: Decimal,
    /// Valuation date of the terminal NAV flow. Transactions dated after it
    /// are left out of the snapshot. Defaults to the latest ledger date.
    pub as_of_date: Option<NaiveDate>,
    pub solver: XirrConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            target_tvpi: Some(DEFAULT_TARGET_TVPI),
            min_terminal_nav: Decimal::ZERO,
            as_of_date: None,
            solver: XirrConfig::default(),
        }
    }
}

impl MetricsConfig {
    pub fn with_as_of(mut self, as_of_date: Option<NaiveDate>) -> Self {
        self.as_of_date = as_of_date;
        self
    }

    pub fn with_target_tvpi(mut self, target_tvpi: Option<Decimal>) -> Self {
        self.target_tvpi = target_tvpi;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(target) = self.target_tvpi {
            if target.is_sign_negative() {
                return Err(CalculatorError::InvalidConfig(format!(
                    "targetTvpi must not be negative, got {}",
                    target
                ))
                .into());
            }
        }
        if self.min_terminal_nav.is_sign_negative() {
            return Err(CalculatorError::InvalidConfig(format!(
                "minTerminalNav must not be negative, got {}",
                self.min_terminal_nav
            ))
            .into());
        }
        self.solver.validate()
    }
}
