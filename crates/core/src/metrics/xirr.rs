//! XIRR root-finding over irregularly dated cash flows.
//!
//! Solves `sum_i cf_i / (1 + r)^((d_i - d_0) / 365) = 0` for `r`, where `d_0`
//! is the earliest date. The solver knows nothing about funds: it takes
//! `(date, amount)` pairs and returns either a rate or the reason no rate
//! could be produced.
//!
//! The search runs in two phases:
//!
//! 1. **Bracketing** - NPV is sampled on a grid that is uniform in
//!    `ln(1 + r)` across `[min_rate, max_rate]`. Every adjacent pair with a
//!    sign change is a candidate bracket; the one nearest [`SEED_RATE`] wins,
//!    so conventional call-then-distribute streams resolve to their single
//!    root and multi-root streams resolve deterministically.
//! 2. **Refinement** - Newton steps inside the bracket, falling back to
//!    bisection whenever a step would leave it. The bracket shrinks on every
//!    iteration, so the loop cannot diverge.
//!
//! Discount factors are computed as `exp(-t * ln(1 + r))` in `f64`; any
//! non-finite intermediate is treated as "no value at this rate" rather than
//! propagated.
//!
//! When every flow falls on one date the NPV does not depend on the rate at
//! all. The solver then reports the instantaneous return
//! `sum(inflows) / |sum(outflows)| - 1` instead of searching.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DAYS_PER_YEAR, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_RATE, DEFAULT_MIN_RATE,
    DEFAULT_NPV_TOLERANCE, DEFAULT_RATE_TOLERANCE,
};
use crate::errors::{CalculatorError, Result};

/// Number of grid intervals sampled while looking for a sign change
const BRACKET_SCAN_STEPS: usize = 400;

/// Rate the bracket selection gravitates towards when several roots exist
const SEED_RATE: f64 = 0.10;

/// Solver bounds and tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XirrConfig {
    /// Accept a rate once `|NPV|` falls below this
    pub npv_tolerance: f64,
    /// Scale `npv_tolerance` by the largest absolute flow (never below 1)
    pub relative_npv_tolerance: bool,
    /// Accept a rate once the bracket is narrower than this
    pub rate_tolerance: f64,
    pub max_iterations: u32,
    /// Lower bound of the search domain; must be greater than -1
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for XirrConfig {
    fn default() -> Self {
        Self {
            npv_tolerance: DEFAULT_NPV_TOLERANCE,
            relative_npv_tolerance: false,
            rate_tolerance: DEFAULT_RATE_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            min_rate: DEFAULT_MIN_RATE,
            max_rate: DEFAULT_MAX_RATE,
        }
    }
}

impl XirrConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid =
            |msg: String| -> Result<()> { Err(CalculatorError::InvalidConfig(msg).into()) };

        if !(self.npv_tolerance.is_finite() && self.npv_tolerance > 0.0) {
            return invalid(format!(
                "npvTolerance must be positive, got {}",
                self.npv_tolerance
            ));
        }
        if !(self.rate_tolerance.is_finite() && self.rate_tolerance > 0.0) {
            return invalid(format!(
                "rateTolerance must be positive, got {}",
                self.rate_tolerance
            ));
        }
        if self.max_iterations == 0 {
            return invalid("maxIterations must be at least 1".to_string());
        }
        if !(self.min_rate.is_finite() && self.min_rate > -1.0) {
            return invalid(format!(
                "minRate must be greater than -1, got {}",
                self.min_rate
            ));
        }
        if !(self.max_rate.is_finite() && self.max_rate > self.min_rate) {
            return invalid(format!(
                "maxRate ({}) must be greater than minRate ({})",
                self.max_rate, self.min_rate
            ));
        }
        Ok(())
    }

    /// NPV tolerance for flows whose largest magnitude is `max_abs_flow`.
    pub fn npv_tolerance_for(&self, max_abs_flow: f64) -> f64 {
        if self.relative_npv_tolerance {
            self.npv_tolerance * max_abs_flow.max(1.0)
        } else {
            self.npv_tolerance
        }
    }
}

/// Result of an XIRR solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XirrOutcome {
    /// A root was found inside the search domain.
    Converged { rate: f64, iterations: u32 },
    /// Fewer than two cash flows.
    InsufficientFlows,
    /// All flows share one sign (or are zero); NPV cannot cross zero.
    NoSignChange,
    /// All flows fall on the same date, so NPV does not depend on the rate;
    /// `rate` is the instantaneous return of the stream.
    Instantaneous { rate: f64 },
    /// NPV never changes sign across the search domain.
    NoRootInRange,
    /// The iteration bound was hit before the tolerances were met.
    DidNotConverge { iterations: u32 },
    /// An amount or intermediate value was not a finite number.
    NumericalError,
}

impl XirrOutcome {
    pub fn rate(&self) -> Option<f64> {
        match self {
            XirrOutcome::Converged { rate, .. } | XirrOutcome::Instantaneous { rate } => {
                Some(*rate)
            }
            _ => None,
        }
    }
}

/// Cash flows converted to year fractions from the earliest date.
struct TimedFlows {
    flows: Vec<(f64, f64)>,
}

impl TimedFlows {
    fn new(cash_flows: &[(NaiveDate, f64)]) -> Option<Self> {
        let start = cash_flows.iter().map(|(date, _)| *date).min()?;
        let flows = cash_flows
            .iter()
            .map(|(date, amount)| {
                let years = (*date - start).num_days() as f64 / DAYS_PER_YEAR;
                (years, *amount)
            })
            .collect();
        Some(Self { flows })
    }

    fn spans_time(&self) -> bool {
        self.flows.iter().any(|(years, _)| *years > 0.0)
    }

    fn max_abs_amount(&self) -> f64 {
        self.flows
            .iter()
            .map(|(_, amount)| amount.abs())
            .fold(0.0, f64::max)
    }

    /// `sum(inflows) / |sum(outflows)| - 1`, the return of a stream that
    /// takes no time.
    fn instantaneous_return(&self) -> Option<f64> {
        let inflows: f64 = self
            .flows
            .iter()
            .map(|(_, amount)| amount.max(0.0))
            .sum();
        let outflows: f64 = self
            .flows
            .iter()
            .map(|(_, amount)| (-amount).max(0.0))
            .sum();
        let rate = inflows / outflows - 1.0;
        (rate.is_finite() && outflows > 0.0).then_some(rate)
    }

    /// Net present value at `rate`, or `None` when it is not representable.
    fn npv(&self, rate: f64) -> Option<f64> {
        let log_base = (1.0 + rate).ln();
        let value = self
            .flows
            .iter()
            .map(|(years, amount)| amount * (-years * log_base).exp())
            .sum::<f64>();
        value.is_finite().then_some(value)
    }

    /// First derivative of NPV with respect to the rate.
    fn npv_derivative(&self, rate: f64) -> Option<f64> {
        let log_base = (1.0 + rate).ln();
        let value = self
            .flows
            .iter()
            .map(|(years, amount)| -years * amount * (-(years + 1.0) * log_base).exp())
            .sum::<f64>();
        value.is_finite().then_some(value)
    }
}

/// Solves for the annualized rate that zeroes the NPV of `cash_flows`.
///
/// Duplicate dates need no special handling; their flows simply add up in the
/// present-value sum.
pub fn xirr(cash_flows: &[(NaiveDate, f64)], config: &XirrConfig) -> XirrOutcome {
    if cash_flows.len() < 2 {
        return XirrOutcome::InsufficientFlows;
    }
    if cash_flows.iter().any(|(_, amount)| !amount.is_finite()) {
        return XirrOutcome::NumericalError;
    }

    let has_inflow = cash_flows.iter().any(|(_, amount)| *amount > 0.0);
    let has_outflow = cash_flows.iter().any(|(_, amount)| *amount < 0.0);
    if !(has_inflow && has_outflow) {
        return XirrOutcome::NoSignChange;
    }

    let Some(timed) = TimedFlows::new(cash_flows) else {
        return XirrOutcome::InsufficientFlows;
    };
    if !timed.spans_time() {
        return match timed.instantaneous_return() {
            Some(rate) => XirrOutcome::Instantaneous { rate },
            None => XirrOutcome::NumericalError,
        };
    }

    match find_bracket(&timed, config) {
        Bracket::Exact(rate) => XirrOutcome::Converged {
            rate,
            iterations: 0,
        },
        Bracket::Interval(lo, hi) => refine(&timed, lo, hi, config),
        Bracket::None => XirrOutcome::NoRootInRange,
    }
}

enum Bracket {
    Exact(f64),
    Interval(f64, f64),
    None,
}

fn grid_rate(config: &XirrConfig, step: usize) -> f64 {
    let lo = (1.0 + config.min_rate).ln();
    let hi = (1.0 + config.max_rate).ln();
    let fraction = step as f64 / BRACKET_SCAN_STEPS as f64;
    (lo + (hi - lo) * fraction).exp() - 1.0
}

fn find_bracket(timed: &TimedFlows, config: &XirrConfig) -> Bracket {
    let mut best: Option<(f64, f64)> = None;
    let mut previous: Option<(f64, f64)> = None;

    let distance = |lo: f64, hi: f64| ((lo + hi) / 2.0 - SEED_RATE).abs();

    for step in 0..=BRACKET_SCAN_STEPS {
        let rate = grid_rate(config, step);
        let Some(value) = timed.npv(rate) else {
            previous = None;
            continue;
        };
        if value == 0.0 {
            return Bracket::Exact(rate);
        }
        if let Some((prev_rate, prev_value)) = previous {
            if prev_value.signum() != value.signum() {
                let closer = match best {
                    Some((lo, hi)) => distance(prev_rate, rate) < distance(lo, hi),
                    None => true,
                };
                if closer {
                    best = Some((prev_rate, rate));
                }
            }
        }
        previous = Some((rate, value));
    }

    match best {
        Some((lo, hi)) => Bracket::Interval(lo, hi),
        None => Bracket::None,
    }
}

fn refine(timed: &TimedFlows, mut lo: f64, mut hi: f64, config: &XirrConfig) -> XirrOutcome {
    let Some(mut f_lo) = timed.npv(lo) else {
        return XirrOutcome::NumericalError;
    };
    let npv_tolerance = config.npv_tolerance_for(timed.max_abs_amount());
    let mut rate = (lo + hi) / 2.0;

    for iteration in 1..=config.max_iterations {
        let Some(value) = timed.npv(rate) else {
            return XirrOutcome::NumericalError;
        };
        if value.abs() < npv_tolerance {
            return XirrOutcome::Converged {
                rate,
                iterations: iteration,
            };
        }

        if value.signum() == f_lo.signum() {
            lo = rate;
            f_lo = value;
        } else {
            hi = rate;
        }
        if hi - lo < config.rate_tolerance {
            return XirrOutcome::Converged {
                rate: (lo + hi) / 2.0,
                iterations: iteration,
            };
        }

        let newton = timed
            .npv_derivative(rate)
            .filter(|slope| *slope != 0.0)
            .map(|slope| rate - value / slope)
            .filter(|next| next.is_finite() && *next > lo && *next < hi);
        match newton {
            // Step below resolution: NPV is at its floating-point noise floor.
            Some(next) if (next - rate).abs() < config.rate_tolerance => {
                return XirrOutcome::Converged {
                    rate: next,
                    iterations: iteration,
                };
            }
            Some(next) => rate = next,
            None => rate = (lo + hi) / 2.0,
        }
    }

    XirrOutcome::DidNotConverge {
        iterations: config.max_iterations,
    }
}
