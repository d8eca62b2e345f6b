//! Pure PIC / DPI / TVPI / RVPI / IRR calculation over a ledger snapshot.
//!
//! Nothing in here touches storage, the clock or shared state: the same
//! snapshot and configuration always produce the same breakdown. Each metric
//! is derived independently, so an undefined IRR never hides a valid PIC or
//! DPI.

use chrono::NaiveDate;
use log::{debug, warn};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::cmp::Ordering;

use super::metrics_config::MetricsConfig;
use super::metrics_model::{
    AdjustmentNormalization, CashFlow, CashFlowSummary, IrrStatus, MetricKind, MetricResult,
    MetricsBreakdown, PicComponents,
};
use super::xirr::{xirr, XirrConfig, XirrOutcome};
use crate::constants::{
    CASH_FLOW_LABEL_CAPITAL_CALL, CASH_FLOW_LABEL_DISTRIBUTION, CASH_FLOW_LABEL_TERMINAL_NAV,
    DISPLAY_DECIMAL_PRECISION, MULTIPLE_PRECISION,
};
use crate::errors::{CalculatorError, Result};
use crate::transactions::{FundTransaction, TransactionType};

/// Computes every metric for `fund_id` from its ledger.
///
/// Fails only when the ledger or configuration break the input contract;
/// undefined metrics come back as `None`.
pub fn compute_metrics(
    fund_id: &str,
    transactions: &[FundTransaction],
    config: &MetricsConfig,
) -> Result<MetricsBreakdown> {
    config.validate()?;
    validate_ledger(fund_id, transactions)?;

    let (ledger, excluded_after_as_of) = snapshot(transactions, config.as_of_date);
    let as_of_date = config
        .as_of_date
        .or_else(|| ledger.iter().map(|tx| tx.transaction_date).max());

    let pic_components = pic_components(&ledger)?;
    let pic = pic_from_components(&pic_components);
    let total_distributions = sum_of_type(&ledger, TransactionType::Distribution)?;
    let distribution_count = count_of_type(&ledger, TransactionType::Distribution);
    let terminal_nav = terminal_nav(pic, total_distributions, config)?;
    let total_value = total_distributions
        .checked_add(terminal_nav)
        .ok_or(CalculatorError::Overflow("distributions plus terminal NAV"))?;

    let cash_flow_trace = cash_flow_trace(&ledger, as_of_date, terminal_nav);
    let (mut irr_status, mut irr_rate, irr_iterations) =
        solve_irr(&cash_flow_trace, &config.solver);
    let mut irr = None;
    if let Some(rate) = irr_rate {
        match rate.checked_mul(Decimal::ONE_HUNDRED) {
            Some(percent) => irr = Some(percent.round_dp(DISPLAY_DECIMAL_PRECISION)),
            None => {
                irr_status = IrrStatus::NumericalError;
                irr_rate = None;
            }
        }
    }
    if irr.is_none() {
        debug!(
            "IRR undefined for fund {}: {}",
            fund_id,
            irr_status.describe()
        );
    }

    Ok(MetricsBreakdown {
        fund_id: fund_id.to_string(),
        as_of_date,
        pic,
        total_distributions,
        dpi: multiple(total_distributions, pic),
        irr,
        irr_rate,
        irr_status,
        irr_iterations,
        tvpi: multiple(total_value, pic),
        rvpi: multiple(terminal_nav, pic),
        terminal_nav,
        pic_components,
        distribution_count,
        cash_flow_trace,
        excluded_after_as_of,
        config: config.clone(),
    })
}

/// Computes a single metric together with the evidence behind it.
pub fn compute_metric(
    fund_id: &str,
    transactions: &[FundTransaction],
    which: MetricKind,
    config: &MetricsConfig,
) -> Result<MetricResult> {
    let breakdown = compute_metrics(fund_id, transactions, config)?;
    let (ledger, _) = snapshot(transactions, config.as_of_date);
    let of_types = |types: &[TransactionType]| -> Vec<FundTransaction> {
        ledger
            .iter()
            .filter(|tx| types.contains(&tx.transaction_type))
            .map(|tx| (*tx).clone())
            .collect()
    };

    let pic = breakdown.pic;
    let distributions = breakdown.total_distributions;
    let nav = breakdown.terminal_nav;

    let (value, formula, explanation, transactions, cash_flow_summary) = match which {
        MetricKind::Pic => {
            let components = &breakdown.pic_components;
            (
                Some(pic),
                "Total Capital Calls - |Adjustments|",
                format!(
                    "PIC = {} - {} = {}{}",
                    components.total_capital_calls,
                    components.normalized_adjustment_total,
                    pic,
                    if components.floored_at_zero {
                        " (floored at zero)"
                    } else {
                        ""
                    }
                ),
                of_types(&[TransactionType::CapitalCall, TransactionType::Adjustment]),
                None,
            )
        }
        MetricKind::Dpi => (
            breakdown.dpi,
            "Cumulative Distributions / Paid-In Capital",
            ratio_explanation("DPI", distributions, pic, breakdown.dpi),
            of_types(&TransactionType::ALL),
            None,
        ),
        MetricKind::Irr => {
            let explanation = match breakdown.irr {
                Some(irr) => format!(
                    "IRR calculated from {} cash flows = {}%",
                    breakdown.cash_flow_trace.len(),
                    irr
                ),
                None => format!("IRR undefined: {}", breakdown.irr_status.describe()),
            };
            (
                breakdown.irr,
                "Internal Rate of Return (XIRR, NPV = 0, 365-day years)",
                explanation,
                of_types(&[TransactionType::CapitalCall, TransactionType::Distribution]),
                Some(CashFlowSummary::from_trace(&breakdown.cash_flow_trace)),
            )
        }
        MetricKind::Tvpi => (
            breakdown.tvpi,
            "(Cumulative Distributions + Terminal NAV) / Paid-In Capital",
            ratio_explanation("TVPI", distributions.saturating_add(nav), pic, breakdown.tvpi),
            of_types(&TransactionType::ALL),
            None,
        ),
        MetricKind::Rvpi => (
            breakdown.rvpi,
            "Terminal NAV / Paid-In Capital",
            ratio_explanation("RVPI", nav, pic, breakdown.rvpi),
            of_types(&TransactionType::ALL),
            None,
        ),
        MetricKind::All => (
            None,
            "PIC, DPI, IRR, TVPI, RVPI",
            format!(
                "PIC = {}, distributions = {}, terminal NAV = {}, IRR {}",
                pic,
                distributions,
                nav,
                breakdown.irr_status.describe()
            ),
            of_types(&TransactionType::ALL),
            Some(CashFlowSummary::from_trace(&breakdown.cash_flow_trace)),
        ),
    };

    Ok(MetricResult {
        fund_id: fund_id.to_string(),
        metric: which,
        value,
        formula: formula.to_string(),
        explanation,
        transactions,
        cash_flow_summary,
        breakdown,
    })
}

/// Rejects ledgers the calculator must not silently coerce.
pub fn validate_ledger(fund_id: &str, transactions: &[FundTransaction]) -> Result<()> {
    for tx in transactions {
        if tx.fund_id != fund_id {
            return Err(CalculatorError::ForeignTransaction {
                transaction_id: tx.id.clone(),
                expected_fund_id: fund_id.to_string(),
                actual_fund_id: tx.fund_id.clone(),
            }
            .into());
        }
        if tx.transaction_type.requires_positive_magnitude() && tx.amount.is_sign_negative() {
            return Err(CalculatorError::NegativeMagnitude {
                transaction_id: tx.id.clone(),
                transaction_type: tx.transaction_type.to_string(),
                date: tx.transaction_date,
                amount: tx.amount.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// Date-ordered view of the ledger, cut at the as-of date when one is given.
///
/// Ties are broken by type and then id so that the trace order never depends
/// on the order storage happened to return rows in.
fn snapshot(
    transactions: &[FundTransaction],
    as_of_date: Option<NaiveDate>,
) -> (Vec<&FundTransaction>, usize) {
    let mut ledger: Vec<&FundTransaction> = transactions
        .iter()
        .filter(|tx| as_of_date.map_or(true, |as_of| tx.transaction_date <= as_of))
        .collect();
    let excluded = transactions.len() - ledger.len();
    ledger.sort_by(|a, b| {
        a.transaction_date
            .cmp(&b.transaction_date)
            .then_with(|| type_rank(a.transaction_type).cmp(&type_rank(b.transaction_type)))
            .then_with(|| a.id.cmp(&b.id))
    });
    (ledger, excluded)
}

fn type_rank(transaction_type: TransactionType) -> u8 {
    match transaction_type {
        TransactionType::CapitalCall => 0,
        TransactionType::Distribution => 1,
        TransactionType::Adjustment => 2,
    }
}

/// Sums `amounts`, failing instead of panicking when the total leaves the
/// `Decimal` range.
fn checked_sum(
    amounts: impl IntoIterator<Item = Decimal>,
    what: &'static str,
) -> Result<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| CalculatorError::Overflow(what).into())
}

fn sum_of_type(
    ledger: &[&FundTransaction],
    transaction_type: TransactionType,
) -> Result<Decimal> {
    let what = match transaction_type {
        TransactionType::CapitalCall => "total capital calls",
        TransactionType::Distribution => "total distributions",
        TransactionType::Adjustment => "total adjustments",
    };
    checked_sum(
        ledger
            .iter()
            .filter(|tx| tx.transaction_type == transaction_type)
            .map(|tx| tx.amount),
        what,
    )
}

fn count_of_type(ledger: &[&FundTransaction], transaction_type: TransactionType) -> usize {
    ledger
        .iter()
        .filter(|tx| tx.transaction_type == transaction_type)
        .count()
}

/// Capital calls less adjustment magnitudes.
///
/// Adjustments always reduce PIC. A recall stored as `-X` and a correction
/// stored as `+X` both contribute `-X`; summing signed values instead would
/// add recalls back onto PIC.
fn pic_components(ledger: &[&FundTransaction]) -> Result<PicComponents> {
    let adjustments: Vec<AdjustmentNormalization> = ledger
        .iter()
        .filter(|tx| tx.transaction_type == TransactionType::Adjustment)
        .map(|tx| AdjustmentNormalization {
            transaction_id: tx.id.clone(),
            date: tx.transaction_date,
            stored_amount: tx.amount,
            pic_impact: -tx.amount.abs(),
            stored_as_recall: tx.amount < Decimal::ZERO,
        })
        .collect();

    let total_capital_calls = sum_of_type(ledger, TransactionType::CapitalCall)?;
    let normalized_adjustment_total = checked_sum(
        adjustments.iter().map(|adj| adj.stored_amount.abs()),
        "total adjustment magnitude",
    )?;
    let stored_adjustment_total = sum_of_type(ledger, TransactionType::Adjustment)?;

    Ok(PicComponents {
        total_capital_calls,
        capital_call_count: count_of_type(ledger, TransactionType::CapitalCall),
        stored_adjustment_total,
        normalized_adjustment_total,
        floored_at_zero: total_capital_calls < normalized_adjustment_total,
        adjustments,
    })
}

fn pic_from_components(components: &PicComponents) -> Decimal {
    (components.total_capital_calls - components.normalized_adjustment_total).max(Decimal::ZERO)
}

/// Residual value that lifts TVPI to the configured target.
///
/// `max(target * PIC - distributions, min_terminal_nav, 0)`; zero when no
/// target is configured.
pub fn terminal_nav(
    pic: Decimal,
    total_distributions: Decimal,
    config: &MetricsConfig,
) -> Result<Decimal> {
    let Some(target) = config.target_tvpi else {
        return Ok(Decimal::ZERO);
    };
    let floor = config.min_terminal_nav.max(Decimal::ZERO);
    let gap = target
        .checked_mul(pic)
        .and_then(|target_value| target_value.checked_sub(total_distributions))
        .ok_or(CalculatorError::Overflow("target TVPI times PIC"))?;
    if gap < Decimal::ZERO {
        debug!(
            "Distributions {} already exceed target TVPI {} on PIC {}; terminal NAV clamped",
            total_distributions, target, pic
        );
    }
    Ok(gap.max(floor))
}

/// Capital calls out, distributions in, terminal NAV last. Adjustments never
/// enter the stream.
fn cash_flow_trace(
    ledger: &[&FundTransaction],
    as_of_date: Option<NaiveDate>,
    terminal_nav: Decimal,
) -> Vec<CashFlow> {
    let mut trace: Vec<CashFlow> = ledger
        .iter()
        .filter_map(|tx| {
            let (amount, label) = match tx.transaction_type {
                TransactionType::CapitalCall => (-tx.amount, CASH_FLOW_LABEL_CAPITAL_CALL),
                TransactionType::Distribution => (tx.amount, CASH_FLOW_LABEL_DISTRIBUTION),
                TransactionType::Adjustment => return None,
            };
            Some(CashFlow {
                date: tx.transaction_date,
                amount,
                label: label.to_string(),
                transaction_id: Some(tx.id.clone()),
            })
        })
        .collect();

    if let Some(date) = as_of_date {
        if terminal_nav > Decimal::ZERO {
            trace.push(CashFlow {
                date,
                amount: terminal_nav,
                label: CASH_FLOW_LABEL_TERMINAL_NAV.to_string(),
                transaction_id: None,
            });
        }
    }
    trace
}

fn solve_irr(
    trace: &[CashFlow],
    solver: &XirrConfig,
) -> (IrrStatus, Option<Decimal>, Option<u32>) {
    let flows: Option<Vec<(NaiveDate, f64)>> = trace
        .iter()
        .map(|cf| cf.amount.to_f64().map(|amount| (cf.date, amount)))
        .collect();
    let Some(flows) = flows else {
        warn!("Cash flow amount not representable as f64; IRR left undefined");
        return (IrrStatus::NumericalError, None, None);
    };

    match xirr(&flows, solver) {
        XirrOutcome::Converged { rate, iterations } => match Decimal::from_f64(rate) {
            Some(rate) => (IrrStatus::Computed, Some(rate), Some(iterations)),
            None => (IrrStatus::NumericalError, None, Some(iterations)),
        },
        XirrOutcome::InsufficientFlows => (IrrStatus::InsufficientCashFlows, None, None),
        XirrOutcome::NoSignChange => (IrrStatus::NoSignChange, None, None),
        XirrOutcome::Instantaneous { rate } => match Decimal::from_f64(rate) {
            Some(rate) => (IrrStatus::Instantaneous, Some(rate), None),
            None => (IrrStatus::NumericalError, None, None),
        },
        XirrOutcome::NoRootInRange => (IrrStatus::NoRootInRange, None, None),
        XirrOutcome::DidNotConverge { iterations } => {
            warn!("XIRR did not converge after {} iterations", iterations);
            (IrrStatus::DidNotConverge, None, Some(iterations))
        }
        XirrOutcome::NumericalError => (IrrStatus::NumericalError, None, None),
    }
}

/// `numerator / pic`, or `None` when PIC is zero.
fn multiple(numerator: Decimal, pic: Decimal) -> Option<Decimal> {
    match pic.cmp(&Decimal::ZERO) {
        Ordering::Greater => numerator
            .checked_div(pic)
            .map(|value| value.round_dp(MULTIPLE_PRECISION)),
        _ => None,
    }
}

fn ratio_explanation(
    name: &str,
    numerator: Decimal,
    pic: Decimal,
    value: Option<Decimal>,
) -> String {
    match value {
        Some(value) => format!("{} = {} / {} = {}", name, numerator, pic, value),
        None => format!("{} undefined: Paid-In Capital is zero", name),
    }
}
