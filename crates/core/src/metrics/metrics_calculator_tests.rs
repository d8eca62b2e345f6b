use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::metrics_calculator::{compute_metric, compute_metrics, terminal_nav, validate_ledger};
use super::metrics_config::MetricsConfig;
use super::metrics_model::{IrrStatus, MetricKind};
use crate::errors::{CalculatorError, Error};
use crate::transactions::{FundTransaction, TransactionType};

const FUND: &str = "fund-1";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(
    id: &str,
    transaction_type: TransactionType,
    amount: Decimal,
    transaction_date: NaiveDate,
) -> FundTransaction {
    let stamp = transaction_date.and_hms_opt(0, 0, 0).unwrap();
    FundTransaction {
        id: id.to_string(),
        fund_id: FUND.to_string(),
        transaction_type,
        amount,
        transaction_date,
        subtype: None,
        category: None,
        is_recallable: false,
        is_contribution_adjustment: transaction_type == TransactionType::Adjustment,
        description: None,
        created_at: stamp,
        updated_at: stamp,
    }
}

fn call(id: &str, amount: Decimal, on: NaiveDate) -> FundTransaction {
    tx(id, TransactionType::CapitalCall, amount, on)
}

fn dist(id: &str, amount: Decimal, on: NaiveDate) -> FundTransaction {
    tx(id, TransactionType::Distribution, amount, on)
}

fn adj(id: &str, amount: Decimal, on: NaiveDate) -> FundTransaction {
    tx(id, TransactionType::Adjustment, amount, on)
}

fn no_target() -> MetricsConfig {
    MetricsConfig::default().with_target_tvpi(None)
}

#[test]
fn test_empty_ledger_yields_policy_values() {
    let breakdown = compute_metrics(FUND, &[], &MetricsConfig::default()).unwrap();

    assert_eq!(breakdown.pic, Decimal::ZERO);
    assert_eq!(breakdown.total_distributions, Decimal::ZERO);
    assert_eq!(breakdown.dpi, None);
    assert_eq!(breakdown.tvpi, None);
    assert_eq!(breakdown.rvpi, None);
    assert_eq!(breakdown.irr, None);
    assert_eq!(breakdown.irr_status, IrrStatus::InsufficientCashFlows);
    assert_eq!(breakdown.terminal_nav, Decimal::ZERO);
    assert_eq!(breakdown.as_of_date, None);
    assert!(breakdown.cash_flow_trace.is_empty());
}

#[test]
fn test_zero_capital_calls_leave_dpi_undefined() {
    let ledger = vec![dist("d1", dec!(50), date(2021, 6, 30))];
    let breakdown = compute_metrics(FUND, &ledger, &MetricsConfig::default()).unwrap();

    assert_eq!(breakdown.pic, Decimal::ZERO);
    assert_eq!(breakdown.total_distributions, dec!(50));
    assert_eq!(breakdown.dpi, None);
    assert_eq!(breakdown.tvpi, None);
    assert_eq!(breakdown.rvpi, None);
    assert_eq!(breakdown.irr_status, IrrStatus::InsufficientCashFlows);
}

#[test]
fn test_pic_treats_adjustment_sign_as_magnitude() {
    let recall = vec![
        call("c1", dec!(1000), date(2020, 1, 15)),
        adj("a1", dec!(-100), date(2020, 6, 30)),
    ];
    let correction = vec![
        call("c1", dec!(1000), date(2020, 1, 15)),
        adj("a1", dec!(100), date(2020, 6, 30)),
    ];

    let from_recall = compute_metrics(FUND, &recall, &no_target()).unwrap();
    let from_correction = compute_metrics(FUND, &correction, &no_target()).unwrap();

    assert_eq!(from_recall.pic, dec!(900));
    assert_eq!(from_correction.pic, dec!(900));

    let recorded = &from_recall.pic_components.adjustments[0];
    assert_eq!(recorded.stored_amount, dec!(-100));
    assert_eq!(recorded.pic_impact, dec!(-100));
    assert!(recorded.stored_as_recall);
    assert!(!from_correction.pic_components.adjustments[0].stored_as_recall);
    assert_eq!(from_recall.pic_components.stored_adjustment_total, dec!(-100));
    assert_eq!(
        from_recall.pic_components.normalized_adjustment_total,
        dec!(100)
    );
}

#[test]
fn test_pic_is_floored_when_adjustments_exceed_calls() {
    let ledger = vec![
        call("c1", dec!(100), date(2020, 1, 1)),
        adj("a1", dec!(-250), date(2020, 2, 1)),
    ];
    let breakdown = compute_metrics(FUND, &ledger, &MetricsConfig::default()).unwrap();

    assert_eq!(breakdown.pic, Decimal::ZERO);
    assert!(breakdown.pic_components.floored_at_zero);
    assert_eq!(breakdown.dpi, None);
}

#[test]
fn test_same_day_call_and_distribution() {
    let on = date(2022, 3, 31);
    let ledger = vec![call("c1", dec!(100), on), dist("d1", dec!(145), on)];
    let breakdown = compute_metrics(FUND, &ledger, &no_target()).unwrap();

    assert_eq!(breakdown.dpi, Some(dec!(1.45)));
    assert_eq!(breakdown.tvpi, Some(dec!(1.45)));
    assert_eq!(breakdown.rvpi, Some(Decimal::ZERO));
    assert_eq!(breakdown.irr, Some(dec!(45)));
    assert_eq!(breakdown.irr_status, IrrStatus::Instantaneous);
    assert_eq!(breakdown.irr_iterations, None);
}

#[test]
fn test_same_day_ledger_with_terminal_nav_uses_total_value() {
    // Target 1.45 on PIC 100 with 40 distributed: NAV 105 on the same date
    let on = date(2022, 3, 31);
    let ledger = vec![call("c1", dec!(100), on), dist("d1", dec!(40), on)];
    let breakdown = compute_metrics(FUND, &ledger, &MetricsConfig::default()).unwrap();

    assert_eq!(breakdown.terminal_nav, dec!(105));
    assert_eq!(breakdown.irr_status, IrrStatus::Instantaneous);
    assert_eq!(breakdown.irr, Some(dec!(45)));
}

#[test]
fn test_one_year_holding_is_about_ten_percent() {
    let ledger = vec![
        call("c1", dec!(100), date(2020, 1, 1)),
        dist("d1", dec!(110), date(2021, 1, 1)),
    ];
    let breakdown = compute_metrics(FUND, &ledger, &no_target()).unwrap();

    assert_eq!(breakdown.irr_status, IrrStatus::Computed);
    let irr = breakdown.irr.unwrap();
    assert!(
        irr >= dec!(9.9) && irr <= dec!(10.1),
        "expected roughly 10%, got {}",
        irr
    );
    assert_eq!(breakdown.dpi, Some(dec!(1.1)));
    assert_eq!(breakdown.cash_flow_trace.len(), 2);
    assert_eq!(breakdown.cash_flow_trace[0].amount, dec!(-100));
}

#[test]
fn test_terminal_nav_targets_configured_tvpi() {
    let ledger = vec![
        call("c1", dec!(1000), date(2019, 3, 1)),
        call("c2", dec!(1000), date(2019, 9, 1)),
        dist("d1", dec!(500), date(2021, 12, 15)),
    ];
    let breakdown = compute_metrics(FUND, &ledger, &MetricsConfig::default()).unwrap();

    // 1.45 * 2000 - 500
    assert_eq!(breakdown.terminal_nav, dec!(2400));
    assert_eq!(breakdown.tvpi, Some(dec!(1.45)));
    assert_eq!(breakdown.rvpi, Some(dec!(1.2)));
    assert_eq!(breakdown.dpi, Some(dec!(0.25)));
    assert_eq!(breakdown.as_of_date, Some(date(2021, 12, 15)));

    let last = breakdown.cash_flow_trace.last().unwrap();
    assert_eq!(last.label, "TERMINAL_NAV");
    assert_eq!(last.amount, dec!(2400));
    assert_eq!(last.date, date(2021, 12, 15));
    assert_eq!(last.transaction_id, None);
    assert_eq!(breakdown.irr_status, IrrStatus::Computed);
}

#[test]
fn test_terminal_nav_clamps_to_zero_when_distributions_exceed_target() {
    let config = MetricsConfig::default();
    assert_eq!(terminal_nav(dec!(100), dec!(300), &config).unwrap(), Decimal::ZERO);
    assert_eq!(terminal_nav(dec!(100), dec!(100), &config).unwrap(), dec!(45));

    let floored = MetricsConfig {
        min_terminal_nav: dec!(10),
        ..MetricsConfig::default()
    };
    assert_eq!(terminal_nav(dec!(100), dec!(300), &floored).unwrap(), dec!(10));
    assert_eq!(terminal_nav(dec!(100), dec!(300), &no_target()).unwrap(), Decimal::ZERO);
}

#[test]
fn test_zero_terminal_nav_adds_no_cash_flow() {
    let ledger = vec![
        call("c1", dec!(100), date(2020, 1, 1)),
        dist("d1", dec!(200), date(2022, 1, 1)),
    ];
    let breakdown = compute_metrics(FUND, &ledger, &MetricsConfig::default()).unwrap();

    assert_eq!(breakdown.terminal_nav, Decimal::ZERO);
    assert_eq!(breakdown.cash_flow_trace.len(), 2);
    assert!(breakdown
        .cash_flow_trace
        .iter()
        .all(|cf| cf.label != "TERMINAL_NAV"));
}

#[test]
fn test_adjustments_stay_out_of_cash_flows() {
    let ledger = vec![
        call("c1", dec!(100), date(2020, 1, 1)),
        adj("a1", dec!(-10), date(2020, 4, 1)),
        dist("d1", dec!(50), date(2021, 1, 1)),
    ];
    let breakdown = compute_metrics(FUND, &ledger, &no_target()).unwrap();

    assert!(breakdown
        .cash_flow_trace
        .iter()
        .all(|cf| cf.transaction_id.as_deref() != Some("a1")));
    assert_eq!(breakdown.pic, dec!(90));
}

#[test]
fn test_explicit_as_of_excludes_later_transactions() {
    let ledger = vec![
        call("c1", dec!(100), date(2020, 1, 1)),
        dist("d1", dec!(40), date(2021, 1, 1)),
        dist("d2", dec!(80), date(2023, 1, 1)),
    ];
    let config = MetricsConfig::default().with_as_of(Some(date(2022, 6, 30)));
    let breakdown = compute_metrics(FUND, &ledger, &config).unwrap();

    assert_eq!(breakdown.excluded_after_as_of, 1);
    assert_eq!(breakdown.total_distributions, dec!(40));
    assert_eq!(breakdown.distribution_count, 1);
    assert_eq!(breakdown.as_of_date, Some(date(2022, 6, 30)));
    assert_eq!(
        breakdown.cash_flow_trace.last().unwrap().date,
        date(2022, 6, 30)
    );
}

#[test]
fn test_irr_failure_keeps_other_metrics() {
    // Calls only, no target: nothing ever flows back
    let ledger = vec![
        call("c1", dec!(100), date(2020, 1, 1)),
        call("c2", dec!(100), date(2021, 1, 1)),
    ];
    let breakdown = compute_metrics(FUND, &ledger, &no_target()).unwrap();

    assert_eq!(breakdown.irr, None);
    assert_eq!(breakdown.irr_status, IrrStatus::NoSignChange);
    assert_eq!(breakdown.pic, dec!(200));
    assert_eq!(breakdown.dpi, Some(Decimal::ZERO));
}

#[test]
fn test_results_do_not_depend_on_input_order() {
    let ledger = vec![
        dist("d1", dec!(30), date(2021, 5, 1)),
        call("c2", dec!(60), date(2020, 7, 1)),
        adj("a1", dec!(5), date(2020, 8, 1)),
        call("c1", dec!(40), date(2020, 1, 1)),
    ];
    let mut reversed = ledger.clone();
    reversed.reverse();

    let config = MetricsConfig::default();
    let a = compute_metrics(FUND, &ledger, &config).unwrap();
    let b = compute_metrics(FUND, &reversed, &config).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.cash_flow_trace[0].transaction_id.as_deref(), Some("c1"));
}

#[test]
fn test_foreign_transaction_is_rejected() {
    let mut stray = call("c1", dec!(100), date(2020, 1, 1));
    stray.fund_id = "fund-2".to_string();

    let err = compute_metrics(FUND, &[stray], &MetricsConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Calculation(CalculatorError::ForeignTransaction { .. })
    ));
}

#[test]
fn test_negative_distribution_is_rejected() {
    let ledger = vec![dist("d1", dec!(-5), date(2020, 1, 1))];
    let err = validate_ledger(FUND, &ledger).unwrap_err();
    assert!(matches!(
        err,
        Error::Calculation(CalculatorError::NegativeMagnitude { .. })
    ));

    let adjustments_may_be_negative = vec![adj("a1", dec!(-5), date(2020, 1, 1))];
    assert!(validate_ledger(FUND, &adjustments_may_be_negative).is_ok());
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = MetricsConfig {
        min_terminal_nav: dec!(-1),
        ..MetricsConfig::default()
    };
    let err = compute_metrics(FUND, &[], &config).unwrap_err();
    assert!(matches!(
        err,
        Error::Calculation(CalculatorError::InvalidConfig(_))
    ));
}

#[test]
fn test_compute_metric_pic_lists_calls_and_adjustments() {
    let ledger = vec![
        call("c1", dec!(1000), date(2020, 1, 1)),
        dist("d1", dec!(300), date(2021, 1, 1)),
        adj("a1", dec!(-50), date(2020, 6, 1)),
    ];
    let result = compute_metric(FUND, &ledger, MetricKind::Pic, &MetricsConfig::default())
        .unwrap();

    assert_eq!(result.metric, MetricKind::Pic);
    assert_eq!(result.value, Some(dec!(950)));
    assert_eq!(result.transactions.len(), 2);
    assert!(result
        .transactions
        .iter()
        .all(|t| t.transaction_type != TransactionType::Distribution));
    assert!(result.explanation.contains("950"));
    assert!(result.cash_flow_summary.is_none());
}

#[test]
fn test_compute_metric_irr_carries_cash_flow_summary() {
    let ledger = vec![
        call("c1", dec!(100), date(2020, 1, 1)),
        dist("d1", dec!(110), date(2021, 1, 1)),
    ];
    let result = compute_metric(FUND, &ledger, MetricKind::Irr, &no_target()).unwrap();

    let summary = result.cash_flow_summary.unwrap();
    assert_eq!(summary.total_outflows, dec!(-100));
    assert_eq!(summary.total_inflows, dec!(110));
    assert_eq!(summary.net_cash_flow, dec!(10));
    assert_eq!(result.value, result.breakdown.irr);
}

#[test]
fn test_compute_metric_explains_undefined_ratio() {
    let result = compute_metric(FUND, &[], MetricKind::Dpi, &MetricsConfig::default()).unwrap();
    assert_eq!(result.value, None);
    assert!(result.explanation.contains("undefined"));
}

#[test]
fn test_breakdown_serializes_decimals_as_numbers() {
    let ledger = vec![
        call("c1", dec!(100), date(2020, 1, 1)),
        dist("d1", dec!(145), date(2020, 1, 1)),
    ];
    let breakdown = compute_metrics(FUND, &ledger, &no_target()).unwrap();
    let json = serde_json::to_value(&breakdown).unwrap();

    assert_eq!(json["dpi"], serde_json::json!(1.45));
    assert_eq!(json["irr"], serde_json::json!(45.0));
    assert_eq!(json["irrStatus"], "INSTANTANEOUS");
    assert_eq!(json["fundId"], FUND);
}

#[test]
fn test_totals_beyond_decimal_range_are_rejected() {
    let huge = Decimal::from_scientific("5e28").unwrap();
    let ledger = vec![
        call("c1", huge, date(2020, 1, 1)),
        call("c2", huge, date(2021, 1, 1)),
    ];
    let err = compute_metrics(FUND, &ledger, &MetricsConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Calculation(CalculatorError::Overflow("total capital calls"))
    ));

    let err = compute_metric(FUND, &ledger, MetricKind::Pic, &no_target()).unwrap_err();
    assert!(matches!(err, Error::Calculation(CalculatorError::Overflow(_))));
}

#[test]
fn test_terminal_nav_beyond_decimal_range_is_rejected() {
    // PIC itself fits; only the target multiple pushes it out of range
    let big = Decimal::from_scientific("6e28").unwrap();
    let ledger = vec![
        call("c1", big, date(2020, 1, 1)),
        dist("d1", dec!(1), date(2021, 1, 1)),
    ];
    let err = compute_metrics(FUND, &ledger, &MetricsConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Calculation(CalculatorError::Overflow("target TVPI times PIC"))
    ));

    let breakdown = compute_metrics(FUND, &ledger, &no_target()).unwrap();
    assert_eq!(breakdown.pic, big);
    assert_eq!(breakdown.terminal_nav, Decimal::ZERO);
}
