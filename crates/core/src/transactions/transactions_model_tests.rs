use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use super::transactions_model::{NewFundTransaction, TransactionPage, TransactionType};

fn new_tx(transaction_type: TransactionType, amount: Decimal) -> NewFundTransaction {
    NewFundTransaction {
        id: None,
        fund_id: "fund-1".to_string(),
        transaction_type,
        amount,
        transaction_date: NaiveDate::from_ymd_opt(2022, 3, 31).unwrap(),
        subtype: None,
        category: None,
        is_recallable: false,
        is_contribution_adjustment: false,
        description: None,
    }
}

#[test]
fn test_parse_transaction_type_accepts_extraction_names() {
    assert_eq!(
        TransactionType::from_str("capital_calls").unwrap(),
        TransactionType::CapitalCall
    );
    assert_eq!(
        TransactionType::from_str("Distribution").unwrap(),
        TransactionType::Distribution
    );
    assert_eq!(
        TransactionType::from_str(" ADJUSTMENTS ").unwrap(),
        TransactionType::Adjustment
    );
    assert!(TransactionType::from_str("fees").is_err());
}

#[test]
fn test_transaction_type_serializes_screaming_snake_case() {
    let json = serde_json::to_string(&TransactionType::CapitalCall).unwrap();
    assert_eq!(json, "\"CAPITAL_CALL\"");
}

#[test]
fn test_negative_capital_call_is_rejected() {
    assert!(new_tx(TransactionType::CapitalCall, dec!(-100))
        .validate()
        .is_err());
}

#[test]
fn test_negative_distribution_is_rejected() {
    assert!(new_tx(TransactionType::Distribution, dec!(-5))
        .validate()
        .is_err());
}

#[test]
fn test_adjustment_accepts_either_sign() {
    assert!(new_tx(TransactionType::Adjustment, dec!(-25))
        .validate()
        .is_ok());
    assert!(new_tx(TransactionType::Adjustment, dec!(25))
        .validate()
        .is_ok());
}

#[test]
fn test_recallable_flag_only_on_distributions() {
    let mut tx = new_tx(TransactionType::CapitalCall, dec!(10));
    tx.is_recallable = true;
    assert!(tx.validate().is_err());

    let mut tx = new_tx(TransactionType::Distribution, dec!(10));
    tx.is_recallable = true;
    assert!(tx.validate().is_ok());
}

#[test]
fn test_blank_fund_id_is_rejected() {
    let mut tx = new_tx(TransactionType::Distribution, dec!(10));
    tx.fund_id = " ".to_string();
    assert!(tx.validate().is_err());
}

#[test]
fn test_missing_date_fails_deserialization() {
    let json = r#"{"fundId":"fund-1","transactionType":"CAPITAL_CALL","amount":100}"#;
    assert!(serde_json::from_str::<NewFundTransaction>(json).is_err());
}

#[test]
fn test_page_count_rounds_up() {
    let page = TransactionPage::new(Vec::new(), 101, 1, 50);
    assert_eq!(page.pages, 3);
    let empty = TransactionPage::new(Vec::new(), 0, 1, 50);
    assert_eq!(empty.pages, 0);
}
