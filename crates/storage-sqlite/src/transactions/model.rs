//! Database models for ledger transactions.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use fundmetrics_core::transactions::{FundTransaction, NewFundTransaction, TransactionType};

use crate::errors::StorageError;

/// Storage format of `transaction_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database model for a ledger row
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::fund_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundTransactionDB {
    pub id: String,
    pub fund_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub transaction_date: String,
    pub subtype: Option<String>,
    pub category: Option<String>,
    pub is_recallable: bool,
    pub is_contribution_adjustment: bool,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for inserting a ledger row
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::fund_transactions)]
pub struct NewFundTransactionDB {
    pub id: String,
    pub fund_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub transaction_date: String,
    pub subtype: Option<String>,
    pub category: Option<String>,
    pub is_recallable: bool,
    pub is_contribution_adjustment: bool,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewFundTransactionDB {
    pub fn from_domain(domain: NewFundTransaction, id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            fund_id: domain.fund_id,
            transaction_type: domain.transaction_type.as_str().to_string(),
            amount: domain.amount.normalize().to_string(),
            transaction_date: domain.transaction_date.format(DATE_FORMAT).to_string(),
            subtype: domain.subtype,
            category: domain.category,
            is_recallable: domain.is_recallable,
            is_contribution_adjustment: domain.is_contribution_adjustment,
            description: domain.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Ledger rows are decoded strictly: a bad amount or date would silently skew
/// every metric, so it surfaces as an error instead.
impl TryFrom<FundTransactionDB> for FundTransaction {
    type Error = StorageError;

    fn try_from(db: FundTransactionDB) -> Result<Self, Self::Error> {
        let corrupt = |column: &'static str, message: String| StorageError::CorruptValue {
            column,
            row_id: db.id.clone(),
            message,
        };

        let transaction_type = TransactionType::from_str(&db.transaction_type)
            .map_err(|e| corrupt("transaction_type", e.to_string()))?;
        let amount =
            Decimal::from_str(&db.amount).map_err(|e| corrupt("amount", e.to_string()))?;
        let transaction_date = NaiveDate::parse_from_str(&db.transaction_date, DATE_FORMAT)
            .map_err(|e| corrupt("transaction_date", e.to_string()))?;

        Ok(Self {
            id: db.id,
            fund_id: db.fund_id,
            transaction_type,
            amount,
            transaction_date,
            subtype: db.subtype,
            category: db.category,
            is_recallable: db.is_recallable,
            is_contribution_adjustment: db.is_contribution_adjustment,
            description: db.description,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

/// Decodes a batch of rows, failing on the first corrupt one.
pub fn decode_rows(rows: Vec<FundTransactionDB>) -> Result<Vec<FundTransaction>, StorageError> {
    rows.into_iter().map(FundTransaction::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(amount: &str, date: &str) -> FundTransactionDB {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        FundTransactionDB {
            id: "tx-1".to_string(),
            fund_id: "fund-1".to_string(),
            transaction_type: "ADJUSTMENT".to_string(),
            amount: amount.to_string(),
            transaction_date: date.to_string(),
            subtype: Some("Recallable Distribution".to_string()),
            category: None,
            is_recallable: false,
            is_contribution_adjustment: true,
            description: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_decodes_text_columns() {
        let tx = FundTransaction::try_from(row("-1250.50", "2023-06-30")).unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Adjustment);
        assert_eq!(tx.amount, dec!(-1250.50));
        assert_eq!(
            tx.transaction_date,
            NaiveDate::from_ymd_opt(2023, 6, 30).unwrap()
        );
    }

    #[test]
    fn test_corrupt_amount_is_an_error() {
        let err = FundTransaction::try_from(row("12,5", "2023-06-30")).unwrap_err();
        assert!(matches!(
            err,
            StorageError::CorruptValue {
                column: "amount",
                ..
            }
        ));
    }

    #[test]
    fn test_corrupt_date_is_an_error() {
        let err = FundTransaction::try_from(row("1", "30/06/2023")).unwrap_err();
        assert!(matches!(
            err,
            StorageError::CorruptValue {
                column: "transaction_date",
                ..
            }
        ));
    }
}
