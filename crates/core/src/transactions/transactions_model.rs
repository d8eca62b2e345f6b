//! Transaction domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{errors::ValidationError, Error, Result};

/// Kind of cash movement recorded in a fund ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Capital drawn from limited partners, stored as a positive magnitude
    CapitalCall,
    /// Cash returned to limited partners, stored as a positive magnitude
    Distribution,
    /// Recallable-distribution or fee/expense correction; either sign
    Adjustment,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::CapitalCall,
        TransactionType::Distribution,
        TransactionType::Adjustment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::CapitalCall => "CAPITAL_CALL",
            TransactionType::Distribution => "DISTRIBUTION",
            TransactionType::Adjustment => "ADJUSTMENT",
        }
    }

    /// Capital calls and distributions must be stored as non-negative magnitudes.
    pub fn requires_positive_magnitude(&self) -> bool {
        !matches!(self, TransactionType::Adjustment)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    /// Accepts the canonical names as well as the plural, lowercase collection
    /// names used by the document extraction output (`capital_calls`, ...).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CAPITAL_CALL" | "CAPITAL_CALLS" => Ok(TransactionType::CapitalCall),
            "DISTRIBUTION" | "DISTRIBUTIONS" => Ok(TransactionType::Distribution),
            "ADJUSTMENT" | "ADJUSTMENTS" => Ok(TransactionType::Adjustment),
            _ => Err(Error::Validation(ValidationError::UnknownTransactionType(
                s.to_string(),
            ))),
        }
    }
}

/// Domain model representing one persisted ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundTransaction {
    pub id: String,
    pub fund_id: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    /// Call type, distribution type or adjustment type as reported
    pub subtype: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub is_recallable: bool,
    #[serde(default)]
    pub is_contribution_adjustment: bool,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for a transaction extracted from a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFundTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub fund_id: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub subtype: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub is_recallable: bool,
    #[serde(default)]
    pub is_contribution_adjustment: bool,
    pub description: Option<String>,
}

impl NewFundTransaction {
    /// Validates the transaction at the ledger boundary.
    ///
    /// Missing dates or amounts are already rejected by deserialization; this
    /// checks the sign convention and ownership fields.
    pub fn validate(&self) -> Result<()> {
        if self.fund_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "fundId".to_string(),
            )));
        }
        if self.transaction_type.requires_positive_magnitude() && self.amount.is_sign_negative()
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "{} amount must be a positive magnitude, got {}",
                self.transaction_type, self.amount
            ))));
        }
        if self.is_recallable && self.transaction_type != TransactionType::Distribution {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Only distributions can be recallable, got {}",
                self.transaction_type
            ))));
        }
        if self.is_contribution_adjustment && self.transaction_type != TransactionType::Adjustment
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Only adjustments can be contribution adjustments, got {}",
                self.transaction_type
            ))));
        }
        Ok(())
    }
}

/// One page of a fund's ledger, filtered by type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub items: Vec<FundTransaction>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

impl TransactionPage {
    pub fn new(items: Vec<FundTransaction>, total: i64, page: i64, limit: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            items,
            total,
            page,
            pages,
        }
    }
}

/// Marker that changes whenever a fund's ledger is mutated.
///
/// Inserts bump the count and the latest timestamp; deletes lower the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LedgerVersion {
    pub transaction_count: i64,
    pub last_modified: Option<NaiveDateTime>,
}
