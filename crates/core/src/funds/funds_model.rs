//! Fund domain models.

use chrono::{Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Earliest vintage year accepted for a fund
const MIN_VINTAGE_YEAR: i32 = 1900;

/// Domain model representing a private-equity fund.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub name: String,
    /// General partner managing the fund
    pub gp_name: Option<String>,
    /// Strategy label as reported (e.g. "Buyout", "Venture")
    pub fund_type: Option<String>,
    pub vintage_year: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFund {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub gp_name: Option<String>,
    pub fund_type: Option<String>,
    pub vintage_year: Option<i32>,
}

impl NewFund {
    /// Validates the new fund data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Fund name cannot be empty".to_string(),
            )));
        }
        validate_vintage_year(self.vintage_year)
    }
}

/// Input model for updating an existing fund. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FundUpdate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub gp_name: Option<String>,
    pub fund_type: Option<String>,
    pub vintage_year: Option<i32>,
}

impl FundUpdate {
    /// Validates the fund update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Fund ID is required for updates".to_string(),
            )));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Fund name cannot be empty".to_string(),
                )));
            }
        }
        validate_vintage_year(self.vintage_year)
    }

    /// Applies the present fields onto an existing fund.
    pub fn apply_to(self, mut fund: Fund) -> Fund {
        if let Some(name) = self.name {
            fund.name = name;
        }
        if self.gp_name.is_some() {
            fund.gp_name = self.gp_name;
        }
        if self.fund_type.is_some() {
            fund.fund_type = self.fund_type;
        }
        if self.vintage_year.is_some() {
            fund.vintage_year = self.vintage_year;
        }
        fund
    }
}

fn validate_vintage_year(vintage_year: Option<i32>) -> Result<()> {
    let Some(year) = vintage_year else {
        return Ok(());
    };
    let max_year = Utc::now().year() + 1;
    if !(MIN_VINTAGE_YEAR..=max_year).contains(&year) {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Vintage year {} is outside {}..={}",
            year, MIN_VINTAGE_YEAR, max_year
        ))));
    }
    Ok(())
}
