//! Database models for funds.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use fundmetrics_core::funds::{Fund, NewFund};

/// Database model for funds
#[derive(Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::funds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundDB {
    pub id: String,
    pub name: String,
    pub gp_name: Option<String>,
    pub fund_type: Option<String>,
    pub vintage_year: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for creating a new fund
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::funds)]
pub struct NewFundDB {
    pub id: String,
    pub name: String,
    pub gp_name: Option<String>,
    pub fund_type: Option<String>,
    pub vintage_year: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewFundDB {
    pub fn from_domain(domain: NewFund, id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            name: domain.name.trim().to_string(),
            gp_name: domain.gp_name,
            fund_type: domain.fund_type,
            vintage_year: domain.vintage_year,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<FundDB> for Fund {
    fn from(db: FundDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            gp_name: db.gp_name,
            fund_type: db.fund_type,
            vintage_year: db.vintage_year,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Fund> for FundDB {
    fn from(domain: Fund) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            gp_name: domain.gp_name,
            fund_type: domain.fund_type,
            vintage_year: domain.vintage_year,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}
