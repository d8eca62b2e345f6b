//! Request and response shapes of the HTTP API.
//!
//! Domain types from `fundmetrics-core` are returned as-is where their JSON
//! form already fits; these wrappers cover paging, embedding and path-scoped
//! inputs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fundmetrics_core::funds::Fund;
use fundmetrics_core::metrics::{IrrStatus, MetricResult, MetricsBreakdown};
use fundmetrics_core::transactions::{NewFundTransaction, TransactionType};

pub const DEFAULT_PAGE_LIMIT: i64 = 50;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    pub transaction_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    pub metric: Option<String>,
    pub as_of: Option<NaiveDate>,
}

/// Headline numbers embedded in fund listings.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub as_of_date: Option<NaiveDate>,
    pub pic: Decimal,
    pub total_distributions: Decimal,
    pub dpi: Option<Decimal>,
    pub irr: Option<Decimal>,
    pub irr_status: IrrStatus,
    pub tvpi: Option<Decimal>,
    pub rvpi: Option<Decimal>,
    pub terminal_nav: Decimal,
}

impl From<&MetricsBreakdown> for MetricsSummary {
    fn from(b: &MetricsBreakdown) -> Self {
        Self {
            as_of_date: b.as_of_date,
            pic: b.pic,
            total_distributions: b.total_distributions,
            dpi: b.dpi,
            irr: b.irr,
            irr_status: b.irr_status,
            tvpi: b.tvpi,
            rvpi: b.rvpi,
            terminal_nav: b.terminal_nav,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FundListItem {
    #[serde(flatten)]
    pub fund: Fund,
    /// `None` when the fund's ledger could not be evaluated
    pub metrics: Option<MetricsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_error: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FundDetail {
    #[serde(flatten)]
    pub fund: Fund,
    pub metrics: MetricsBreakdown,
}

/// A transaction posted under `/funds/{id}/transactions`; the fund comes
/// from the path.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewTransactionBody {
    pub id: Option<String>,
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

impl NewTransactionBody {
    pub fn into_domain(self, fund_id: &str) -> NewFundTransaction {
        NewFundTransaction {
            id: self.id,
            fund_id: fund_id.to_string(),
            transaction_type: self.transaction_type,
            amount: self.amount,
            transaction_date: self.transaction_date,
            subtype: self.subtype,
            category: self.category,
            is_recallable: self.is_recallable,
            is_contribution_adjustment: self.is_contribution_adjustment,
            description: self.description,
        }
    }
}

/// `metric=all` (or none) returns the breakdown; any single metric returns
/// its formula and evidence.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum MetricsResponse {
    Breakdown(Box<MetricsBreakdown>),
    Metric(Box<MetricResult>),
}
