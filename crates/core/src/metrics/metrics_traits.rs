//! Metrics service trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::metrics_model::{MetricKind, MetricResult, MetricsBreakdown};
use crate::errors::Result;

/// Trait defining the contract for fund performance queries.
///
/// Consumers (HTTP handlers, the chat context builder) only ever see this
/// trait; they never call the calculator directly.
#[async_trait]
pub trait MetricsServiceTrait: Send + Sync {
    /// Full breakdown for a fund as of `as_of`, or as of its latest
    /// transaction when `None`.
    async fn get_fund_metrics(
        &self,
        fund_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<MetricsBreakdown>;

    async fn get_fund_metric(
        &self,
        fund_id: &str,
        which: MetricKind,
        as_of: Option<NaiveDate>,
    ) -> Result<MetricResult>;

    /// Drops every cached breakdown of a fund.
    fn invalidate(&self, fund_id: &str);
}
