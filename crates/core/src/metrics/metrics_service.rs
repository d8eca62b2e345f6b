use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::metrics_calculator::{compute_metric, compute_metrics};
use super::metrics_config::MetricsConfig;
use super::metrics_model::{MetricKind, MetricResult, MetricsBreakdown};
use super::metrics_traits::MetricsServiceTrait;
use crate::errors::{Error, Result};
use crate::funds::FundRepositoryTrait;
use crate::transactions::{FundTransaction, LedgerVersion, TransactionRepositoryTrait};

type CacheKey = (String, LedgerVersion, Option<NaiveDate>);

/// Service that loads a fund's ledger and runs the metrics calculator on it.
///
/// Breakdowns may be cached per `(fund, ledger version, as-of date)`. Any
/// insert or delete changes the ledger version, so a stale entry is never
/// served; [`MetricsServiceTrait::invalidate`] only frees memory.
pub struct MetricsService {
    fund_repository: Arc<dyn FundRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    config: MetricsConfig,
    cache: Option<RwLock<HashMap<CacheKey, MetricsBreakdown>>>,
}

impl MetricsService {
    pub fn new(
        fund_repository: Arc<dyn FundRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        config: MetricsConfig,
    ) -> Self {
        Self {
            fund_repository,
            transaction_repository,
            config,
            cache: None,
        }
    }

    pub fn with_cache(mut self) -> Self {
        self.cache = Some(RwLock::new(HashMap::new()));
        self
    }

    fn ensure_fund_exists(&self, fund_id: &str) -> Result<()> {
        match self.fund_repository.get_by_id(fund_id) {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(Error::fund_not_found(fund_id)),
            Err(e) => Err(e),
        }
    }

    fn cached(&self, key: &CacheKey) -> Option<MetricsBreakdown> {
        let cache = self.cache.as_ref()?;
        let guard = cache.read().ok()?;
        guard.get(key).cloned()
    }

    fn store(&self, key: CacheKey, breakdown: &MetricsBreakdown) {
        if let Some(cache) = &self.cache {
            if let Ok(mut guard) = cache.write() {
                // Older versions of the same fund can never be hit again
                guard.retain(|(fund_id, version, _), _| fund_id != &key.0 || *version == key.1);
                guard.insert(key, breakdown.clone());
            }
        }
    }
}

#[async_trait::async_trait]
impl MetricsServiceTrait for MetricsService {
    async fn get_fund_metrics(
        &self,
        fund_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<MetricsBreakdown> {
        self.ensure_fund_exists(fund_id)?;

        let key = match &self.cache {
            Some(_) => {
                let version = self.transaction_repository.ledger_version(fund_id)?;
                let key = (fund_id.to_string(), version, as_of);
                if let Some(hit) = self.cached(&key) {
                    debug!("Metrics cache hit for fund {}", fund_id);
                    return Ok(hit);
                }
                debug!("Metrics cache miss for fund {}", fund_id);
                Some(key)
            }
            None => None,
        };

        let ledger = self.transaction_repository.get_transactions(fund_id, None)?;
        let config = self.config.clone().with_as_of(as_of);
        let breakdown = compute_metrics(fund_id, &ledger, &config)?;

        if let Some(key) = key {
            self.store(key, &breakdown);
        }
        Ok(breakdown)
    }

    async fn get_fund_metric(
        &self,
        fund_id: &str,
        which: MetricKind,
        as_of: Option<NaiveDate>,
    ) -> Result<MetricResult> {
        self.ensure_fund_exists(fund_id)?;
        let ledger: Vec<FundTransaction> =
            self.transaction_repository.get_transactions(fund_id, None)?;
        let config = self.config.clone().with_as_of(as_of);
        compute_metric(fund_id, &ledger, which, &config)
    }

    fn invalidate(&self, fund_id: &str) {
        if let Some(cache) = &self.cache {
            if let Ok(mut guard) = cache.write() {
                guard.retain(|(cached_fund, _, _), _| cached_fund != fund_id);
            }
        }
    }
}
