use log::debug;
use std::sync::Arc;

use super::funds_model::{Fund, FundUpdate, NewFund};
use super::funds_traits::{FundRepositoryTrait, FundServiceTrait};
use crate::errors::{Error, Result};

/// Upper bound on a single fund listing page
const MAX_LIST_LIMIT: i64 = 500;

/// Service for managing funds
pub struct FundService {
    repository: Arc<dyn FundRepositoryTrait>,
}

impl FundService {
    /// Creates a new FundService instance
    pub fn new(repository: Arc<dyn FundRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl FundServiceTrait for FundService {
    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund> {
        new_fund.validate()?;
        debug!("Creating fund '{}'", new_fund.name);
        self.repository.create(new_fund).await
    }

    async fn update_fund(&self, fund_update: FundUpdate) -> Result<Fund> {
        fund_update.validate()?;
        self.repository.update(fund_update).await
    }

    async fn delete_fund(&self, fund_id: &str) -> Result<()> {
        let deleted = self.repository.delete(fund_id).await?;
        if deleted == 0 {
            return Err(Error::fund_not_found(fund_id));
        }
        Ok(())
    }

    fn get_fund(&self, fund_id: &str) -> Result<Fund> {
        self.repository.get_by_id(fund_id).map_err(|e| {
            if e.is_not_found() {
                Error::fund_not_found(fund_id)
            } else {
                e
            }
        })
    }

    fn list_funds(&self, skip: i64, limit: i64) -> Result<Vec<Fund>> {
        self.repository
            .list(skip.max(0), limit.clamp(1, MAX_LIST_LIMIT))
    }
}
