//! Fund repository and service traits.
//!
//! These traits define the contract for fund operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::funds_model::{Fund, FundUpdate, NewFund};
use crate::errors::Result;

/// Trait defining the contract for Fund repository operations.
#[async_trait]
pub trait FundRepositoryTrait: Send + Sync {
    /// Creates a new fund.
    async fn create(&self, new_fund: NewFund) -> Result<Fund>;

    /// Updates an existing fund.
    async fn update(&self, fund_update: FundUpdate) -> Result<Fund>;

    /// Deletes a fund and, through the foreign key, its transactions.
    ///
    /// Returns the number of deleted fund records.
    async fn delete(&self, fund_id: &str) -> Result<usize>;

    /// Retrieves a fund by its ID.
    fn get_by_id(&self, fund_id: &str) -> Result<Fund>;

    /// Lists funds ordered by name, with offset/limit paging.
    fn list(&self, skip: i64, limit: i64) -> Result<Vec<Fund>>;
}

/// Trait defining the contract for Fund service operations.
#[async_trait]
pub trait FundServiceTrait: Send + Sync {
    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund>;

    async fn update_fund(&self, fund_update: FundUpdate) -> Result<Fund>;

    /// Deletes a fund. Fails with `NotFound` when nothing was deleted.
    async fn delete_fund(&self, fund_id: &str) -> Result<()>;

    fn get_fund(&self, fund_id: &str) -> Result<Fund>;

    fn list_funds(&self, skip: i64, limit: i64) -> Result<Vec<Fund>>;
}
