//! Transaction repository and service traits.

use async_trait::async_trait;

use super::transactions_model::{
    FundTransaction, LedgerVersion, NewFundTransaction, TransactionPage, TransactionType,
};
use crate::errors::Result;

/// Trait defining the contract for ledger persistence.
///
/// Reads return transactions ordered by date; the calculator re-sorts anyway
/// and treats the result as an unordered snapshot.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    async fn create(&self, new_transaction: NewFundTransaction) -> Result<FundTransaction>;

    /// Inserts a batch atomically; either every row lands or none does.
    async fn create_many(
        &self,
        new_transactions: Vec<NewFundTransaction>,
    ) -> Result<Vec<FundTransaction>>;

    /// Deletes a transaction by its ID, returning the number of deleted records.
    async fn delete(&self, transaction_id: &str) -> Result<usize>;

    fn get_by_id(&self, transaction_id: &str) -> Result<FundTransaction>;

    /// Full ledger of a fund, optionally restricted to one transaction type.
    fn get_transactions(
        &self,
        fund_id: &str,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<FundTransaction>>;

    /// One page (1-based) of a fund's ledger, newest first.
    fn get_transactions_page(
        &self,
        fund_id: &str,
        transaction_type: Option<TransactionType>,
        page: i64,
        limit: i64,
    ) -> Result<TransactionPage>;

    fn ledger_version(&self, fund_id: &str) -> Result<LedgerVersion>;
}

/// Trait defining the contract for ledger service operations.
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Validates and stores transactions for an existing fund.
    async fn add_transactions(
        &self,
        fund_id: &str,
        new_transactions: Vec<NewFundTransaction>,
    ) -> Result<Vec<FundTransaction>>;

    async fn delete_transaction(&self, transaction_id: &str) -> Result<()>;

    fn get_transactions(
        &self,
        fund_id: &str,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<FundTransaction>>;

    fn get_transactions_page(
        &self,
        fund_id: &str,
        transaction_type: Option<TransactionType>,
        page: i64,
        limit: i64,
    ) -> Result<TransactionPage>;
}
