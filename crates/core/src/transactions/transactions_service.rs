use log::{debug, info};
use std::sync::Arc;

use super::transactions_model::{
    FundTransaction, NewFundTransaction, TransactionPage, TransactionType,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::funds::FundRepositoryTrait;

/// Upper bound on a single ledger page
const MAX_PAGE_LIMIT: i64 = 500;

/// Service for reading and appending to fund ledgers
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    fund_repository: Arc<dyn FundRepositoryTrait>,
}

impl TransactionService {
    pub fn new(
        repository: Arc<dyn TransactionRepositoryTrait>,
        fund_repository: Arc<dyn FundRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            fund_repository,
        }
    }

    fn ensure_fund_exists(&self, fund_id: &str) -> Result<()> {
        match self.fund_repository.get_by_id(fund_id) {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(Error::fund_not_found(fund_id)),
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn add_transactions(
        &self,
        fund_id: &str,
        new_transactions: Vec<NewFundTransaction>,
    ) -> Result<Vec<FundTransaction>> {
        self.ensure_fund_exists(fund_id)?;

        for tx in &new_transactions {
            if tx.fund_id != fund_id {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Transaction for fund '{}' submitted to fund '{}'",
                    tx.fund_id, fund_id
                ))));
            }
            tx.validate()?;
        }

        if new_transactions.is_empty() {
            debug!("No transactions to add for fund {}", fund_id);
            return Ok(Vec::new());
        }

        let count = new_transactions.len();
        let created = self.repository.create_many(new_transactions).await?;
        info!("Added {} transactions to fund {}", count, fund_id);
        Ok(created)
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<()> {
        let deleted = self.repository.delete(transaction_id).await?;
        if deleted == 0 {
            return Err(Error::transaction_not_found(transaction_id));
        }
        Ok(())
    }

    fn get_transactions(
        &self,
        fund_id: &str,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<FundTransaction>> {
        self.ensure_fund_exists(fund_id)?;
        self.repository.get_transactions(fund_id, transaction_type)
    }

    fn get_transactions_page(
        &self,
        fund_id: &str,
        transaction_type: Option<TransactionType>,
        page: i64,
        limit: i64,
    ) -> Result<TransactionPage> {
        self.ensure_fund_exists(fund_id)?;
        self.repository.get_transactions_page(
            fund_id,
            transaction_type,
            page.max(1),
            limit.clamp(1, MAX_PAGE_LIMIT),
        )
    }
}
