//! Transactions module - the per-fund ledger of capital calls, distributions
//! and adjustments.
//!
//! The ledger is owned by the storage layer; the metrics calculator only ever
//! reads a snapshot of it.

mod transactions_model;
mod transactions_service;
mod transactions_traits;

#[cfg(test)]
mod transactions_model_tests;


pub use transactions_model::{
    FundTransaction, LedgerVersion, NewFundTransaction, TransactionPage, TransactionType,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
