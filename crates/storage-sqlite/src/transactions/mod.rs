//! SQLite storage implementation for fund ledgers.

mod model;
mod repository;

pub use model::{FundTransactionDB, NewFundTransactionDB};
pub use repository::TransactionRepository;
