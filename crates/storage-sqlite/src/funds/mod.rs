//! SQLite storage implementation for funds.

mod model;
mod repository;

pub use model::{FundDB, NewFundDB};
pub use repository::FundRepository;
