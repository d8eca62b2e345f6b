use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::dsl::{count_star, max};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use fundmetrics_core::transactions::{
    FundTransaction, LedgerVersion, NewFundTransaction, TransactionPage,
    TransactionRepositoryTrait, TransactionType,
};
use fundmetrics_core::Result;

use super::model::{decode_rows, FundTransactionDB, NewFundTransactionDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::fund_transactions;

/// Repository for a fund's ledger of calls, distributions and adjustments
pub struct TransactionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn to_row(new_transaction: NewFundTransaction, now: NaiveDateTime) -> NewFundTransactionDB {
        let id = new_transaction
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        NewFundTransactionDB::from_domain(new_transaction, id, now)
    }

    fn filtered(
        fund_id: &str,
        transaction_type: Option<TransactionType>,
    ) -> fund_transactions::BoxedQuery<'static, diesel::sqlite::Sqlite> {
        let mut query = fund_transactions::table
            .filter(fund_transactions::fund_id.eq(fund_id.to_string()))
            .into_boxed();
        if let Some(transaction_type) = transaction_type {
            query = query.filter(fund_transactions::transaction_type.eq(transaction_type.as_str()));
        }
        query
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    async fn create(&self, new_transaction: NewFundTransaction) -> Result<FundTransaction> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FundTransaction> {
                let row = Self::to_row(new_transaction, Utc::now().naive_utc());
                let created = diesel::insert_into(fund_transactions::table)
                    .values(&row)
                    .returning(FundTransactionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(FundTransaction::try_from(created)?)
            })
            .await
    }

    async fn create_many(
        &self,
        new_transactions: Vec<NewFundTransaction>,
    ) -> Result<Vec<FundTransaction>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<FundTransaction>> {
                let now = Utc::now().naive_utc();
                let rows: Vec<NewFundTransactionDB> = new_transactions
                    .into_iter()
                    .map(|tx| Self::to_row(tx, now))
                    .collect();

                // One statement per row; the writer's transaction makes the batch atomic.
                let mut created = Vec::with_capacity(rows.len());
                for row in &rows {
                    let inserted = diesel::insert_into(fund_transactions::table)
                        .values(row)
                        .returning(FundTransactionDB::as_returning())
                        .get_result(conn)
                        .map_err(StorageError::from)?;
                    created.push(inserted);
                }
                debug!("Inserted {} ledger rows", created.len());
                Ok(decode_rows(created)?)
            })
            .await
    }

    async fn delete(&self, transaction_id: &str) -> Result<usize> {
        let transaction_id = transaction_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(
                    diesel::delete(fund_transactions::table.find(transaction_id))
                        .execute(conn)
                        .map_err(StorageError::from)?,
                )
            })
            .await
    }

    fn get_by_id(&self, transaction_id: &str) -> Result<FundTransaction> {
        let mut conn = get_connection(&self.pool)?;
        let row = fund_transactions::table
            .find(transaction_id)
            .select(FundTransactionDB::as_select())
            .first::<FundTransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(FundTransaction::try_from(row)?)
    }

    fn get_transactions(
        &self,
        fund_id: &str,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<FundTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = Self::filtered(fund_id, transaction_type)
            .select(FundTransactionDB::as_select())
            .order((
                fund_transactions::transaction_date.asc(),
                fund_transactions::id.asc(),
            ))
            .load::<FundTransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(decode_rows(rows)?)
    }

    fn get_transactions_page(
        &self,
        fund_id: &str,
        transaction_type: Option<TransactionType>,
        page: i64,
        limit: i64,
    ) -> Result<TransactionPage> {
        let mut conn = get_connection(&self.pool)?;

        let total: i64 = Self::filtered(fund_id, transaction_type)
            .select(count_star())
            .first(&mut conn)
            .map_err(StorageError::from)?;

        let rows = Self::filtered(fund_id, transaction_type)
            .select(FundTransactionDB::as_select())
            .order((
                fund_transactions::transaction_date.desc(),
                fund_transactions::id.asc(),
            ))
            .offset((page - 1).max(0) * limit)
            .limit(limit)
            .load::<FundTransactionDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(TransactionPage::new(decode_rows(rows)?, total, page, limit))
    }

    fn ledger_version(&self, fund_id: &str) -> Result<LedgerVersion> {
        let mut conn = get_connection(&self.pool)?;
        let (transaction_count, last_modified): (i64, Option<NaiveDateTime>) =
            fund_transactions::table
                .filter(fund_transactions::fund_id.eq(fund_id))
                .select((count_star(), max(fund_transactions::updated_at)))
                .first(&mut conn)
                .map_err(StorageError::from)?;
        Ok(LedgerVersion {
            transaction_count,
            last_modified,
        })
    }
}
