use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use fundmetrics_core::funds::{Fund, FundRepositoryTrait, FundUpdate, NewFund};
use fundmetrics_core::{Error, Result};

use super::model::{FundDB, NewFundDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::funds;

/// Repository for managing fund records in the database
pub struct FundRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl FundRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl FundRepositoryTrait for FundRepository {
    async fn create(&self, new_fund: NewFund) -> Result<Fund> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Fund> {
                let id = new_fund
                    .id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let row = NewFundDB::from_domain(new_fund, id, Utc::now().naive_utc());

                let created = diesel::insert_into(funds::table)
                    .values(&row)
                    .returning(FundDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Fund::from(created))
            })
            .await
    }

    async fn update(&self, fund_update: FundUpdate) -> Result<Fund> {
        let fund_id = fund_update.id.clone().ok_or_else(|| {
            Error::Unexpected("Fund update reached storage without an id".to_string())
        })?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Fund> {
                let existing = funds::table
                    .find(&fund_id)
                    .select(FundDB::as_select())
                    .first::<FundDB>(conn)
                    .map_err(StorageError::from)?;

                let mut updated = fund_update.apply_to(Fund::from(existing));
                updated.updated_at = Utc::now().naive_utc();
                let row = FundDB::from(updated);

                diesel::update(funds::table.find(&fund_id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Fund::from(row))
            })
            .await
    }

    async fn delete(&self, fund_id: &str) -> Result<usize> {
        let fund_id = fund_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(funds::table.find(fund_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_by_id(&self, fund_id: &str) -> Result<Fund> {
        let mut conn = get_connection(&self.pool)?;
        let fund = funds::table
            .find(fund_id)
            .select(FundDB::as_select())
            .first::<FundDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Fund::from(fund))
    }

    fn list(&self, skip: i64, limit: i64) -> Result<Vec<Fund>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = funds::table
            .select(FundDB::as_select())
            .order((funds::name.asc(), funds::id.asc()))
            .offset(skip.max(0))
            .limit(limit)
            .load::<FundDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Fund::from).collect())
    }
}
