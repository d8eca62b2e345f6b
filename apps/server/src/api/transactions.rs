use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use fundmetrics_core::transactions::{FundTransaction, TransactionPage, TransactionType};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{NewTransactionBody, TransactionListQuery, DEFAULT_PAGE_LIMIT},
};

#[utoipa::path(
    get,
    path = "/api/v1/funds/{id}/transactions",
    responses(
        (status = 200, description = "One page of the fund ledger"),
        (status = 404, description = "Not found")
    )
)]
pub async fn list_transactions(
    Path(fund_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionListQuery>,
) -> ApiResult<Json<TransactionPage>> {
    let transaction_type = query
        .transaction_type
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(TransactionType::from_str)
        .transpose()?;

    let page = state.transaction_service.get_transactions_page(
        &fund_id,
        transaction_type,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    )?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/funds/{id}/transactions",
    responses(
        (status = 201, description = "Stored transactions"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Not found")
    )
)]
pub async fn add_transactions(
    Path(fund_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Vec<NewTransactionBody>>,
) -> ApiResult<(StatusCode, Json<Vec<FundTransaction>>)> {
    let new_transactions = payload
        .into_iter()
        .map(|body| body.into_domain(&fund_id))
        .collect();
    let created = state
        .transaction_service
        .add_transactions(&fund_id, new_transactions)
        .await?;
    state.metrics_service.invalidate(&fund_id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.transaction_service.delete_transaction(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/funds/{id}/transactions",
            get(list_transactions).post(add_transactions),
        )
        .route("/transactions/{id}", delete(delete_transaction))
}
