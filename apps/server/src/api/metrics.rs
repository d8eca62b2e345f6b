use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use fundmetrics_core::metrics::MetricKind;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{MetricsQuery, MetricsResponse},
};

#[utoipa::path(
    get,
    path = "/api/v1/funds/{id}/metrics",
    params(
        ("metric" = Option<String>, Query, description = "pic, dpi, irr, tvpi, rvpi or all"),
        ("asOf" = Option<String>, Query, description = "Valuation date, YYYY-MM-DD")
    ),
    responses((status = 200, description = "Metrics for the fund"), (status = 400, description = "Invalid input"), (status = 404, description = "Not found"))
)]
pub async fn get_metrics(
    Path(fund_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<Json<MetricsResponse>> {
    let which = match query.metric.as_deref() {
        Some(raw) if !raw.trim().is_empty() => MetricKind::from_str(raw)?,
        _ => MetricKind::All,
    };

    let response = match which {
        MetricKind::All => MetricsResponse::Breakdown(Box::new(
            state
                .metrics_service
                .get_fund_metrics(&fund_id, query.as_of)
                .await?,
        )),
        single => MetricsResponse::Metric(Box::new(
            state
                .metrics_service
                .get_fund_metric(&fund_id, single, query.as_of)
                .await?,
        )),
    };
    Ok(Json(response))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/funds/{id}/metrics", get(get_metrics))
}
