use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use fundmetrics_server::{api::app_router, build_state, config::Config};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

fn test_config(tmp: &TempDir, target_tvpi: Option<Decimal>) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        target_tvpi,
        metrics_cache: true,
    }
}

async fn build_test_router(target_tvpi: Option<Decimal>) -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = test_config(&tmp, target_tvpi);
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_fund(app: &Router, id: &str) {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/v1/funds",
        Some(json!({ "id": id, "name": "Harbor Growth Fund II", "vintageYear": 2019 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn one_year_ledger() -> Value {
    json!([
        { "transactionType": "CAPITAL_CALL", "amount": 100, "transactionDate": "2020-01-01" },
        { "transactionType": "DISTRIBUTION", "amount": 110, "transactionDate": "2021-01-01" }
    ])
}

#[tokio::test]
async fn healthz_works() {
    let (app, _tmp) = build_test_router(None).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn ledger_round_trip_produces_metrics() {
    let (app, _tmp) = build_test_router(None).await;
    create_fund(&app, "fund-a").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/funds/fund-a/transactions",
        Some(one_year_ledger()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.as_array().unwrap().len(), 2);

    let (status, dpi) = send(&app, Method::GET, "/api/v1/funds/fund-a/metrics?metric=dpi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dpi["metric"], "dpi");
    assert_eq!(dpi["value"], json!(1.1));

    let (status, all) = send(&app, Method::GET, "/api/v1/funds/fund-a/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["pic"], json!(100.0));
    assert_eq!(all["irrStatus"], "COMPUTED");
    let irr = all["irr"].as_f64().unwrap();
    assert!((9.9..=10.1).contains(&irr), "irr was {}", irr);

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/v1/funds/fund-a/transactions?transactionType=distribution&limit=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["transactionType"], "DISTRIBUTION");
}

#[tokio::test]
async fn fund_detail_embeds_breakdown_with_terminal_nav() {
    let (app, _tmp) = build_test_router(Some(Decimal::new(145, 2))).await;
    create_fund(&app, "fund-b").await;
    send(
        &app,
        Method::POST,
        "/api/v1/funds/fund-b/transactions",
        Some(json!([
            { "transactionType": "CAPITAL_CALL", "amount": 1000, "transactionDate": "2019-06-30" },
            { "transactionType": "DISTRIBUTION", "amount": 250, "transactionDate": "2022-06-30" }
        ])),
    )
    .await;

    let (status, detail) = send(&app, Method::GET, "/api/v1/funds/fund-b", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Harbor Growth Fund II");
    assert_eq!(detail["metrics"]["terminalNav"], json!(1200.0));
    assert_eq!(detail["metrics"]["tvpi"], json!(1.45));

    let (status, list) = send(&app, Method::GET, "/api/v1/funds", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["metrics"]["dpi"], json!(0.25));
}

#[tokio::test]
async fn fund_list_survives_a_ledger_the_calculator_rejects() {
    let (app, _tmp) = build_test_router(None).await;
    create_fund(&app, "fund-ok").await;
    create_fund(&app, "fund-huge").await;
    send(
        &app,
        Method::POST,
        "/api/v1/funds/fund-ok/transactions",
        Some(one_year_ledger()),
    )
    .await;
    // Each call fits a decimal; their sum does not
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/funds/fund-huge/transactions",
        Some(json!([
            { "transactionType": "CAPITAL_CALL", "amount": 5e28, "transactionDate": "2020-01-01" },
            { "transactionType": "CAPITAL_CALL", "amount": 5e28, "transactionDate": "2021-01-01" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = send(&app, Method::GET, "/api/v1/funds", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = list.as_array().unwrap();
    assert_eq!(items.len(), 2);
    let by_id = |id: &str| items.iter().find(|item| item["id"] == id).unwrap().clone();

    let healthy = by_id("fund-ok");
    assert_eq!(healthy["metrics"]["dpi"], json!(1.1));
    assert!(healthy.get("metricsError").is_none());

    let broken = by_id("fund-huge");
    assert!(broken["metrics"].is_null());
    assert!(broken["metricsError"].as_str().unwrap().contains("too large"));

    let (status, _) = send(&app, Method::GET, "/api/v1/funds/fund-huge/metrics", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn as_of_date_limits_the_snapshot() {
    let (app, _tmp) = build_test_router(None).await;
    create_fund(&app, "fund-c").await;
    send(
        &app,
        Method::POST,
        "/api/v1/funds/fund-c/transactions",
        Some(one_year_ledger()),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/funds/fund-c/metrics?asOf=2020-06-30",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["excludedAfterAsOf"], 1);
    assert_eq!(body["totalDistributions"], json!(0.0));
    assert!(body["irr"].is_null());
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let (app, _tmp) = build_test_router(None).await;
    create_fund(&app, "fund-d").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/funds/fund-d/metrics?metric=moic", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(&app, Method::GET, "/api/v1/funds/missing/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/funds/fund-d/transactions",
        Some(json!([
            { "transactionType": "CAPITAL_CALL", "amount": 100, "transactionDate": "2020-01-01" },
            { "transactionType": "DISTRIBUTION", "amount": -5, "transactionDate": "2020-02-01" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, page) = send(&app, Method::GET, "/api/v1/funds/fund-d/transactions", None).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn deleting_a_fund_removes_it() {
    let (app, _tmp) = build_test_router(None).await;
    create_fund(&app, "fund-e").await;
    send(
        &app,
        Method::POST,
        "/api/v1/funds/fund-e/transactions",
        Some(one_year_ledger()),
    )
    .await;
    send(&app, Method::GET, "/api/v1/funds/fund-e/metrics", None).await;

    let (status, _) = send(&app, Method::DELETE, "/api/v1/funds/fund-e", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/v1/funds/fund-e/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, "/api/v1/funds/fund-e", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
