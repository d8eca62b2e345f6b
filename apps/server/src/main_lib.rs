use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use fundmetrics_core::{
    funds::{FundService, FundServiceTrait},
    metrics::{MetricsConfig, MetricsService, MetricsServiceTrait},
    transactions::{TransactionService, TransactionServiceTrait},
};
use fundmetrics_storage_sqlite::{db, FundRepository, TransactionRepository};

pub struct AppState {
    pub fund_service: Arc<dyn FundServiceTrait>,
    pub transaction_service: Arc<dyn TransactionServiceTrait>,
    pub metrics_service: Arc<dyn MetricsServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // `init` also installs the `log` bridge, so core and storage records show up here
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let fund_repository = Arc::new(FundRepository::new(pool.clone(), writer.clone()));
    let transaction_repository = Arc::new(TransactionRepository::new(pool, writer));

    let metrics_config = MetricsConfig::default().with_target_tvpi(config.target_tvpi);
    metrics_config.validate()?;
    tracing::info!(
        "Metrics: target TVPI {}, cache {}",
        metrics_config
            .target_tvpi
            .map(|t| t.to_string())
            .unwrap_or_else(|| "disabled".to_string()),
        if config.metrics_cache { "on" } else { "off" }
    );

    let mut metrics_service = MetricsService::new(
        fund_repository.clone(),
        transaction_repository.clone(),
        metrics_config,
    );
    if config.metrics_cache {
        metrics_service = metrics_service.with_cache();
    }

    Ok(Arc::new(AppState {
        fund_service: Arc::new(FundService::new(fund_repository.clone())),
        transaction_service: Arc::new(TransactionService::new(
            transaction_repository,
            fund_repository,
        )),
        metrics_service: Arc::new(metrics_service),
    }))
}
