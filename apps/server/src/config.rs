use anyhow::Context;
use rust_decimal::Decimal;
use std::{net::SocketAddr, str::FromStr, time::Duration};

use fundmetrics_core::constants::DEFAULT_TARGET_TVPI;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// `None` turns terminal NAV synthesis off
    pub target_tvpi: Option<Decimal>,
    pub metrics_cache: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("FM_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid FM_LISTEN_ADDR")?;
        let db_path = env_or("FM_DB_PATH", "./db/app.db");
        let cors_allow = env_or("FM_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("FM_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .unwrap_or(30000);
        let target_tvpi = parse_target_tvpi(&env_or(
            "FM_TARGET_TVPI",
            &DEFAULT_TARGET_TVPI.to_string(),
        ))?;
        let metrics_cache = !matches!(
            env_or("FM_METRICS_CACHE", "true").to_ascii_lowercase().as_str(),
            "false" | "0" | "off" | "no"
        );

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            target_tvpi,
            metrics_cache,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_target_tvpi(raw: &str) -> anyhow::Result<Option<Decimal>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") || raw.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    let target = Decimal::from_str(raw)
        .with_context(|| format!("Invalid FM_TARGET_TVPI '{}'", raw))?;
    Ok(Some(target))
}
