use anyhow::{Context, Result};
use mention_engine::EngineConfig;
use similarity_client::OracleConfig;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub catalog_path: PathBuf,          // data/s&p-500.json
    pub poll_interval_seconds: u64,     // 60
    pub engine: EngineConfig,
    pub oracle: OracleConfig,
}

impl WatchConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            catalog_path: env::var("CATALOG_PATH")
                .unwrap_or_else(|_| "data/s&p-500.json".to_string())
                .into(),
            poll_interval_seconds: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("POLL_INTERVAL_SECS must be a whole number of seconds")?,
            engine: EngineConfig::from_env()?,
            oracle: OracleConfig::from_env(),
        };

        if config.poll_interval_seconds == 0 {
            anyhow::bail!("POLL_INTERVAL_SECS must be greater than zero");
        }

        Ok(config)
    }
}
