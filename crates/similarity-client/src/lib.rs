pub mod client;
pub mod error;
pub mod oracle;

pub use client::SimilarityClient;
pub use error::{OracleError, OracleResult};
pub use oracle::{HttpSimilarityOracle, OracleStats};

use std::time::Duration;

/// Configuration for the similarity service
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Maximum memoised pairs; 0 disables the cache
    pub cache_capacity: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("SIMILARITY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8005".to_string()),
            timeout: Duration::from_secs(
                std::env::var("SIMILARITY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            cache_capacity: std::env::var("SIMILARITY_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50_000),
        }
    }
}

impl OracleConfig {
    pub fn from_env() -> Self {
        Self::default()
    }
}
