use async_trait::async_trait;
use dashmap::DashMap;
use mention_core::{MentionResult, SimilarityOracle};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::client::SimilarityClient;
use crate::error::{OracleError, OracleResult};
use crate::OracleConfig;

/// Memo of pair scores. The oracle is symmetric, so `(a, b)` and `(b, a)`
/// share one entry. Stops admitting entries once `capacity` is reached.
struct PairCache {
    entries: DashMap<(String, String), f64>,
    capacity: usize,
    hits: AtomicU64,
}

impl PairCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            hits: AtomicU64::new(0),
        }
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    fn get(&self, a: &str, b: &str) -> Option<f64> {
        let hit = self.entries.get(&Self::key(a, b)).map(|v| *v);
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    fn insert(&self, a: &str, b: &str, score: f64) {
        if self.entries.len() < self.capacity {
            self.entries.insert(Self::key(a, b), score);
        }
    }
}

/// Usage counters reported on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OracleStats {
    pub model_calls: u64,
    pub cache_hits: u64,
    pub cached_pairs: usize,
}

/// Similarity oracle backed by the HTTP language-model service.
///
/// Construct with [`HttpSimilarityOracle::open`] once per process and release
/// with [`HttpSimilarityOracle::close`].
pub struct HttpSimilarityOracle {
    client: SimilarityClient,
    stop_words: HashSet<String>,
    cache: Option<PairCache>,
    model_calls: AtomicU64,
}

impl HttpSimilarityOracle {
    /// Connect, verify the model is loaded and fetch its stopword list.
    pub async fn open(config: &OracleConfig) -> OracleResult<Self> {
        let client = SimilarityClient::new(config.base_url.clone(), config.timeout)?;

        if !client.health().await? {
            return Err(OracleError::ServiceUnavailable(format!(
                "health check failed at {}",
                client.base_url()
            )));
        }

        let stop_words: HashSet<String> = client.stop_words().await?.into_iter().collect();
        if stop_words.is_empty() {
            return Err(OracleError::InvalidResponse(
                "model reported no stop words".to_string(),
            ));
        }

        tracing::info!(
            "Initialized similarity oracle at {} ({} stop words, cache capacity {})",
            client.base_url(),
            stop_words.len(),
            config.cache_capacity
        );

        Ok(Self::from_parts(client, stop_words, config.cache_capacity))
    }

    fn from_parts(client: SimilarityClient, stop_words: HashSet<String>, cache_capacity: usize) -> Self {
        Self {
            client,
            stop_words,
            cache: (cache_capacity > 0).then(|| PairCache::new(cache_capacity)),
            model_calls: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> OracleStats {
        OracleStats {
            model_calls: self.model_calls.load(Ordering::Relaxed),
            cache_hits: self
                .cache
                .as_ref()
                .map(|c| c.hits.load(Ordering::Relaxed))
                .unwrap_or(0),
            cached_pairs: self.cache.as_ref().map(|c| c.entries.len()).unwrap_or(0),
        }
    }

    pub fn close(self) -> OracleStats {
        let stats = self.stats();
        tracing::info!(
            "Closed similarity oracle ({} model calls, {} cache hits)",
            stats.model_calls,
            stats.cache_hits
        );
        stats
    }

    async fn score(&self, a: &str, b: &str) -> OracleResult<f64> {
        if let Some(score) = self.cache.as_ref().and_then(|c| c.get(a, b)) {
            return Ok(score);
        }

        self.model_calls.fetch_add(1, Ordering::Relaxed);
        let scores = self.client.similarity_batch(&[(a, b)]).await?;
        let score = scores
            .first()
            .copied()
            .ok_or_else(|| OracleError::InvalidResponse("empty score list".to_string()))?;

        if let Some(cache) = &self.cache {
            cache.insert(a, b, score);
        }
        Ok(score)
    }
}

#[async_trait]
impl SimilarityOracle for HttpSimilarityOracle {
    async fn similarity(&self, a: &str, b: &str) -> MentionResult<f64> {
        Ok(self.score(a, b).await?)
    }

    async fn noun_phrases(&self, text: &str) -> MentionResult<Vec<String>> {
        Ok(self.client.noun_chunks(text).await?)
    }

    fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
