use async_trait::async_trait;
use mention_core::{MentionError, MentionResult, SimilarityOracle};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "at", "be", "each", "is", "it", "nothing", "now", "of", "other",
    "really", "right", "seem", "the", "to", "up",
];

/// Deterministic in-memory oracle: 1.0 for identical strings, 0.0 otherwise,
/// unless a pair score is scripted.
pub struct ScriptedOracle {
    stop_words: HashSet<String>,
    chunks: Vec<String>,
    scores: HashMap<(String, String), f64>,
    unavailable: bool,
    similarity_calls: AtomicUsize,
    chunk_calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn exact() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            chunks: Vec::new(),
            scores: HashMap::new(),
            unavailable: false,
            similarity_calls: AtomicUsize::new(0),
            chunk_calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::exact()
        }
    }

    pub fn with_chunks(mut self, chunks: Vec<&str>) -> Self {
        self.chunks = chunks.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_score(mut self, a: &str, b: &str, score: f64) -> Self {
        self.scores.insert((a.to_string(), b.to_string()), score);
        self.scores.insert((b.to_string(), a.to_string()), score);
        self
    }

    pub fn similarity_calls(&self) -> usize {
        self.similarity_calls.load(Ordering::Relaxed)
    }

    pub fn chunk_calls(&self) -> usize {
        self.chunk_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SimilarityOracle for ScriptedOracle {
    async fn similarity(&self, a: &str, b: &str) -> MentionResult<f64> {
        if self.unavailable {
            return Err(MentionError::OracleUnavailable("scripted outage".into()));
        }
        self.similarity_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(score) = self.scores.get(&(a.to_string(), b.to_string())) {
            return Ok(*score);
        }
        Ok(if a == b { 1.0 } else { 0.0 })
    }

    async fn noun_phrases(&self, _text: &str) -> MentionResult<Vec<String>> {
        if self.unavailable {
            return Err(MentionError::OracleUnavailable("scripted outage".into()));
        }
        self.chunk_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.chunks.clone())
    }

    fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}
