use crate::{MentionReport, MentionResult, MessageBatch, MessageId};
use async_trait::async_trait;
use std::collections::HashSet;

/// Semantic closeness between two text spans, backed by a pretrained
/// language model.
///
/// Implementations must be fully provisioned before they are handed to the
/// detector; every method may fail with `MentionError::OracleUnavailable`.
#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    /// Symmetric, deterministic score in [0, 1] for words or phrases.
    async fn similarity(&self, a: &str, b: &str) -> MentionResult<f64>;

    /// Noun-headed chunks of `text`, in textual order.
    async fn noun_phrases(&self, text: &str) -> MentionResult<Vec<String>>;

    /// The model's stopword list.
    fn stop_words(&self) -> &HashSet<String>;

    fn backend_name(&self) -> &'static str;
}

/// Incremental message feed tracked by a high-water-mark cursor.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Messages strictly newer than `cursor`, or the available backlog when
    /// `cursor` is `None`.
    async fn fetch(&self, cursor: Option<MessageId>) -> MentionResult<MessageBatch>;
}

/// Consumer of detection results (email, webhooks).
#[async_trait]
pub trait MentionSink: Send + Sync {
    async fn send(&self, reports: &[MentionReport]) -> MentionResult<()>;
}
