use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::normalizer::normalize;
use mention_core::{
    DetectionResult, MatchStrategy, Mention, MentionReport, MentionResult, Message,
    NormalizedMessage, SimilarityOracle,
};
use std::collections::BTreeSet;

/// One matching pass: every probe from the message against every catalog
/// target, keeping pairs at or above the threshold.
struct MatchPass<'a> {
    strategy: MatchStrategy,
    probes: &'a [String],
    targets: &'a BTreeSet<String>,
}

impl MatchPass<'_> {
    fn comparisons(&self) -> usize {
        self.probes.len() * self.targets.len()
    }

    fn mention(&self, probe: &str, target: &str, score: f64, catalog: &Catalog) -> Mention {
        let (symbol, proper_name) = match self.strategy {
            MatchStrategy::TokenVsSymbol => (
                Some(target.to_string()),
                catalog.name_for(target).map(str::to_string),
            ),
            MatchStrategy::TokenVsName | MatchStrategy::PhraseVsName => (
                catalog.symbol_for(target).map(str::to_string),
                Some(target.to_string()),
            ),
        };

        Mention {
            symbol,
            proper_name,
            matched_text: probe.to_string(),
            score,
            strategy: self.strategy,
        }
    }
}

/// Finds instrument mentions in short messages via semantic similarity.
///
/// Three independent passes run in order and their results are concatenated
/// without cross-pass deduplication:
/// 1. filtered tokens vs ticker symbols
/// 2. all tokens (stopwords kept) vs company names
/// 3. multi-word noun phrases vs company names
#[derive(Debug, Clone, Default)]
pub struct MentionDetector {
    config: EngineConfig,
}

impl MentionDetector {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn threshold(&self) -> f64 {
        self.config.similarity_threshold
    }

    pub async fn detect(
        &self,
        message: &str,
        catalog: &Catalog,
        oracle: &dyn SimilarityOracle,
    ) -> MentionResult<DetectionResult> {
        let normalized = normalize(message, oracle).await?;
        self.detect_normalized(&normalized, catalog, oracle).await
    }

    pub async fn detect_normalized(
        &self,
        message: &NormalizedMessage,
        catalog: &Catalog,
        oracle: &dyn SimilarityOracle,
    ) -> MentionResult<DetectionResult> {
        let passes = [
            MatchPass {
                strategy: MatchStrategy::TokenVsSymbol,
                probes: &message.tokens,
                targets: catalog.symbols(),
            },
            MatchPass {
                strategy: MatchStrategy::TokenVsName,
                probes: &message.full_tokens,
                targets: catalog.proper_names(),
            },
            MatchPass {
                strategy: MatchStrategy::PhraseVsName,
                probes: &message.noun_phrases,
                targets: catalog.proper_names(),
            },
        ];

        let mut mentions = Vec::new();
        for pass in &passes {
            let found = self.run_pass(pass, catalog, oracle).await?;
            tracing::debug!(
                "{}: {} comparisons, {} mentions",
                pass.strategy,
                pass.comparisons(),
                found.len()
            );
            mentions.extend(found);
        }

        Ok(DetectionResult::new(message.raw_text.clone(), mentions))
    }

    async fn run_pass(
        &self,
        pass: &MatchPass<'_>,
        catalog: &Catalog,
        oracle: &dyn SimilarityOracle,
    ) -> MentionResult<Vec<Mention>> {
        let threshold = self.threshold();
        let mut found = Vec::new();

        for probe in pass.probes {
            for target in pass.targets {
                let score = clamp_score(oracle.similarity(target, probe).await?);
                if score >= threshold {
                    found.push(pass.mention(probe, target, score, catalog));
                }
            }
        }

        Ok(found)
    }

    /// Run detection over a batch of messages in order, keeping only the
    /// messages that produced at least one mention.
    ///
    /// Fails on the first oracle error; no reports are returned in that case.
    pub async fn scan(
        &self,
        messages: &[Message],
        catalog: &Catalog,
        oracle: &dyn SimilarityOracle,
    ) -> MentionResult<Vec<MentionReport>> {
        let mut reports = Vec::new();
        for message in messages {
            let result = self.detect(&message.text, catalog, oracle).await?;
            if result.is_empty() {
                continue;
            }
            if let Some(best) = result.strongest() {
                tracing::info!(
                    "Message {} from @{}: {} mentions ({}), strongest {:?} at {:.2}",
                    message.id,
                    message.author,
                    result.len(),
                    result.symbols().join(", "),
                    best.matched_text,
                    best.score
                );
            }
            reports.push(MentionReport::new(message, result));
        }
        Ok(reports)
    }
}

fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedOracle;
    use mention_core::{MentionError, MessageId};
    use proptest::prelude::*;

    fn apple_only() -> Catalog {
        Catalog::from_json(r#"[{"Symbol":"AAPL","Name":"Apple Inc"}]"#).unwrap()
    }

    fn apple_and_google() -> Catalog {
        Catalog::from_json(
            r#"[{"Symbol":"AAPL","Name":"Apple Inc"},{"Symbol":"GOOG","Name":"Google LLC"}]"#,
        )
        .unwrap()
    }

    fn message(id: u64, text: &str) -> Message {
        Message {
            id: MessageId(id),
            author: "trader".to_string(),
            text: text.to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_symbol_token_yields_single_mention() {
        let detector = MentionDetector::default();
        let oracle = ScriptedOracle::exact();

        let result = detector
            .detect("AAPL is up today", &apple_only(), &oracle)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        let m = &result.mentions[0];
        assert_eq!(m.strategy, MatchStrategy::TokenVsSymbol);
        assert_eq!(m.matched_text, "AAPL");
        assert_eq!(m.symbol.as_deref(), Some("AAPL"));
        assert_eq!(m.proper_name.as_deref(), Some("Apple Inc"));
        assert_eq!(m.score, 1.0);
    }

    #[tokio::test]
    async fn test_unrelated_message_yields_nothing() {
        let detector = MentionDetector::default();
        let oracle = ScriptedOracle::exact();
        let result = detector
            .detect("nothing relevant", &apple_only(), &oracle)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_empty_message_is_not_an_error() {
        let detector = MentionDetector::default();
        let oracle = ScriptedOracle::exact();
        let result = detector.detect("", &apple_only(), &oracle).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(oracle.similarity_calls(), 0);
    }

    #[tokio::test]
    async fn test_passes_are_ordered_and_not_deduplicated() {
        let detector = MentionDetector::default();
        let oracle = ScriptedOracle::exact()
            .with_chunks(vec!["Apple Inc shares"])
            .with_score("Apple", "Apple Inc", 0.91)
            .with_score("Apple Inc shares", "Apple Inc", 0.88);

        let result = detector
            .detect("AAPL: Apple Inc shares, Apple!", &apple_and_google(), &oracle)
            .await
            .unwrap();

        let strategies: Vec<MatchStrategy> = result.mentions.iter().map(|m| m.strategy).collect();
        assert_eq!(
            strategies,
            vec![
                MatchStrategy::TokenVsSymbol,
                MatchStrategy::TokenVsName,
                MatchStrategy::TokenVsName,
                MatchStrategy::PhraseVsName,
            ]
        );
        // Both "Apple" tokens hit the same name; neither is collapsed
        assert_eq!(result.mentions[1].matched_text, "Apple");
        assert_eq!(result.mentions[2].matched_text, "Apple");
        assert_eq!(result.mentions[3].matched_text, "Apple Inc shares");
        assert!(result.mentions.iter().all(|m| m.symbol.as_deref() == Some("AAPL")));
        assert_eq!(result.symbols(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn test_name_pass_keeps_stop_words() {
        // "The" only matches when the unfiltered token list is used
        let catalog = Catalog::from_json(r#"[{"Symbol":"THE","Name":"the"}]"#).unwrap();
        let detector = MentionDetector::default();
        let oracle = ScriptedOracle::exact();

        let result = detector
            .detect("the market", &catalog, &oracle)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.mentions[0].strategy, MatchStrategy::TokenVsName);
        assert_eq!(result.mentions[0].symbol.as_deref(), Some("THE"));
    }

    #[tokio::test]
    async fn test_threshold_is_configurable() {
        let oracle = ScriptedOracle::exact().with_score("Apple", "Apple Inc", 0.7);
        let strict = MentionDetector::default();
        let loose = MentionDetector::new(EngineConfig::new(0.65).unwrap());

        let strict_result = strict.detect("Apple", &apple_only(), &oracle).await.unwrap();
        let loose_result = loose.detect("Apple", &apple_only(), &oracle).await.unwrap();

        assert!(strict_result.is_empty());
        assert_eq!(loose_result.len(), 1);
        assert_eq!(loose_result.mentions[0].score, 0.7);
    }

    #[tokio::test]
    async fn test_scores_are_clamped() {
        let oracle = ScriptedOracle::exact()
            .with_score("Apple", "Apple Inc", 1.02)
            .with_score("Apple", "AAPL", f64::NAN);
        let result = MentionDetector::default()
            .detect("Apple", &apple_only(), &oracle)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.mentions[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_oracle_outage_fails_without_partial_results() {
        let oracle = ScriptedOracle::unavailable();
        let err = MentionDetector::default()
            .detect("AAPL is up today", &apple_only(), &oracle)
            .await
            .unwrap_err();
        assert!(matches!(err, MentionError::OracleUnavailable(_)));
    }

    #[tokio::test]
    async fn test_detect_is_idempotent() {
        let detector = MentionDetector::default();
        let catalog = apple_and_google();
        let oracle = ScriptedOracle::exact()
            .with_chunks(vec!["Google LLC stock"])
            .with_score("Google LLC stock", "Google LLC", 0.83);
        let text = "GOOG and AAPL, Google LLC stock";

        let first = detector.detect(text, &catalog, &oracle).await.unwrap();
        let second = detector.detect(text, &catalog, &oracle).await.unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn test_scan_keeps_only_messages_with_mentions() {
        let detector = MentionDetector::default();
        let oracle = ScriptedOracle::exact();
        let messages = vec![
            message(1, "nothing relevant"),
            message(2, "AAPL is up today"),
            message(3, "GOOG too"),
        ];

        let reports = detector
            .scan(&messages, &apple_and_google(), &oracle)
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].message_id, MessageId(2));
        assert_eq!(reports[1].result.symbols(), vec!["GOOG"]);
        assert_eq!(reports[1].author, "trader");
    }

    proptest! {
        #[test]
        fn every_mention_clears_the_threshold(
            text in "[A-Za-z ]{0,40}",
            threshold in 0.0f64..=1.0,
            score in 0.0f64..=1.0,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let catalog = apple_and_google();
            let oracle = ScriptedOracle::exact()
                .with_score("Apple", "Apple Inc", score)
                .with_score("Google", "GOOG", score);
            let detector = MentionDetector::new(EngineConfig::new(threshold).unwrap());
            let input = format!("{} Apple Google", text);

            let result = rt.block_on(detector.detect(&input, &catalog, &oracle)).unwrap();
            for m in &result.mentions {
                prop_assert!(m.score >= threshold);
                prop_assert!(m.score <= 1.0);
            }
        }
    }
}
