use mention_core::{
    MentionResult, MentionSink, MessageId, MessageSource, SimilarityOracle,
};
use mention_engine::{Catalog, MentionDetector};

/// Counters for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub messages: usize,
    pub reports: usize,
    pub mentions: usize,
}

/// Source -> detector -> sink, one message at a time.
///
/// The cursor only moves once a batch has been both scanned and delivered,
/// so a failed cycle is retried in full on the next tick.
pub struct Pipeline {
    detector: MentionDetector,
    catalog: Catalog,
    cursor: Option<MessageId>,
}

impl Pipeline {
    pub fn new(detector: MentionDetector, catalog: Catalog) -> Self {
        Self {
            detector,
            catalog,
            cursor: None,
        }
    }

    pub fn cursor(&self) -> Option<MessageId> {
        self.cursor
    }

    pub async fn run_cycle(
        &mut self,
        source: &dyn MessageSource,
        oracle: &dyn SimilarityOracle,
        sink: &dyn MentionSink,
    ) -> MentionResult<CycleSummary> {
        let batch = source.fetch(self.cursor).await?;
        let reports = self
            .detector
            .scan(&batch.messages, &self.catalog, oracle)
            .await?;

        if !reports.is_empty() {
            sink.send(&reports).await?;
        }

        self.cursor = batch.cursor.or(self.cursor);

        Ok(CycleSummary {
            messages: batch.messages.len(),
            reports: reports.len(),
            mentions: reports.iter().map(|r| r.result.len()).sum(),
        })
    }
}
