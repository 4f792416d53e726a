use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable instrument from the reference catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name")]
    pub name: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Which granularity of text produced a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStrategy {
    /// Single token compared against a ticker symbol
    TokenVsSymbol,
    /// Single token compared against a company name
    TokenVsName,
    /// Multi-word noun phrase compared against a company name
    PhraseVsName,
}

impl MatchStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStrategy::TokenVsSymbol => "token vs symbol",
            MatchStrategy::TokenVsName => "token vs name",
            MatchStrategy::PhraseVsName => "phrase vs name",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A detected reference to an instrument inside a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub symbol: Option<String>,
    pub proper_name: Option<String>,
    /// The token or phrase that triggered the match
    pub matched_text: String,
    /// Similarity in [0, 1], never below the detector's threshold
    pub score: f64,
    pub strategy: MatchStrategy,
}

/// Canonical form of one input message, derived once per detection call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub raw_text: String,
    /// Punctuation-stripped, stopword-filtered tokens
    pub tokens: Vec<String>,
    /// Punctuation-stripped tokens with stopwords retained
    pub full_tokens: Vec<String>,
    /// Noun phrases of two or more words
    pub noun_phrases: Vec<String>,
}

impl NormalizedMessage {
    pub fn is_empty(&self) -> bool {
        self.full_tokens.is_empty() && self.noun_phrases.is_empty()
    }
}

/// Ordered mentions for one input message.
///
/// Pass order is preserved: token-vs-symbol mentions come first, then
/// token-vs-name, then phrase-vs-name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub text: String,
    pub mentions: Vec<Mention>,
}

impl DetectionResult {
    pub fn new(text: impl Into<String>, mentions: Vec<Mention>) -> Self {
        Self {
            text: text.into(),
            mentions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// Distinct symbols mentioned, in first-seen order.
    pub fn symbols(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for symbol in self.mentions.iter().filter_map(|m| m.symbol.as_deref()) {
            if !seen.contains(&symbol) {
                seen.push(symbol);
            }
        }
        seen
    }

    pub fn by_strategy(&self, strategy: MatchStrategy) -> impl Iterator<Item = &Mention> {
        self.mentions.iter().filter(move |m| m.strategy == strategy)
    }

    /// Highest-scoring mention; the earliest one wins ties.
    pub fn strongest(&self) -> Option<&Mention> {
        self.mentions.iter().fold(None, |best: Option<&Mention>, m| match best {
            Some(b) if b.score >= m.score => Some(b),
            _ => Some(m),
        })
    }
}

/// Feed-assigned message identifier. Larger ids are newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short message pulled from the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One incremental page from a message source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageBatch {
    /// Oldest first
    pub messages: Vec<Message>,
    /// High-water mark after this fetch
    pub cursor: Option<MessageId>,
}

/// A detection result together with the message it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionReport {
    pub message_id: MessageId,
    pub author: String,
    pub result: DetectionResult,
}

impl MentionReport {
    pub fn new(message: &Message, result: DetectionResult) -> Self {
        Self {
            message_id: message.id,
            author: message.author.clone(),
            result,
        }
    }
}
