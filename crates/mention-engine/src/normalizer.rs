//! Text normalisation: punctuation stripping, tokenisation, stopword removal
//! and noun-phrase extraction.

use mention_core::{MentionResult, NormalizedMessage, SimilarityOracle};
use std::collections::HashSet;

/// ASCII punctuation removed before tokenising. Hyphens are kept so that
/// names like "Coca-Cola" survive as one token.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,./:;<=>?@[\\]^_`{|}~";

pub fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(c)
}

/// Remove every punctuation character; nothing else changes, case included.
pub fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !is_punctuation(*c)).collect()
}

/// Whitespace tokens of already-stripped text.
pub fn split_tokens(stripped: &str) -> Vec<String> {
    stripped.split_whitespace().map(str::to_string).collect()
}

pub fn remove_stop_words(tokens: &[String], stop_words: &HashSet<String>) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !stop_words.contains(t.as_str()))
        .cloned()
        .collect()
}

/// Normalise one message.
///
/// Noun phrases come from the oracle's chunker run over the stripped text
/// (stopwords still present); single-word chunks are dropped because the
/// token passes already cover them.
pub async fn normalize(
    text: &str,
    oracle: &dyn SimilarityOracle,
) -> MentionResult<NormalizedMessage> {
    let stripped = strip_punctuation(text);
    let full_tokens = split_tokens(&stripped);
    let tokens = remove_stop_words(&full_tokens, oracle.stop_words());

    let noun_phrases = if full_tokens.len() < 2 {
        Vec::new()
    } else {
        oracle
            .noun_phrases(&stripped)
            .await?
            .into_iter()
            .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|p| p.split(' ').count() >= 2)
            .collect()
    };

    Ok(NormalizedMessage {
        raw_text: text.to_string(),
        tokens,
        full_tokens,
        noun_phrases,
    })
}
