//! Mention detection: reference catalog, text normalisation and the
//! three-pass similarity matcher.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod normalizer;

#[cfg(test)]
mod test_support;

pub use catalog::Catalog;
pub use config::{EngineConfig, DEFAULT_SIMILARITY_THRESHOLD};
pub use engine::MentionDetector;
pub use normalizer::{normalize, strip_punctuation, PUNCTUATION};
