use mention_core::{MentionError, MentionResult};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.80;

/// Detector settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum oracle score for a comparison to become a mention
    pub similarity_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl EngineConfig {
    pub fn new(similarity_threshold: f64) -> MentionResult<Self> {
        let config = Self {
            similarity_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads `SIMILARITY_THRESHOLD`, falling back to 0.80 when unset.
    pub fn from_env() -> MentionResult<Self> {
        match env::var("SIMILARITY_THRESHOLD") {
            Ok(raw) => {
                let threshold: f64 = raw.trim().parse().map_err(|_| {
                    MentionError::InvalidConfig(format!("SIMILARITY_THRESHOLD={} is not a number", raw))
                })?;
                Self::new(threshold)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> MentionResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(MentionError::InvalidConfig(format!(
                "similarity threshold {} outside [0, 1]",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}
