use crate::error::{OracleError, OracleResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
struct SimilarityRequest<'a> {
    pairs: Vec<[&'a str; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
struct SimilarityResponse {
    scores: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct NounChunkRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct NounChunkResponse {
    chunks: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StopWordsResponse {
    stop_words: Vec<String>,
}

/// Thin HTTP client for the language-model service.
#[derive(Clone)]
pub struct SimilarityClient {
    client: reqwest::Client,
    base_url: String,
}

impl SimilarityClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> OracleResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Score several pairs in one request. Scores come back in pair order.
    pub async fn similarity_batch(&self, pairs: &[(&str, &str)]) -> OracleResult<Vec<f64>> {
        let request = SimilarityRequest {
            pairs: pairs.iter().map(|(a, b)| [*a, *b]).collect(),
        };

        let response = self
            .client
            .post(format!("{}/similarity", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let result = response.json::<SimilarityResponse>().await?;
        if result.scores.len() != pairs.len() {
            return Err(OracleError::InvalidResponse(format!(
                "expected {} scores, got {}",
                pairs.len(),
                result.scores.len()
            )));
        }
        Ok(result.scores)
    }

    pub async fn noun_chunks(&self, text: &str) -> OracleResult<Vec<String>> {
        let response = self
            .client
            .post(format!("{}/noun-chunks", self.base_url))
            .json(&NounChunkRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        Ok(response.json::<NounChunkResponse>().await?.chunks)
    }

    pub async fn stop_words(&self) -> OracleResult<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/stop-words", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        Ok(response.json::<StopWordsResponse>().await?.stop_words)
    }

    /// Check service health
    pub async fn health(&self) -> OracleResult<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
