use mention_core::MentionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type OracleResult<T> = Result<T, OracleError>;

impl From<OracleError> for MentionError {
    fn from(e: OracleError) -> Self {
        MentionError::OracleUnavailable(e.to_string())
    }
}
