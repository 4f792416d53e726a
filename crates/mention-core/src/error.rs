use thiserror::Error;

#[derive(Error, Debug)]
pub enum MentionError {
    /// Catalog source missing or malformed. Fatal at startup.
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// The similarity model could not be reached or initialised.
    #[error("Similarity oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Message source error: {0}")]
    Source(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type MentionResult<T> = Result<T, MentionError>;
