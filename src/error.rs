use thiserror::Error;

/// Malformed or out-of-catalog input. Never retried; the host screen should
/// fall back to a safe default round.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unknown emotion: {0}")]
    UnknownEmotion(String),
    #[error("unknown modality: {0}")]
    UnknownModality(String),
    #[error("invalid response time: {0}")]
    InvalidResponseTime(f64),
    #[error("invalid affect reading: {0}")]
    InvalidAffectReading(String),
    #[error("session report contains no rounds")]
    EmptySession,
    #[error("invalid session summary: {0}")]
    InvalidSummary(String),
    #[error("no unlocked emotions to select from")]
    NoCandidates,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid learner id: {0}")]
    InvalidLearnerId(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
