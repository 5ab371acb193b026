use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TallyError>;
