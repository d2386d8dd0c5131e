use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown sound id {0}")]
    UnknownSound(u32),

    #[error("audio output failed: {0}")]
    Audio(String),

    #[error("browser DOM unavailable: {0}")]
    Dom(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
