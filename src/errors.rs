use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Contract violation: {0}")]
    Contract(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type WardenResult<T> = Result<T, WardenError>;
