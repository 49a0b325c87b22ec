use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostdeckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PostdeckError {
    /// Short error code string sent to clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            PostdeckError::Config(_) => "CONFIG_ERROR",
            PostdeckError::Database(_) => "DATABASE_ERROR",
            PostdeckError::Serialization(_) => "SERIALIZATION_ERROR",
            PostdeckError::Io(_) => "IO_ERROR",
            PostdeckError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, PostdeckError>;
