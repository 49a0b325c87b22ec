use rusqlite::ffi;
use thiserror::Error;

/// Errors surfaced by post and category operations.
///
/// Kept separate from `PostdeckError` so the gateway can map each variant to
/// its own HTTP status without string inspection.
#[derive(Debug, Error)]
pub enum PostError {
    /// Missing or malformed input, rejected before any storage call.
    #[error("{0}")]
    Validation(String),

    /// The referenced category does not exist.
    #[error("Invalid category selected")]
    Referential,

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Duplicate(String),

    #[error("Post not found: {id}")]
    NotFound { id: i64 },

    /// Any other SQLite failure.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl PostError {
    /// Short error code string sent to clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            PostError::Validation(_) => "VALIDATION_ERROR",
            PostError::Referential => "REFERENTIAL_ERROR",
            PostError::Duplicate(_) => "DUPLICATE_ERROR",
            PostError::NotFound { .. } => "NOT_FOUND",
            PostError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        PostError::Validation(msg.into())
    }

    /// Classify a failed write by SQLite's extended result code.
    ///
    /// `duplicate` is the caller-facing message for a uniqueness violation,
    /// which differs between categories and posts.
    pub(crate) fn from_write(err: rusqlite::Error, duplicate: &str) -> Self {
        let extended = match &err {
            rusqlite::Error::SqliteFailure(e, _) => Some(e.extended_code),
            _ => None,
        };
        match extended {
            Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => PostError::Referential,
            Some(ffi::SQLITE_CONSTRAINT_UNIQUE) | Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
                PostError::Duplicate(duplicate.to_string())
            }
            _ => PostError::Storage(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, PostError>;
