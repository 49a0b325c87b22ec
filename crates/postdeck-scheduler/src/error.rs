use thiserror::Error;

/// Errors that can occur while sweeping due posts.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The post store rejected the sweep.
    #[error("Store error: {0}")]
    Store(#[from] postdeck_posts::PostError),

    /// The configured interval cannot drive a timer.
    #[error("Invalid sweep interval: {0}")]
    InvalidInterval(String),
}

pub type Result<T> = std::result::Result<T, SweepError>;
