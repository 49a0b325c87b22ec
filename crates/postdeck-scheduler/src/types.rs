use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Number of posts transitioned to published.
    pub published: usize,
    /// Ids of the transitioned posts, ascending.
    pub post_ids: Vec<i64>,
    /// The single instant written to every transitioned post.
    pub swept_at: DateTime<Utc>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.published == 0
    }

    /// Human-readable summary, e.g. `Published 3 posts`.
    pub fn message(&self) -> String {
        format!("Published {} posts", self.published)
    }
}
