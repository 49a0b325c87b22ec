use chrono::{DateTime, Utc};
use postdeck_core::time;
use postdeck_posts::{Post, PostStore};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::types::SweepReport;

/// On-demand due-post sweep. Stateless apart from the store handle, so it is
/// cheap to clone into HTTP handlers and the background engine alike.
#[derive(Clone)]
pub struct Sweeper {
    store: PostStore,
}

impl Sweeper {
    pub fn new(store: PostStore) -> Self {
        Self { store }
    }

    /// Sweep at the current instant.
    pub fn sweep(&self) -> Result<SweepReport> {
        self.sweep_at(time::now())
    }

    /// Publish every post due at `now`, all stamped with `now`.
    #[instrument(level = "debug", skip(self))]
    pub fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let post_ids = self.store.publish_due(now)?;
        if post_ids.is_empty() {
            debug!("sweep found no due posts");
        } else {
            info!(count = post_ids.len(), ?post_ids, swept_at = %now, "published due posts");
        }
        Ok(SweepReport {
            published: post_ids.len(),
            post_ids,
            swept_at: now,
        })
    }

    /// Posts a sweep at `now` would publish, without publishing them.
    pub fn preview(&self, now: DateTime<Utc>) -> Result<Vec<Post>> {
        Ok(self.store.get_due_posts(now)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use postdeck_posts::NewPost;

    fn seeded(offsets_minutes: &[i64]) -> (Sweeper, PostStore, DateTime<Utc>) {
        let store = PostStore::open_in_memory().expect("open memory db");
        let cat = store.create_category("News").unwrap();
        let now = time::now();
        for (i, offset) in offsets_minutes.iter().enumerate() {
            let post = NewPost {
                content: format!("post {i}"),
                category_id: cat.id,
                scheduled_time: now + Duration::minutes(*offset),
            };
            store.create_post(&post, now).unwrap();
        }
        (Sweeper::new(store.clone()), store, now)
    }

    #[test]
    fn second_sweep_publishes_nothing() {
        let (sweeper, _, now) = seeded(&[-60, -5, 30]);
        let first = sweeper.sweep_at(now).unwrap();
        assert_eq!(first.published, 2);
        assert_eq!(first.message(), "Published 2 posts");

        let second = sweeper.sweep_at(now).unwrap();
        assert!(second.is_empty());
        assert!(second.post_ids.is_empty());
    }

    #[test]
    fn batch_shares_one_publish_instant() {
        let (sweeper, store, now) = seeded(&[-90, -60, -1, 0]);
        let report = sweeper.sweep_at(now).unwrap();
        assert_eq!(report.published, 4);

        for id in report.post_ids {
            let post = store.get_post(id).unwrap().unwrap();
            assert_eq!(post.published_time, Some(report.swept_at));
            assert_eq!(post.updated_at, report.swept_at);
        }
    }

    #[test]
    fn preview_does_not_mutate() {
        let (sweeper, store, now) = seeded(&[-10, 10]);
        let due = sweeper.preview(now).unwrap();
        assert_eq!(due.len(), 1);
        assert!(store.get_archived_posts().unwrap().is_empty());
    }

    #[test]
    fn future_posts_become_due_later() {
        let (sweeper, _, now) = seeded(&[15]);
        assert!(sweeper.sweep_at(now).unwrap().is_empty());
        let later = sweeper.sweep_at(now + Duration::minutes(15)).unwrap();
        assert_eq!(later.published, 1);
    }
}
