use tracing::warn;

use crate::manager::fail_soft;
use crate::store::PostStore;
use crate::types::{ActivityItem, StateCounts};

/// Read-only summaries for the landing page. Both reads fail soft.
#[derive(Clone)]
pub struct Dashboard {
    store: PostStore,
}

impl Dashboard {
    pub fn new(store: PostStore) -> Self {
        Self { store }
    }

    pub fn counts(&self) -> StateCounts {
        self.store.count_by_state().unwrap_or_else(|e| {
            warn!(error = %e, "failed to count posts; reporting zeros");
            StateCounts::default()
        })
    }

    /// The `limit` most recently created posts, newest first.
    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityItem> {
        fail_soft("recent activity", self.store.recent_posts(limit))
            .iter()
            .map(ActivityItem::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityKind, NewPost};
    use chrono::Duration;
    use postdeck_core::time;

    #[test]
    fn recent_activity_is_newest_first_and_limited() {
        let store = PostStore::open_in_memory().unwrap();
        let cat = store.create_category("News").unwrap();
        let base = time::now();

        for i in 0..4 {
            let post = NewPost {
                content: format!("post {i}"),
                category_id: cat.id,
                scheduled_time: base - Duration::minutes(1),
            };
            store.create_post(&post, base + Duration::seconds(i)).unwrap();
        }
        store.publish_due(base + Duration::seconds(10)).unwrap();

        let dashboard = Dashboard::new(store);
        let items = dashboard.recent_activity(3);
        let contents: Vec<_> = items.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["post 3", "post 2", "post 1"]);
        assert!(items.iter().all(|i| i.kind == ActivityKind::Archived));
        assert_eq!(dashboard.counts(), StateCounts { scheduled: 0, archived: 4 });
    }
}
