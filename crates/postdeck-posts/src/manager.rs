use postdeck_core::time;
use tracing::{info, instrument, warn};

use crate::error::{PostError, Result};
use crate::store::PostStore;
use crate::types::{Category, Post, PostDraft, PostPatch};

/// Post lifecycle manager: validates caller input, then performs a single
/// storage round trip per operation.
///
/// Holds no copy of any record; every call reads or writes the store.
/// Listing operations fail soft: a storage error is logged and an empty list
/// returned, so a page showing several lists survives one failing.
#[derive(Clone)]
pub struct PostManager {
    store: PostStore,
}

impl PostManager {
    pub fn new(store: PostStore) -> Self {
        Self { store }
    }

    // --- categories --------------------------------------------------------

    /// Create a category. The name is trimmed and must not be empty.
    #[instrument(skip(self))]
    pub fn create_category(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PostError::Validation("Category name is required".into()));
        }
        let category = self.store.create_category(name).inspect_err(log_write_failure)?;
        info!(category_id = category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub fn list_categories(&self) -> Vec<Category> {
        fail_soft("categories", self.store.get_categories())
    }

    // --- posts -------------------------------------------------------------

    /// Validate and insert a new, unpublished post.
    #[instrument(skip(self, draft))]
    pub fn create(&self, draft: PostDraft) -> Result<Post> {
        let new = draft.validate()?;
        let post = self
            .store
            .create_post(&new, time::now())
            .inspect_err(log_write_failure)?;
        info!(
            post_id = post.id,
            category_id = post.category_id,
            scheduled_time = %post.scheduled_time,
            "post created"
        );
        Ok(post)
    }

    /// Apply only the fields present in `patch`.
    ///
    /// `is_posted: true` publishes the post now; `is_posted: false` clears
    /// `published_time`. Archiving a post that is already published is a
    /// no-op on `published_time`: the first publish instant (manual or from a
    /// sweep) is kept rather than re-stamped with now.
    #[instrument(skip(self, patch))]
    pub fn update(&self, id: i64, patch: PostPatch) -> Result<Post> {
        let changes = patch.validate()?;
        let post = self
            .store
            .update_post(id, &changes, time::now())
            .inspect_err(log_write_failure)?;
        info!(post_id = id, is_posted = post.is_posted(), "post updated");
        Ok(post)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_post(id).inspect_err(log_write_failure)?;
        info!(post_id = id, "post deleted");
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Post> {
        self.store.get_post(id)?.ok_or(PostError::NotFound { id })
    }

    pub fn list(&self) -> Vec<Post> {
        fail_soft("posts", self.store.get_posts())
    }

    pub fn list_by_category(&self, category_id: i64) -> Vec<Post> {
        fail_soft("posts by category", self.store.get_posts_by_category(category_id))
    }

    pub fn list_archived(&self) -> Vec<Post> {
        fail_soft("archived posts", self.store.get_archived_posts())
    }
}

fn log_write_failure(e: &PostError) {
    match e {
        PostError::Storage(inner) => warn!(error = %inner, "post store write failed"),
        other => warn!(code = other.code(), "post write rejected: {other}"),
    }
}

pub(crate) fn fail_soft<T>(what: &str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "failed to fetch {what}; returning empty list");
        Vec::new()
    })
}
