//! `postdeck-posts` — categories, posts and the post lifecycle, persisted in
//! SQLite.
//!
//! # Lifecycle
//!
//! | State       | Condition                                         |
//! |-------------|---------------------------------------------------|
//! | `Scheduled` | `published_time` is NULL, `scheduled_time` > now  |
//! | `Due`       | `published_time` is NULL, `scheduled_time` <= now |
//! | `Published` | `published_time` is set (shown as "archived")     |
//!
//! Posts move from `Due` to `Published` through the sweeper in
//! `postdeck-scheduler`, or manually through [`PostManager::update`] with
//! `is_posted`. Clearing `is_posted` returns a post to `Scheduled`/`Due`.

pub mod dashboard;
pub mod db;
pub mod error;
pub mod manager;
pub mod store;
pub mod types;

pub use dashboard::Dashboard;
pub use error::{PostError, Result};
pub use manager::PostManager;
pub use store::PostStore;
pub use types::{
    ActivityItem, ActivityKind, Category, NewPost, Post, PostChanges, PostDraft, PostPatch,
    PostState, PublishChange, StateCounts,
};
