use chrono::{DateTime, Utc};
use postdeck_core::time::parse_timestamp;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{PostError, Result};

const MISSING_FIELDS: &str = "Missing required fields";
const INVALID_DATE: &str = "Invalid date format";
const NO_FIELDS: &str = "No fields to update";

/// A named grouping for posts. Created once, never renamed or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Where a post sits in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostState {
    /// Not yet due and not published.
    Scheduled,
    /// Scheduled time has passed; waiting for the next sweep.
    Due,
    /// `published_time` is set.
    Published,
}

impl std::fmt::Display for PostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PostState::Scheduled => "scheduled",
            PostState::Due => "due",
            PostState::Published => "published",
        };
        write!(f, "{s}")
    }
}

/// A persisted post.
///
/// `is_posted` is derived from `published_time` on every read and is never
/// stored; it is included when the post is serialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub category_id: i64,
    pub scheduled_time: DateTime<Utc>,
    pub published_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_posted(&self) -> bool {
        self.published_time.is_some()
    }

    pub fn state(&self, now: DateTime<Utc>) -> PostState {
        if self.is_posted() {
            PostState::Published
        } else if self.scheduled_time <= now {
            PostState::Due
        } else {
            PostState::Scheduled
        }
    }
}

impl Serialize for Post {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Post", 8)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("content", &self.content)?;
        s.serialize_field("category_id", &self.category_id)?;
        s.serialize_field("scheduled_time", &self.scheduled_time)?;
        s.serialize_field("published_time", &self.published_time)?;
        s.serialize_field("created_at", &self.created_at)?;
        s.serialize_field("updated_at", &self.updated_at)?;
        s.serialize_field("is_posted", &self.is_posted())?;
        s.end()
    }
}

/// Raw create request as received from a caller. Every field is optional so
/// that a missing one surfaces as a validation error rather than a decode
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
    pub content: Option<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<i64>,
    #[serde(alias = "scheduledTime")]
    pub scheduled_time: Option<String>,
}

impl PostDraft {
    pub fn new(content: &str, category_id: i64, scheduled_time: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            category_id: Some(category_id),
            scheduled_time: Some(scheduled_time.to_string()),
        }
    }

    /// Check required fields and parse the schedule.
    pub fn validate(self) -> Result<NewPost> {
        let content = self
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| PostError::validation(MISSING_FIELDS))?;
        let category_id = self
            .category_id
            .ok_or_else(|| PostError::validation(MISSING_FIELDS))?;
        let raw_time = self
            .scheduled_time
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| PostError::validation(MISSING_FIELDS))?;
        let scheduled_time =
            parse_timestamp(&raw_time).ok_or_else(|| PostError::validation(INVALID_DATE))?;

        Ok(NewPost {
            content,
            category_id,
            scheduled_time,
        })
    }
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub content: String,
    pub category_id: i64,
    pub scheduled_time: DateTime<Utc>,
}

/// Raw partial update. Absent fields are left untouched, never nulled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub content: Option<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<i64>,
    #[serde(alias = "scheduledTime")]
    pub scheduled_time: Option<String>,
    #[serde(alias = "isPosted")]
    pub is_posted: Option<bool>,
}

impl PostPatch {
    pub fn is_posted(flag: bool) -> Self {
        Self {
            is_posted: Some(flag),
            ..Self::default()
        }
    }

    /// Parse and check the fields that are present.
    ///
    /// An empty patch is rejected: a no-op update is a caller error.
    pub fn validate(self) -> Result<PostChanges> {
        if let Some(ref content) = self.content {
            if content.trim().is_empty() {
                return Err(PostError::validation("Post content cannot be empty"));
            }
        }
        let scheduled_time = match self.scheduled_time {
            Some(raw) => Some(parse_timestamp(&raw).ok_or_else(|| PostError::validation(INVALID_DATE))?),
            None => None,
        };
        let publish = self.is_posted.map(|posted| {
            if posted {
                PublishChange::Archive
            } else {
                PublishChange::Unarchive
            }
        });

        let changes = PostChanges {
            content: self.content,
            category_id: self.category_id,
            scheduled_time,
            publish,
        };
        if changes.is_empty() {
            return Err(PostError::validation(NO_FIELDS));
        }
        Ok(changes)
    }
}

/// Manual override of the published flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishChange {
    /// Set `published_time` to now unless it is already set.
    Archive,
    /// Clear `published_time`.
    Unarchive,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub content: Option<String>,
    pub category_id: Option<i64>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub publish: Option<PublishChange>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.category_id.is_none()
            && self.scheduled_time.is_none()
            && self.publish.is_none()
    }
}

/// Post totals split by published state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    /// Posts with no `published_time` (scheduled or due).
    pub scheduled: u64,
    /// Posts with a `published_time`.
    pub archived: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Scheduled,
    Archived,
}

/// One entry of the dashboard's recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: i64,
    pub kind: ActivityKind,
    pub content: String,
    /// Publish instant for archived posts, otherwise the scheduled instant.
    pub timestamp: DateTime<Utc>,
}

impl From<&Post> for ActivityItem {
    fn from(post: &Post) -> Self {
        let (kind, timestamp) = match post.published_time {
            Some(at) => (ActivityKind::Archived, at),
            None => (ActivityKind::Scheduled, post.scheduled_time),
        };
        Self {
            id: post.id,
            kind,
            content: post.content.clone(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn post(published: Option<DateTime<Utc>>, scheduled: DateTime<Utc>) -> Post {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Post {
            id: 7,
            content: "hello".into(),
            category_id: 1,
            scheduled_time: scheduled,
            published_time: published,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn state_follows_time_and_publish_flag() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(post(None, now + Duration::minutes(1)).state(now), PostState::Scheduled);
        assert_eq!(post(None, now).state(now), PostState::Due);
        assert_eq!(post(None, now - Duration::hours(1)).state(now), PostState::Due);
        // Published wins even if the schedule is still in the future.
        assert_eq!(
            post(Some(now), now + Duration::days(1)).state(now),
            PostState::Published
        );
    }

    #[test]
    fn serialised_post_carries_derived_flag() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(post(Some(now), now)).unwrap();
        assert_eq!(json["is_posted"], true);
        let json = serde_json::to_value(post(None, now)).unwrap();
        assert_eq!(json["is_posted"], false);
        assert!(json["published_time"].is_null());
    }

    #[test]
    fn draft_missing_field_is_validation_error() {
        let draft = PostDraft {
            content: Some("hi".into()),
            category_id: None,
            scheduled_time: Some("2026-01-01T00:00:00Z".into()),
        };
        match draft.validate() {
            Err(PostError::Validation(msg)) => assert_eq!(msg, MISSING_FIELDS),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(PostDraft::new("   ", 1, "2026-01-01").validate().is_err());
        assert!(PostDraft::new("hi", 1, "").validate().is_err());
    }

    #[test]
    fn draft_bad_date_is_validation_error() {
        match PostDraft::new("hi", 1, "next tuesday-ish").validate() {
            Err(PostError::Validation(msg)) => assert_eq!(msg, INVALID_DATE),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn draft_accepts_camel_case_keys() {
        let draft: PostDraft = serde_json::from_str(
            r#"{"content":"hi","categoryId":3,"scheduledTime":"2026-02-02T10:00:00Z"}"#,
        )
        .unwrap();
        let new = draft.validate().unwrap();
        assert_eq!(new.category_id, 3);
        assert_eq!(
            new.scheduled_time,
            Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn empty_patch_is_rejected() {
        match PostPatch::default().validate() {
            Err(PostError::Validation(msg)) => assert_eq!(msg, NO_FIELDS),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn patch_translates_is_posted() {
        let changes = PostPatch::is_posted(true).validate().unwrap();
        assert_eq!(changes.publish, Some(PublishChange::Archive));
        let changes = PostPatch::is_posted(false).validate().unwrap();
        assert_eq!(changes.publish, Some(PublishChange::Unarchive));
        assert!(changes.content.is_none());
    }

    #[test]
    fn patch_with_bad_date_is_rejected_even_with_other_fields() {
        let patch = PostPatch {
            content: Some("fine".into()),
            scheduled_time: Some("garbage".into()),
            ..PostPatch::default()
        };
        assert!(matches!(patch.validate(), Err(PostError::Validation(_))));
    }

    #[test]
    fn activity_item_uses_publish_time_when_archived() {
        let scheduled = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let published = scheduled + Duration::minutes(5);
        let item = ActivityItem::from(&post(Some(published), scheduled));
        assert_eq!(item.kind, ActivityKind::Archived);
        assert_eq!(item.timestamp, published);

        let item = ActivityItem::from(&post(None, scheduled));
        assert_eq!(item.kind, ActivityKind::Scheduled);
        assert_eq!(item.timestamp, scheduled);
    }
}
