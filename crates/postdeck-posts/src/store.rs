use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use postdeck_core::time;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, instrument};

use crate::db::init_db;
use crate::error::{PostError, Result};
use crate::types::{Category, NewPost, Post, PostChanges, PublishChange, StateCounts};

const POST_COLUMNS: &str =
    "id, content, category_id, scheduled_time, published_time, created_at, updated_at";

/// How long a file-backed handle waits on another connection's write lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const DUPLICATE_CATEGORY: &str = "A category with this name already exists";
const DUPLICATE_POST: &str = "A similar post already exists";

/// Storage boundary for categories and posts.
///
/// An explicitly constructed handle around one SQLite connection. Cloning is
/// cheap and shares the connection, so the gateway and the sweeper can run
/// against the same database (required for in-memory databases) or each open
/// their own file handle.
#[derive(Clone)]
pub struct PostStore {
    conn: Arc<Mutex<Connection>>,
}

impl PostStore {
    /// Wrap an open connection: enables foreign keys and creates the schema.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open (or create) a database file in WAL mode.
    ///
    /// Several handles may share one file (the gateway and the sweep engine
    /// each open their own); a writer waits up to [`BUSY_TIMEOUT`] for
    /// another's lock instead of failing with `SQLITE_BUSY`.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::new(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // a panicking holder cannot leave the connection mid-statement
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- categories --------------------------------------------------------

    #[instrument(level = "debug", skip(self))]
    pub fn create_category(&self, name: &str) -> Result<Category> {
        self.conn()
            .query_row(
                "INSERT INTO categories (name) VALUES (?1) RETURNING id, name",
                [name],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .map_err(|e| PostError::from_write(e, DUPLICATE_CATEGORY))
    }

    pub fn get_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // --- posts: writes -----------------------------------------------------

    /// Insert a post with `published_time = NULL`.
    #[instrument(level = "debug", skip(self, post), fields(category_id = post.category_id))]
    pub fn create_post(&self, post: &NewPost, now: DateTime<Utc>) -> Result<Post> {
        let now_str = time::encode(&now);
        self.conn()
            .query_row(
                &format!(
                    "INSERT INTO posts
                     (content, category_id, scheduled_time, published_time, created_at, updated_at)
                     VALUES (?1, ?2, ?3, NULL, ?4, ?4)
                     RETURNING {POST_COLUMNS}"
                ),
                params![
                    post.content,
                    post.category_id,
                    time::encode(&post.scheduled_time),
                    now_str
                ],
                row_to_post,
            )
            .map_err(|e| PostError::from_write(e, DUPLICATE_POST))
    }

    /// Apply a partial update as one `UPDATE … RETURNING` statement.
    ///
    /// Archiving only fills `published_time` when it is still NULL, so a post
    /// published by a concurrent sweep keeps that sweep's timestamp.
    #[instrument(level = "debug", skip(self, changes))]
    pub fn update_post(&self, id: i64, changes: &PostChanges, now: DateTime<Utc>) -> Result<Post> {
        if changes.is_empty() {
            return Err(PostError::validation("No fields to update"));
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(ref content) = changes.content {
            sets.push("content = ?");
            values.push(Value::Text(content.clone()));
        }
        if let Some(category_id) = changes.category_id {
            sets.push("category_id = ?");
            values.push(Value::Integer(category_id));
        }
        if let Some(ref scheduled) = changes.scheduled_time {
            sets.push("scheduled_time = ?");
            values.push(Value::Text(time::encode(scheduled)));
        }
        match changes.publish {
            Some(PublishChange::Archive) => {
                sets.push("published_time = COALESCE(published_time, ?)");
                values.push(Value::Text(time::encode(&now)));
            }
            Some(PublishChange::Unarchive) => sets.push("published_time = NULL"),
            None => {}
        }
        sets.push("updated_at = ?");
        values.push(Value::Text(time::encode(&now)));
        values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE posts SET {} WHERE id = ? RETURNING {POST_COLUMNS}",
            sets.join(", ")
        );
        debug!(%sql, "updating post");

        self.conn()
            .query_row(&sql, params_from_iter(values.iter()), row_to_post)
            .optional()
            .map_err(|e| PostError::from_write(e, DUPLICATE_POST))?
            .ok_or(PostError::NotFound { id })
    }

    /// Remove a post. Returns `NotFound` if no row is deleted.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_post(&self, id: i64) -> Result<()> {
        let n = self.conn().execute("DELETE FROM posts WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(PostError::NotFound { id });
        }
        Ok(())
    }

    /// Publish every due post in one conditional statement.
    ///
    /// All rows share the single `now` instant. A row already published by a
    /// concurrent writer no longer matches `published_time IS NULL`, so it
    /// cannot be published twice. Returns the ids of the rows transitioned,
    /// ascending.
    #[instrument(level = "debug", skip(self))]
    pub fn publish_due(&self, now: DateTime<Utc>) -> Result<Vec<i64>> {
        let now_str = time::encode(&now);
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(
            "UPDATE posts SET published_time = ?1, updated_at = ?1
             WHERE published_time IS NULL AND scheduled_time <= ?1
             RETURNING id",
        )?;
        let mut ids = stmt
            .query_map([&now_str], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        ids.sort_unstable();
        Ok(ids)
    }

    // --- posts: reads ------------------------------------------------------

    pub fn get_post(&self, id: i64) -> Result<Option<Post>> {
        Ok(self
            .conn()
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                [id],
                row_to_post,
            )
            .optional()?)
    }

    pub fn get_posts(&self) -> Result<Vec<Post>> {
        self.query_posts(
            &format!("SELECT {POST_COLUMNS} FROM posts ORDER BY scheduled_time, id"),
            [],
        )
    }

    pub fn get_posts_by_category(&self, category_id: i64) -> Result<Vec<Post>> {
        self.query_posts(
            &format!(
                "SELECT {POST_COLUMNS} FROM posts
                 WHERE category_id = ?1 ORDER BY scheduled_time, id"
            ),
            [category_id],
        )
    }

    /// Posts with a non-null `published_time`, most recently published first.
    pub fn get_archived_posts(&self) -> Result<Vec<Post>> {
        self.query_posts(
            &format!(
                "SELECT {POST_COLUMNS} FROM posts
                 WHERE published_time IS NOT NULL
                 ORDER BY published_time DESC, id"
            ),
            [],
        )
    }

    /// Posts with `scheduled_time <= now` and no `published_time`.
    pub fn get_due_posts(&self, now: DateTime<Utc>) -> Result<Vec<Post>> {
        self.query_posts(
            &format!(
                "SELECT {POST_COLUMNS} FROM posts
                 WHERE published_time IS NULL AND scheduled_time <= ?1
                 ORDER BY scheduled_time, id"
            ),
            [time::encode(&now)],
        )
    }

    /// Newest-created posts first.
    pub fn recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        self.query_posts(
            &format!(
                "SELECT {POST_COLUMNS} FROM posts
                 ORDER BY created_at DESC, id DESC LIMIT ?1"
            ),
            [i64::try_from(limit).unwrap_or(i64::MAX)],
        )
    }

    pub fn count_by_state(&self) -> Result<StateCounts> {
        let (scheduled, archived) = self.conn().query_row(
            "SELECT COALESCE(SUM(published_time IS NULL), 0),
                    COALESCE(SUM(published_time IS NOT NULL), 0)
             FROM posts",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok(StateCounts {
            scheduled: scheduled as u64,
            archived: archived as u64,
        })
    }

    fn query_posts<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Post>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_post)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Map a row selected with `POST_COLUMNS` to a `Post`.
fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        content: row.get(1)?,
        category_id: row.get(2)?,
        scheduled_time: timestamp(row, 3)?,
        published_time: match row.get::<_, Option<String>>(4)? {
            Some(raw) => Some(decode_at(4, &raw)?),
            None => None,
        },
        created_at: timestamp(row, 5)?,
        updated_at: timestamp(row, 6)?,
    })
}

fn timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    decode_at(idx, &raw)
}

fn decode_at(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    time::decode(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
