use rusqlite::Connection;

/// Initialise the categories and posts tables.
///
/// Safe to call on every startup: uses `IF NOT EXISTS` throughout. Foreign
/// key enforcement is per-connection in SQLite, so callers must also run
/// `PRAGMA foreign_keys=ON` (done by [`crate::PostStore::new`]).
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS categories (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT    NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS posts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            content         TEXT    NOT NULL,
            category_id     INTEGER NOT NULL REFERENCES categories(id),
            scheduled_time  TEXT    NOT NULL,   -- fixed-width RFC 3339 UTC
            published_time  TEXT,               -- NULL until published
            created_at      TEXT    NOT NULL,
            updated_at      TEXT    NOT NULL
        );

        -- Sweep query: WHERE published_time IS NULL AND scheduled_time <= ?
        CREATE INDEX IF NOT EXISTS idx_posts_unpublished
            ON posts (scheduled_time) WHERE published_time IS NULL;
        CREATE INDEX IF NOT EXISTS idx_posts_category
            ON posts (category_id);
        ",
    )
}
