//! v001 -- Initial schema creation.
//!
//! Creates the two core tables: `posts` (the publishing pipeline's
//! registry, read-only for this engine) and `comments`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Posts (registry maintained by the publishing pipeline)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS posts (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    registered_at TEXT NOT NULL               -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Comments
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comments (
    id             TEXT PRIMARY KEY NOT NULL, -- UUID v4
    post_id        TEXT NOT NULL,             -- FK -> posts(id)
    parent_id      TEXT,                      -- self-reference; no FK: left
                                              -- dangling when the parent is
                                              -- deleted
    content        TEXT NOT NULL,
    author_user_id TEXT,                      -- set for identified authors
    author_name    TEXT,                      -- set for anonymous authors
    author_email   TEXT,
    author_website TEXT,
    status         TEXT NOT NULL,             -- pending|approved|rejected|spam
    reply_count    INTEGER NOT NULL DEFAULT 0,
    like_count     INTEGER NOT NULL DEFAULT 0,
    ip_address     TEXT NOT NULL,
    user_agent     TEXT NOT NULL,
    created_at     TEXT NOT NULL,             -- ISO-8601
    updated_at     TEXT NOT NULL,

    FOREIGN KEY (post_id) REFERENCES posts(id)
);

CREATE INDEX IF NOT EXISTS idx_comments_post_created
    ON comments(post_id, created_at ASC);

CREATE INDEX IF NOT EXISTS idx_comments_parent ON comments(parent_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
