//! The post-existence boundary.
//!
//! Posts live in the publishing pipeline, not here.  This engine only
//! needs to know whether a post id is real before attaching comments to
//! it, so the store keeps a minimal registry table that the pipeline
//! (and tests) seed via [`Database::register_post`].

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Record that a post exists.  Idempotent.
    pub fn register_post(&self, id: Uuid) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO posts (id, registered_at) VALUES (?1, ?2)",
            params![id.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Whether a post id is known to the registry.
    pub fn post_exists(&self, id: Uuid) -> Result<bool> {
        let count: u32 = self.conn().query_row(
            "SELECT COUNT(*) FROM posts WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
