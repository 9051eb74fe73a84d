//! CRUD operations for [`Comment`] records.
//!
//! Updates are field-level on purpose: content-only and status-only,
//! never both in one call.  The cached reply count has its own setter so
//! the recompute path never touches anything else.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use colloquy_core::{Authorship, Comment, CommentStatus};

use crate::database::Database;
use crate::error::{Result, StoreError};

/// Column list shared by every comment SELECT, in `row_to_comment` order.
const COMMENT_COLUMNS: &str = "id, post_id, parent_id, content, author_user_id, author_name, \
     author_email, author_website, status, reply_count, like_count, \
     ip_address, user_agent, created_at, updated_at";

/// The caller-supplied part of a new comment.  The store assigns the id
/// and both timestamps.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub authorship: Authorship,
    pub status: CommentStatus,
    pub ip_address: String,
    pub user_agent: String,
}

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new comment, assigning its id and timestamps.
    pub fn create_comment(&self, new: NewComment) -> Result<Comment> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let (author_user_id, author_name, author_email, author_website) = match &new.authorship {
            Authorship::Identified { user_id } => (Some(user_id.to_string()), None, None, None),
            Authorship::Anonymous {
                name,
                email,
                website,
            } => (
                None,
                Some(name.clone()),
                Some(email.clone()),
                website.clone(),
            ),
        };

        self.conn().execute(
            "INSERT INTO comments (id, post_id, parent_id, content, author_user_id,
                 author_name, author_email, author_website, status, reply_count,
                 like_count, ip_address, user_agent, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, 0, ?10, ?11, ?12, ?12)",
            params![
                id.to_string(),
                new.post_id.to_string(),
                new.parent_id.map(|p| p.to_string()),
                new.content,
                author_user_id,
                author_name,
                author_email,
                author_website,
                new.status.as_str(),
                new.ip_address,
                new.user_agent,
                now.to_rfc3339(),
            ],
        )?;

        Ok(Comment {
            id,
            post_id: new.post_id,
            parent_id: new.parent_id,
            content: new.content,
            authorship: new.authorship,
            status: new.status,
            reply_count: 0,
            like_count: 0,
            ip_address: new.ip_address,
            user_agent: new.user_agent,
            created_at: now,
            updated_at: now,
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single comment by UUID.
    pub fn get_comment(&self, id: Uuid) -> Result<Comment> {
        self.conn()
            .query_row(
                &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
                params![id.to_string()],
                row_to_comment,
            )
            .map_err(not_found)
    }

    /// All comments for a post, every status, oldest first.
    pub fn get_comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE post_id = ?1
             ORDER BY created_at ASC, id ASC"
        ))?;

        let rows = stmt.query_map(params![post_id.to_string()], row_to_comment)?;
        collect(rows)
    }

    /// All comments for a post with the given status, oldest first.
    pub fn get_comments_for_post_with_status(
        &self,
        post_id: Uuid,
        status: CommentStatus,
    ) -> Result<Vec<Comment>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE post_id = ?1 AND status = ?2
             ORDER BY created_at ASC, id ASC"
        ))?;

        let rows = stmt.query_map(params![post_id.to_string(), status.as_str()], row_to_comment)?;
        collect(rows)
    }

    /// Direct children of a comment, every status, oldest first.
    pub fn get_children(&self, parent_id: Uuid) -> Result<Vec<Comment>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE parent_id = ?1
             ORDER BY created_at ASC, id ASC"
        ))?;

        let rows = stmt.query_map(params![parent_id.to_string()], row_to_comment)?;
        collect(rows)
    }

    /// Count a comment's approved direct children.
    pub fn count_approved_children(&self, parent_id: Uuid) -> Result<u32> {
        let count: u32 = self.conn().query_row(
            "SELECT COUNT(*) FROM comments WHERE parent_id = ?1 AND status = ?2",
            params![parent_id.to_string(), CommentStatus::Approved.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace a comment's content, refreshing `updated_at`.
    pub fn update_content(&self, id: Uuid, content: &str) -> Result<Comment> {
        let affected = self.conn().execute(
            "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3",
            params![content, Utc::now().to_rfc3339(), id.to_string()],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_comment(id)
    }

    /// Replace a comment's moderation status, refreshing `updated_at`.
    pub fn update_status(&self, id: Uuid, status: CommentStatus) -> Result<Comment> {
        let affected = self.conn().execute(
            "UPDATE comments SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), id.to_string()],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_comment(id)
    }

    /// Overwrite the cached reply count.  A cache write, so `updated_at`
    /// is left alone.
    pub fn set_reply_count(&self, id: Uuid, count: u32) -> Result<()> {
        self.conn().execute(
            "UPDATE comments SET reply_count = ?1 WHERE id = ?2",
            params![count, id.to_string()],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a single comment.  Children keep their `parent_id` and
    /// become root-less nodes of the same post; there is no cascade.
    pub fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM comments WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

fn not_found(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Sqlite(other),
    }
}

fn collect(rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<Comment>>) -> Result<Vec<Comment>> {
    let mut comments = Vec::new();
    for row in rows {
        comments.push(row?);
    }
    Ok(comments)
}

fn row_to_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    let id_str: String = row.get(0)?;
    let post_id_str: String = row.get(1)?;
    let parent_id_str: Option<String> = row.get(2)?;
    let content: String = row.get(3)?;
    let author_user_id: Option<String> = row.get(4)?;
    let author_name: Option<String> = row.get(5)?;
    let author_email: Option<String> = row.get(6)?;
    let author_website: Option<String> = row.get(7)?;
    let status_str: String = row.get(8)?;
    let reply_count: u32 = row.get(9)?;
    let like_count: u32 = row.get(10)?;
    let ip_address: String = row.get(11)?;
    let user_agent: String = row.get(12)?;
    let created_str: String = row.get(13)?;
    let updated_str: String = row.get(14)?;

    let id = parse_uuid(&id_str, 0)?;
    let post_id = parse_uuid(&post_id_str, 1)?;
    let parent_id = match parent_id_str {
        Some(s) => Some(parse_uuid(&s, 2)?),
        None => None,
    };

    let authorship = match author_user_id {
        Some(user_id_str) => Authorship::Identified {
            user_id: parse_uuid(&user_id_str, 4)?,
        },
        None => {
            let (Some(name), Some(email)) = (author_name, author_email) else {
                return Err(rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    "anonymous comment is missing author name or email".into(),
                ));
            };
            Authorship::Anonymous {
                name,
                email,
                website: author_website,
            }
        }
    };

    let status = CommentStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            8,
            rusqlite::types::Type::Text,
            format!("unknown comment status {status_str:?}").into(),
        )
    })?;

    let created_at = parse_timestamp(&created_str, 13)?;
    let updated_at = parse_timestamp(&updated_str, 14)?;

    Ok(Comment {
        id,
        post_id,
        parent_id,
        content,
        authorship,
        status,
        reply_count,
        like_count,
        ip_address,
        user_agent,
        created_at,
        updated_at,
    })
}

fn parse_uuid(s: &str, col: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(s: &str, col: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
        })
}
