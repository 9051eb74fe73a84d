//! The comment service façade.
//!
//! Every external operation flows through here: validation, then
//! authorization, then the moderation state machine, then the store, and
//! finally reply-count maintenance.  Each call is a short-lived unit of
//! work holding the database handle only for its own duration.

use tokio::sync::Mutex;
use uuid::Uuid;

use colloquy_core::access::{self, Operation};
use colloquy_core::{moderation, validation};
use colloquy_core::{Authorship, Caller, Comment, CommentPayload, CommentStatus};
use colloquy_store::{Database, NewComment, StoreError};

use crate::counter;
use crate::error::ApiError;
use crate::tree::{self, CommentNode};

/// A comment creation request, with the audit fields already extracted
/// from the transport layer.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub payload: CommentPayload,
    pub ip_address: String,
    pub user_agent: String,
}

pub struct CommentService {
    db: Mutex<Database>,
}

impl CommentService {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Create a comment on a post, optionally as a reply.
    pub async fn create(&self, req: CreateComment, caller: &Caller) -> Result<Comment, ApiError> {
        validation::validate(&req.payload, caller)?;

        if !access::authorize(Operation::Create, caller, None) {
            return Err(ApiError::Forbidden("comment creation denied".to_string()));
        }

        let db = self.db.lock().await;

        if !db.post_exists(req.post_id)? {
            return Err(ApiError::NotFound("post not found".to_string()));
        }

        if let Some(parent_id) = req.parent_id {
            let parent = db.get_comment(parent_id).map_err(|e| match e {
                StoreError::NotFound => {
                    ApiError::NotFound("parent comment not found".to_string())
                }
                other => other.into(),
            })?;
            // A reply must stay on its parent's post.
            if parent.post_id != req.post_id {
                return Err(ApiError::NotFound("parent comment not found".to_string()));
            }
        }

        let authorship = Authorship::resolve(caller, &req.payload);
        let status = moderation::initial_status(&authorship);

        let comment = db.create_comment(NewComment {
            post_id: req.post_id,
            parent_id: req.parent_id,
            content: req.payload.content,
            authorship,
            status,
            ip_address: req.ip_address,
            user_agent: req.user_agent,
        })?;

        if comment.status == CommentStatus::Approved {
            if let Some(parent_id) = comment.parent_id {
                counter::recompute(&db, parent_id);
            }
        }

        tracing::info!(
            comment = %comment.id,
            post = %comment.post_id,
            status = %comment.status,
            "comment created"
        );

        Ok(comment)
    }

    /// Replace a comment's content.  Never touches status or the reply
    /// count.
    pub async fn edit(
        &self,
        id: Uuid,
        content: String,
        caller: &Caller,
    ) -> Result<Comment, ApiError> {
        let db = self.db.lock().await;
        let comment = db.get_comment(id)?;

        if !access::authorize(Operation::EditContent, caller, Some(&comment)) {
            return Err(ApiError::Forbidden("cannot edit this comment".to_string()));
        }

        validation::validate_content(&content)?;

        let updated = db.update_content(id, &content)?;
        tracing::info!(comment = %id, "comment edited");
        Ok(updated)
    }

    /// Change a comment's moderation status.  Admin-only.
    pub async fn moderate(
        &self,
        id: Uuid,
        new_status: CommentStatus,
        caller: &Caller,
    ) -> Result<Comment, ApiError> {
        let db = self.db.lock().await;
        let comment = db.get_comment(id)?;

        if !access::authorize(Operation::ChangeStatus, caller, Some(&comment)) {
            return Err(ApiError::Forbidden("moderation is admin-only".to_string()));
        }

        if !moderation::transition_allowed(comment.status, new_status) {
            return Err(ApiError::InvalidStatus(new_status.to_string()));
        }

        let updated = db.update_status(id, new_status)?;

        if let Some(parent_id) = updated.parent_id {
            if moderation::crosses_approved(comment.status, new_status) {
                counter::recompute(&db, parent_id);
            }
        }

        tracing::info!(
            comment = %id,
            from = %comment.status,
            to = %new_status,
            "comment moderated"
        );

        Ok(updated)
    }

    /// Delete a comment.  Admin-only; children are left in place with a
    /// dangling parent pointer and resurface as roots.
    pub async fn delete(&self, id: Uuid, caller: &Caller) -> Result<(), ApiError> {
        let db = self.db.lock().await;
        let comment = db.get_comment(id)?;

        if !access::authorize(Operation::Delete, caller, Some(&comment)) {
            return Err(ApiError::Forbidden("deletion is admin-only".to_string()));
        }

        db.delete_comment(id)?;

        if let Some(parent_id) = comment.parent_id {
            counter::recompute(&db, parent_id);
        }

        tracing::info!(comment = %id, "comment deleted");
        Ok(())
    }

    /// Fetch one comment, applying the same visibility filter as the
    /// list path: non-admins only ever see approved comments, and a
    /// hidden comment is indistinguishable from a missing one.
    pub async fn get(&self, id: Uuid, caller: &Caller) -> Result<Comment, ApiError> {
        let db = self.db.lock().await;
        let comment = db.get_comment(id)?;

        if !access::can_view(caller, &comment) {
            return Err(ApiError::NotFound("comment not found".to_string()));
        }

        Ok(comment)
    }

    /// Assemble the full thread for a post.
    ///
    /// Admins see every status and may narrow the listing with
    /// `status_filter`; everyone else always gets the approved-only
    /// view and the filter is ignored.
    pub async fn list_thread(
        &self,
        post_id: Uuid,
        caller: &Caller,
        status_filter: Option<CommentStatus>,
    ) -> Result<Vec<CommentNode>, ApiError> {
        let db = self.db.lock().await;

        let comments = if access::sees_all_statuses(caller) {
            match status_filter {
                Some(status) => db.get_comments_for_post_with_status(post_id, status)?,
                None => db.get_comments_for_post(post_id)?,
            }
        } else {
            db.get_comments_for_post_with_status(post_id, CommentStatus::Approved)?
        };

        Ok(tree::assemble(comments))
    }
}
