//! Role-conditional response projection.
//!
//! Audit fields (`ip_address`, `user_agent`), anonymous author emails,
//! and the raw status of non-approved comments are admin-only.  The
//! stripping happens here, in one place, before any response body is
//! built -- never by relying on a read permission check elsewhere.

use serde::Serialize;
use uuid::Uuid;

use chrono::{DateTime, Utc};
use colloquy_core::{Authorship, Caller, Comment, CommentStatus};

use crate::tree::CommentNode;

/// The author of a comment as exposed on the wire.
#[derive(Debug, Serialize)]
pub struct AuthorView {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Anonymous author email; admin responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// A comment as exposed on the wire.
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author: AuthorView,
    /// Present for admins, and for everyone when the comment is approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CommentStatus>,
    pub reply_count: u32,
    pub like_count: u32,
    /// Admin responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Admin responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment with its nested replies, projected for one caller.
#[derive(Debug, Serialize)]
pub struct ThreadNodeView {
    #[serde(flatten)]
    pub comment: CommentView,
    pub children: Vec<ThreadNodeView>,
}

/// Project a single comment for the given caller.
pub fn comment_view(comment: &Comment, caller: &Caller) -> CommentView {
    let admin = caller.is_admin();

    let author = match &comment.authorship {
        Authorship::Identified { user_id } => AuthorView {
            kind: "identified",
            user_id: Some(*user_id),
            name: None,
            email: None,
            website: None,
        },
        Authorship::Anonymous {
            name,
            email,
            website,
        } => AuthorView {
            kind: "anonymous",
            user_id: None,
            name: Some(name.clone()),
            email: admin.then(|| email.clone()),
            website: website.clone(),
        },
    };

    let status = if admin || comment.status == CommentStatus::Approved {
        Some(comment.status)
    } else {
        None
    };

    CommentView {
        id: comment.id,
        post_id: comment.post_id,
        parent_id: comment.parent_id,
        content: comment.content.clone(),
        author,
        status,
        reply_count: comment.reply_count,
        like_count: comment.like_count,
        ip_address: admin.then(|| comment.ip_address.clone()),
        user_agent: admin.then(|| comment.user_agent.clone()),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

/// Project an assembled forest for the given caller.
pub fn thread_view(nodes: &[CommentNode], caller: &Caller) -> Vec<ThreadNodeView> {
    nodes
        .iter()
        .map(|node| ThreadNodeView {
            comment: comment_view(&node.comment, caller),
            children: thread_view(&node.children, caller),
        })
        .collect()
}
