//! The comment domain model.
//!
//! Comments are stored as flat records with a `parent_id` pointer; the
//! nested view is only built at read time by the server's tree assembler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Caller;
use crate::validation::CommentPayload;

/// Moderation status of a comment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Spam,
}

impl CommentStatus {
    /// The canonical lowercase name, as stored in the database and used
    /// on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
            CommentStatus::Spam => "spam",
        }
    }

    /// Parse a status name.  Returns `None` for anything outside the four
    /// legal values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CommentStatus::Pending),
            "approved" => Some(CommentStatus::Approved),
            "rejected" => Some(CommentStatus::Rejected),
            "spam" => Some(CommentStatus::Spam),
            _ => None,
        }
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who wrote a comment.  Set once at creation and never changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Authorship {
    /// A registered user, referenced by id.
    Identified { user_id: Uuid },
    /// A visitor's self-supplied identity.  `email` is never shown
    /// publicly.
    Anonymous {
        name: String,
        email: String,
        website: Option<String>,
    },
}

impl Authorship {
    /// Whether this comment belongs to the given registered user.
    pub fn is_owned_by(&self, user: Uuid) -> bool {
        matches!(self, Authorship::Identified { user_id } if *user_id == user)
    }

    /// Derive the authorship for a new comment from the caller and the
    /// submitted payload.  For identified callers the anonymous identity
    /// fields are ignored even if supplied.
    ///
    /// Assumes the payload has already passed validation, so the
    /// anonymous fields are present and well-formed.
    pub fn resolve(caller: &Caller, payload: &CommentPayload) -> Self {
        match caller.user_id() {
            Some(user_id) => Authorship::Identified { user_id },
            None => Authorship::Anonymous {
                name: payload.name.clone().unwrap_or_default(),
                email: payload.email.clone().unwrap_or_default(),
                website: payload.website.clone(),
            },
        }
    }
}

/// A single comment record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: Uuid,
    /// The post this comment is attached to.  Immutable.
    pub post_id: Uuid,
    /// Parent comment on the same post, if this is a reply.  Immutable;
    /// may dangle after the parent is deleted.
    pub parent_id: Option<Uuid>,
    /// Comment text, 1-1000 characters.
    pub content: String,
    /// Who wrote it.  Immutable.
    pub authorship: Authorship,
    /// Moderation status.
    pub status: CommentStatus,
    /// Cached count of approved direct replies.  Derived, eventually
    /// consistent; always recomputable from the children.
    pub reply_count: u32,
    /// Stored but never mutated here; reserved for a future subsystem.
    pub like_count: u32,
    /// Client IP captured at creation.  Admin-only in responses.
    pub ip_address: String,
    /// Client user agent captured at creation.  Admin-only in responses.
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;

    #[test]
    fn status_round_trip() {
        for s in [
            CommentStatus::Pending,
            CommentStatus::Approved,
            CommentStatus::Rejected,
            CommentStatus::Spam,
        ] {
            assert_eq!(CommentStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(CommentStatus::parse("deleted"), None);
        assert_eq!(CommentStatus::parse("Approved"), None);
    }

    #[test]
    fn ownership() {
        let user = Uuid::new_v4();
        let owned = Authorship::Identified { user_id: user };
        let anon = Authorship::Anonymous {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            website: None,
        };

        assert!(owned.is_owned_by(user));
        assert!(!owned.is_owned_by(Uuid::new_v4()));
        assert!(!anon.is_owned_by(user));
    }

    #[test]
    fn resolve_prefers_caller_identity() {
        let user = Uuid::new_v4();
        let caller = Caller::Identified {
            id: user,
            role: Role::Other,
        };
        // Anonymous identity fields are ignored for identified callers.
        let payload = CommentPayload {
            content: "hello".into(),
            name: Some("Mallory".into()),
            email: Some("mallory@example.com".into()),
            website: None,
        };

        assert_eq!(
            Authorship::resolve(&caller, &payload),
            Authorship::Identified { user_id: user }
        );
    }

    #[test]
    fn resolve_anonymous_carries_payload_fields() {
        let payload = CommentPayload {
            content: "hello".into(),
            name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            website: Some("https://alice.example".into()),
        };

        let authorship = Authorship::resolve(&Caller::Anonymous, &payload);
        assert_eq!(
            authorship,
            Authorship::Anonymous {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                website: Some("https://alice.example".into()),
            }
        );
    }
}
