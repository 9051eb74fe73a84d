//! The access control matrix.
//!
//! One authorization path for the whole engine.  Deletion is admin-only:
//! the storage-level policy of the original moderation design, applied
//! uniformly rather than duplicated with a looser per-endpoint rule.

use uuid::Uuid;

use crate::comment::{Comment, CommentStatus};
use crate::identity::Caller;

/// A mutating operation on a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    EditContent,
    ChangeStatus,
    Delete,
}

/// Decide whether `caller` may perform `op` on `target`.
///
/// `target` is `None` only for `Create`, which has no existing comment.
pub fn authorize(op: Operation, caller: &Caller, target: Option<&Comment>) -> bool {
    match op {
        // Anyone may comment; anonymous submissions are gated by
        // validation, not authorization.
        Operation::Create => true,
        Operation::EditContent => {
            caller.is_admin() || is_owner(caller.user_id(), target)
        }
        Operation::ChangeStatus => caller.is_admin(),
        Operation::Delete => caller.is_admin(),
    }
}

/// Whether `caller` may see this comment at all.  Admins see every
/// status; everyone else sees only approved comments -- including a
/// comment's own author, by design: nothing unapproved is ever shown by
/// default.
pub fn can_view(caller: &Caller, comment: &Comment) -> bool {
    caller.is_admin() || comment.status == CommentStatus::Approved
}

/// Whether `caller`'s listings may span all moderation statuses.
pub fn sees_all_statuses(caller: &Caller) -> bool {
    caller.is_admin()
}

fn is_owner(user: Option<Uuid>, target: Option<&Comment>) -> bool {
    match (user, target) {
        (Some(user), Some(comment)) => comment.authorship.is_owned_by(user),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::Authorship;
    use crate::identity::Role;
    use chrono::Utc;

    fn comment_by(authorship: Authorship, status: CommentStatus) -> Comment {
        let now = Utc::now();
        Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            parent_id: None,
            content: "hello".into(),
            authorship,
            status,
            reply_count: 0,
            like_count: 0,
            ip_address: "127.0.0.1".into(),
            user_agent: "test".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn admin() -> Caller {
        Caller::Identified {
            id: Uuid::new_v4(),
            role: Role::Admin,
        }
    }

    #[test]
    fn everyone_may_create() {
        assert!(authorize(Operation::Create, &admin(), None));
        assert!(authorize(Operation::Create, &Caller::Anonymous, None));
    }

    #[test]
    fn owner_may_edit_own_comment_only() {
        let owner_id = Uuid::new_v4();
        let owner = Caller::Identified {
            id: owner_id,
            role: Role::Other,
        };
        let other = Caller::Identified {
            id: Uuid::new_v4(),
            role: Role::Other,
        };
        let comment = comment_by(
            Authorship::Identified { user_id: owner_id },
            CommentStatus::Approved,
        );

        assert!(authorize(Operation::EditContent, &owner, Some(&comment)));
        assert!(!authorize(Operation::EditContent, &other, Some(&comment)));
        assert!(authorize(Operation::EditContent, &admin(), Some(&comment)));
    }

    #[test]
    fn anonymous_authorship_grants_no_rights_back() {
        // No session ties an anonymous comment to a later caller.
        let comment = comment_by(
            Authorship::Anonymous {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                website: None,
            },
            CommentStatus::Pending,
        );

        assert!(!authorize(
            Operation::EditContent,
            &Caller::Anonymous,
            Some(&comment)
        ));
        assert!(!authorize(
            Operation::Delete,
            &Caller::Anonymous,
            Some(&comment)
        ));
    }

    #[test]
    fn moderation_and_deletion_are_admin_only() {
        let owner_id = Uuid::new_v4();
        let owner = Caller::Identified {
            id: owner_id,
            role: Role::Other,
        };
        let comment = comment_by(
            Authorship::Identified { user_id: owner_id },
            CommentStatus::Approved,
        );

        assert!(!authorize(Operation::ChangeStatus, &owner, Some(&comment)));
        assert!(!authorize(Operation::Delete, &owner, Some(&comment)));
        assert!(authorize(Operation::ChangeStatus, &admin(), Some(&comment)));
        assert!(authorize(Operation::Delete, &admin(), Some(&comment)));
    }

    #[test]
    fn pending_comment_invisible_to_its_own_author() {
        let owner_id = Uuid::new_v4();
        let owner = Caller::Identified {
            id: owner_id,
            role: Role::Other,
        };
        let comment = comment_by(
            Authorship::Identified { user_id: owner_id },
            CommentStatus::Pending,
        );

        assert!(!can_view(&owner, &comment));
        assert!(can_view(&admin(), &comment));
    }
}
