//! The moderation state machine.
//!
//! Four states: `pending`, `approved`, `rejected`, `spam`.  Registered
//! authors are trusted by default, so their comments start `approved`;
//! anonymous submissions always start `pending` and wait for review.
//! Admins may move a comment between any two states -- moderation can
//! reverse itself, e.g. reinstate a spam-flagged comment.

use crate::comment::{Authorship, CommentStatus};

/// Initial status for a newly created comment.
pub fn initial_status(authorship: &Authorship) -> CommentStatus {
    match authorship {
        Authorship::Identified { .. } => CommentStatus::Approved,
        Authorship::Anonymous { .. } => CommentStatus::Pending,
    }
}

/// Whether an admin may move a comment from `from` to `to`.
///
/// Every pair of the four legal states is allowed.  Unrecognized status
/// values never reach this point: they fail at parse time.
pub fn transition_allowed(_from: CommentStatus, _to: CommentStatus) -> bool {
    true
}

/// Whether a status change crosses the `approved` boundary in either
/// direction.  Only such changes affect the parent's cached reply count.
pub fn crosses_approved(old: CommentStatus, new: CommentStatus) -> bool {
    (old == CommentStatus::Approved) != (new == CommentStatus::Approved)
}
