//! Reply-count cache maintenance.
//!
//! The count is always re-derived from the current children, never
//! incremented in place, so concurrent recomputes cannot compound drift:
//! the last one to finish reflects some real snapshot of the children.
//! A failure here is logged and swallowed -- a stale cached count is
//! preferred over rolling back the write that triggered it.

use uuid::Uuid;

use colloquy_store::Database;

/// Recompute a comment's cached reply count from its approved children.
///
/// Idempotent and safe to re-run.  A no-op when the parent no longer
/// exists (its row is simply not there to update).
pub fn recompute(db: &Database, parent_id: Uuid) {
    let result = db
        .count_approved_children(parent_id)
        .and_then(|count| db.set_reply_count(parent_id, count).map(|()| count));

    match result {
        Ok(count) => {
            tracing::debug!(parent = %parent_id, count, "reply count recomputed");
        }
        Err(e) => {
            tracing::error!(parent = %parent_id, error = %e, "reply count recompute failed");
        }
    }
}
