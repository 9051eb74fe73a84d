//! Caller identity as produced by the upstream identity resolver.
//!
//! The engine never authenticates anyone itself.  It receives either an
//! authenticated user id plus role, or "anonymous", and bases every
//! authorization and validation decision on that.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to an authenticated caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full moderation rights.
    Admin,
    /// Any other registered user.
    Other,
}

/// The identity of the caller performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// An authenticated user with a stable id and a role.
    Identified { id: Uuid, role: Role },
    /// An unauthenticated visitor.
    Anonymous,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Caller::Identified {
                role: Role::Admin,
                ..
            }
        )
    }

    /// The authenticated user id, if any.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Caller::Identified { id, .. } => Some(*id),
            Caller::Anonymous => None,
        }
    }
}
