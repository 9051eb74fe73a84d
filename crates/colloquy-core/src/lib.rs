//! # colloquy-core
//!
//! Domain logic for the Colloquy comment engine: the comment model,
//! caller identity, payload validation, the moderation state machine,
//! and the access control matrix.
//!
//! This crate is pure -- no I/O, no persistence.  The store and server
//! crates build on it.

pub mod access;
pub mod comment;
pub mod identity;
pub mod moderation;
pub mod validation;

pub use comment::{Authorship, Comment, CommentStatus};
pub use identity::{Caller, Role};
pub use validation::{CommentPayload, ValidationError};
