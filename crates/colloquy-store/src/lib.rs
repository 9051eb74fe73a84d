//! # colloquy-store
//!
//! SQLite persistence for the comment engine.  The crate exposes a
//! synchronous [`Database`] handle that wraps a `rusqlite::Connection`
//! and provides typed CRUD helpers for comments plus the post-existence
//! boundary consumed at creation time.

pub mod comments;
pub mod database;
pub mod migrations;
pub mod posts;

mod error;

pub use comments::NewComment;
pub use database::Database;
pub use error::StoreError;
