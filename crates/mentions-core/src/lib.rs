//! Core mention-parsing logic shared by the rewrite and notification
//! pipelines.
//!
//! Everything in this crate is pure and synchronous: identifier types,
//! the text sanitizer, and the mention extractor. Resolution against
//! the platform's user/group stores lives in `mentions-engine`.

pub mod clean;
pub mod extract;
pub mod id;
pub mod post;
pub mod token;
