//! Data models
//!
//! This module contains all data structures used throughout Postboard.
//! Models represent:
//! - Database entities (User, AccessToken, Post, Tag, PostTag)
//! - API request payloads (PostPayload, PostPatch, TagPayload, TagPatch)
//! - Shared timestamp bookkeeping

mod access_token;
mod post;
mod tag;
mod timestamps;
mod user;

pub use access_token::AccessToken;
pub use post::{Post, PostPatch, PostPayload, PostTag, PostWithTags};
pub use tag::{Tag, TagPatch, TagPayload, TagWithCount};
pub use timestamps::Timestamps;
pub use user::{Credentials, User};

/// Unwrap a required text field, rejecting missing or blank values.
fn require_text(field: &str, value: Option<String>) -> Result<String, String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(format!("{} must not be empty", field)),
        None => Err(format!("{} is required", field)),
    }
}

/// Reject a text field that is present but blank.
fn reject_empty(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(value) if value.trim().is_empty() => Err(format!("{} must not be empty", field)),
        _ => Ok(()),
    }
}
