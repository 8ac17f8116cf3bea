//! Tag model
//!
//! This module defines the Tag entity and related types for Postboard.

use serde::{Deserialize, Serialize};

use super::{reject_empty, require_text, Timestamps};

/// Tag entity
///
/// Tags are attached to posts through the `post_tag` pivot table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag title
    pub title: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Tag {
    /// Create a new Tag with the given title.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(title: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            title,
            timestamps: Timestamps::now(),
        }
    }

    /// Overwrite every writable field with a validated replacement.
    pub fn replace_with(&mut self, replacement: Tag) {
        self.title = replacement.title;
        self.timestamps.touch();
    }

    /// Apply the fields present in a validated patch.
    pub fn apply_patch(&mut self, patch: TagPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        self.timestamps.touch();
    }
}

/// Tag with the number of active posts carrying it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagWithCount {
    /// The tag itself
    #[serde(flatten)]
    pub tag: Tag,
    /// Number of non-deleted posts with this tag
    pub post_count: i64,
}

impl TagWithCount {
    pub fn new(tag: Tag, post_count: i64) -> Self {
        Self { tag, post_count }
    }
}

/// Full tag body for `store` and `replace`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPayload {
    pub title: Option<String>,
}

impl TagPayload {
    pub fn validate(self) -> Result<Tag, String> {
        Ok(Tag::new(require_text("title", self.title)?))
    }
}

/// Partial tag body for `update`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPatch {
    pub title: Option<String>,
}

impl TagPatch {
    pub fn validate(&self) -> Result<(), String> {
        reject_empty("title", self.title.as_deref())
    }
}
