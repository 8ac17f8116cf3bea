//! Post model
//!
//! This module defines the Post entity, the typed payloads accepted by the
//! post endpoints, and the `PostTag` join entity linking posts and tags.
//!
//! Writable fields are `title`, `content` and `published`. `PostPayload` is
//! used for `store` and `replace` (every field required), `PostPatch` for
//! `update` (every field optional, unknown fields ignored).

use serde::{Deserialize, Serialize};

use super::{require_text, reject_empty, Tag, Timestamps};

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// Whether the post is publicly visible
    pub published: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Post {
    /// Create a new Post with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(title: String, content: String, published: bool) -> Self {
        Self {
            id: 0, // Will be set by the database
            title,
            content,
            published,
            timestamps: Timestamps::now(),
        }
    }

    /// Overwrite every writable field with a validated replacement.
    pub fn replace_with(&mut self, replacement: Post) {
        self.title = replacement.title;
        self.content = replacement.content;
        self.published = replacement.published;
        self.timestamps.touch();
    }

    /// Apply the fields present in a patch.
    ///
    /// The patch must already be validated.
    pub fn apply_patch(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        self.timestamps.touch();
    }
}

/// Post together with its active tags
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostWithTags {
    #[serde(flatten)]
    pub post: Post,
    pub tags: Vec<Tag>,
}

impl PostWithTags {
    pub fn new(post: Post, tags: Vec<Tag>) -> Self {
        Self { post, tags }
    }
}

/// Full post body for `store` and `replace`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

impl PostPayload {
    /// Check that every field is present and non-empty, producing the new post.
    pub fn validate(self) -> Result<Post, String> {
        let title = require_text("title", self.title)?;
        let content = require_text("content", self.content)?;
        let published = self
            .published
            .ok_or_else(|| "published is required".to_string())?;

        Ok(Post::new(title, content, published))
    }
}

/// Partial post body for `update`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

impl PostPatch {
    /// Fields that are present must not be blank.
    pub fn validate(&self) -> Result<(), String> {
        reject_empty("title", self.title.as_deref())?;
        reject_empty("content", self.content.as_deref())?;
        Ok(())
    }
}

/// Row of the `post_tag` pivot table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTag {
    pub post_id: i64,
    pub tag_id: i64,
}

impl PostTag {
    pub fn new(post_id: i64, tag_id: i64) -> Self {
        Self { post_id, tag_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn payload(title: Option<&str>, content: Option<&str>, published: Option<bool>) -> PostPayload {
        PostPayload {
            title: title.map(String::from),
            content: content.map(String::from),
            published,
        }
    }

    #[test]
    fn test_payload_validate_ok() {
        let post = payload(Some("T"), Some("C"), Some(false)).validate().unwrap();

        assert_eq!(post.id, 0);
        assert_eq!(post.title, "T");
        assert_eq!(post.content, "C");
        assert!(!post.published);
        assert!(post.timestamps.deleted_at.is_none());
    }

    #[test]
    fn test_payload_missing_fields() {
        assert_eq!(
            payload(None, Some("C"), Some(true)).validate().unwrap_err(),
            "title is required"
        );
        assert_eq!(
            payload(Some("T"), None, Some(true)).validate().unwrap_err(),
            "content is required"
        );
        assert_eq!(
            payload(Some("T"), Some("C"), None).validate().unwrap_err(),
            "published is required"
        );
    }

    #[test]
    fn test_payload_blank_text_rejected() {
        assert!(payload(Some("   "), Some("C"), Some(true)).validate().is_err());
        assert!(payload(Some("T"), Some(""), Some(true)).validate().is_err());
    }

    #[test]
    fn test_payload_wrong_type_fails_deserialization() {
        let result: Result<PostPayload, _> =
            serde_json::from_str(r#"{"title": 1, "content": "C", "published": false}"#);
        assert!(result.is_err());

        let result: Result<PostPayload, _> =
            serde_json::from_str(r#"{"title": "T", "content": "C", "published": "no"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_ignores_unknown_fields() {
        let patch: PostPatch =
            serde_json::from_str(r#"{"title": "New", "id": 99, "deleted_at": null}"#).unwrap();
        let mut post = Post::new("Old".to_string(), "Body".to_string(), true);
        post.id = 7;

        patch.validate().unwrap();
        post.apply_patch(patch);

        assert_eq!(post.id, 7);
        assert_eq!(post.title, "New");
        assert_eq!(post.content, "Body");
        assert!(post.published);
    }

    #[test]
    fn test_patch_blank_title_rejected() {
        let patch = PostPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(patch.validate().unwrap_err(), "title must not be empty");
    }

    #[test]
    fn test_replace_with_overwrites_all_fields() {
        let mut post = Post::new("Old".to_string(), "Old body".to_string(), false);
        post.id = 3;
        let created = post.timestamps.created_at;

        post.replace_with(Post::new("New".to_string(), "New body".to_string(), true));

        assert_eq!(post.id, 3);
        assert_eq!(post.title, "New");
        assert_eq!(post.content, "New body");
        assert!(post.published);
        assert_eq!(post.timestamps.created_at, created);
    }

    #[test]
    fn test_post_with_tags_serializes_flat() {
        let post = Post::new("T".to_string(), "C".to_string(), false);
        let json = serde_json::to_value(PostWithTags::new(post, Vec::new())).unwrap();

        assert_eq!(json["title"], "T");
        assert_eq!(json["published"], false);
        assert!(json["tags"].as_array().unwrap().is_empty());
        assert!(json.get("created_at").is_some());
    }

    proptest! {
        #[test]
        fn prop_patch_only_touches_present_fields(
            title in proptest::option::of("[a-zA-Z]{1,20}"),
            content in proptest::option::of("[a-zA-Z]{1,40}"),
            published in proptest::option::of(any::<bool>()),
        ) {
            let original = Post::new("Original".to_string(), "Original body".to_string(), false);
            let mut post = original.clone();
            let patch = PostPatch { title: title.clone(), content: content.clone(), published };

            prop_assert!(patch.validate().is_ok());
            post.apply_patch(patch);

            prop_assert_eq!(post.title, title.unwrap_or(original.title));
            prop_assert_eq!(post.content, content.unwrap_or(original.content));
            prop_assert_eq!(post.published, published.unwrap_or(original.published));
        }
    }
}
