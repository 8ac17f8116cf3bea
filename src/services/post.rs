//! Post service
//!
//! Business logic for posts: validation of incoming payloads, soft delete,
//! and attaching tags through the `post_tag` pivot.

use crate::db::is_unique_violation;
use crate::db::repositories::{PostRepository, TagRepository};
use crate::models::{Post, PostPatch, PostPayload, PostTag, PostWithTags};
use crate::services::resource::{Resource, ResourceError};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;

/// Post service
pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    tag_repo: Arc<dyn TagRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(post_repo: Arc<dyn PostRepository>, tag_repo: Arc<dyn TagRepository>) -> Self {
        Self {
            post_repo,
            tag_repo,
        }
    }

    /// Attach a tag to a post and return the post with its tags.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the post or the tag is absent or soft-deleted
    /// - `DuplicateTag` if the post already carries the tag
    pub async fn add_tag(&self, post_id: i64, tag_id: i64) -> Result<PostWithTags, ResourceError> {
        let post = self.find(post_id).await?;

        self.tag_repo
            .get_by_id(tag_id)
            .await
            .context("Failed to get tag")?
            .ok_or(ResourceError::NotFound("Tag"))?;

        let link = PostTag::new(post.id, tag_id);
        if self
            .post_repo
            .has_tag(&link)
            .await
            .context("Failed to check post tag")?
        {
            return Err(ResourceError::DuplicateTag);
        }

        match self.post_repo.add_tag(&link).await {
            Ok(()) => {}
            // Another request attached the same tag after the check above
            Err(e) if is_unique_violation(&e) => return Err(ResourceError::DuplicateTag),
            Err(e) => return Err(e.context("Failed to add tag to post").into()),
        }

        self.with_tags(post).await
    }

    async fn find(&self, id: i64) -> Result<Post, ResourceError> {
        self.post_repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or(ResourceError::NotFound("Post"))
    }

    async fn with_tags(&self, post: Post) -> Result<PostWithTags, ResourceError> {
        let tags = self
            .post_repo
            .tags_for_post(post.id)
            .await
            .context("Failed to get post tags")?;
        Ok(PostWithTags::new(post, tags))
    }
}

#[async_trait]
impl Resource for PostService {
    type Output = PostWithTags;
    type Payload = PostPayload;
    type Patch = PostPatch;

    async fn index(&self) -> Result<Vec<PostWithTags>, ResourceError> {
        let posts = self.post_repo.list().await.context("Failed to list posts")?;

        let mut result = Vec::with_capacity(posts.len());
        for post in posts {
            result.push(self.with_tags(post).await?);
        }
        Ok(result)
    }

    async fn store(&self, payload: PostPayload) -> Result<PostWithTags, ResourceError> {
        let post = payload.validate().map_err(ResourceError::ValidationError)?;

        let created = self
            .post_repo
            .create(&post)
            .await
            .context("Failed to create post")?;

        tracing::info!("Created post {}", created.id);
        Ok(PostWithTags::new(created, Vec::new()))
    }

    async fn show(&self, id: i64) -> Result<PostWithTags, ResourceError> {
        let post = self.find(id).await?;
        self.with_tags(post).await
    }

    async fn update(&self, id: i64, patch: PostPatch) -> Result<PostWithTags, ResourceError> {
        let mut post = self.find(id).await?;
        patch.validate().map_err(ResourceError::ValidationError)?;

        post.apply_patch(patch);
        self.post_repo
            .update(&post)
            .await
            .context("Failed to update post")?;

        self.with_tags(post).await
    }

    async fn replace(&self, id: i64, payload: PostPayload) -> Result<PostWithTags, ResourceError> {
        let mut post = self.find(id).await?;
        let replacement = payload.validate().map_err(ResourceError::ValidationError)?;

        post.replace_with(replacement);
        self.post_repo
            .update(&post)
            .await
            .context("Failed to replace post")?;

        self.with_tags(post).await
    }

    async fn destroy(&self, id: i64) -> Result<(), ResourceError> {
        let deleted = self
            .post_repo
            .soft_delete(id)
            .await
            .context("Failed to delete post")?;

        if !deleted {
            return Err(ResourceError::NotFound("Post"));
        }
        tracing::info!("Soft-deleted post {}", id);
        Ok(())
    }
}
