//! Tag service
//!
//! Business logic for tags. Reads report how many active posts carry each
//! tag. `clear` wipes the whole table.

use crate::db::repositories::TagRepository;
use crate::models::{Tag, TagPatch, TagPayload, TagWithCount};
use crate::services::resource::{Resource, ResourceError};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;

/// Tag service
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// Hard-delete every tag along with every post pairing.
    ///
    /// Returns the number of tags removed.
    pub async fn clear(&self) -> Result<u64, ResourceError> {
        let removed = self.repo.clear().await.context("Failed to clear tags")?;
        tracing::info!("Cleared {} tag(s)", removed);
        Ok(removed)
    }

    async fn find(&self, id: i64) -> Result<Tag, ResourceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or(ResourceError::NotFound("Tag"))
    }

    async fn with_count(&self, tag: Tag) -> Result<TagWithCount, ResourceError> {
        let count = self
            .repo
            .post_count(tag.id)
            .await
            .context("Failed to count tag posts")?;
        Ok(TagWithCount::new(tag, count))
    }
}

#[async_trait]
impl Resource for TagService {
    type Output = TagWithCount;
    type Payload = TagPayload;
    type Patch = TagPatch;

    async fn index(&self) -> Result<Vec<TagWithCount>, ResourceError> {
        Ok(self
            .repo
            .list_with_counts()
            .await
            .context("Failed to list tags")?)
    }

    async fn store(&self, payload: TagPayload) -> Result<TagWithCount, ResourceError> {
        let tag = payload.validate().map_err(ResourceError::ValidationError)?;

        let created = self.repo.create(&tag).await.context("Failed to create tag")?;

        tracing::info!("Created tag {} ({})", created.id, created.title);
        Ok(TagWithCount::new(created, 0))
    }

    async fn show(&self, id: i64) -> Result<TagWithCount, ResourceError> {
        let tag = self.find(id).await?;
        self.with_count(tag).await
    }

    async fn update(&self, id: i64, patch: TagPatch) -> Result<TagWithCount, ResourceError> {
        let mut tag = self.find(id).await?;
        patch.validate().map_err(ResourceError::ValidationError)?;

        tag.apply_patch(patch);
        self.repo.update(&tag).await.context("Failed to update tag")?;

        self.with_count(tag).await
    }

    async fn replace(&self, id: i64, payload: TagPayload) -> Result<TagWithCount, ResourceError> {
        let mut tag = self.find(id).await?;
        let replacement = payload.validate().map_err(ResourceError::ValidationError)?;

        tag.replace_with(replacement);
        self.repo.update(&tag).await.context("Failed to replace tag")?;

        self.with_count(tag).await
    }

    async fn destroy(&self, id: i64) -> Result<(), ResourceError> {
        if !self.repo.soft_delete(id).await.context("Failed to delete tag")? {
            return Err(ResourceError::NotFound("Tag"));
        }
        Ok(())
    }
}
