//! Shared CRUD contract for posts and tags

use async_trait::async_trait;

/// Error types for resource operations
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// No active row with the requested ID
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Validation error (missing or invalid field)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The post already carries the tag
    #[error("This tag has already been added")]
    DuplicateTag,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// The six operations every REST resource exposes.
///
/// `update` applies a partial patch; `replace` validates a full payload the
/// same way `store` does and then overwrites every writable field.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Representation returned to callers
    type Output: Send;
    /// Full body for `store` and `replace`
    type Payload: Send;
    /// Partial body for `update`
    type Patch: Send;

    async fn index(&self) -> Result<Vec<Self::Output>, ResourceError>;

    async fn store(&self, payload: Self::Payload) -> Result<Self::Output, ResourceError>;

    async fn show(&self, id: i64) -> Result<Self::Output, ResourceError>;

    async fn update(&self, id: i64, patch: Self::Patch) -> Result<Self::Output, ResourceError>;

    async fn replace(&self, id: i64, payload: Self::Payload) -> Result<Self::Output, ResourceError>;

    /// Soft-delete the row
    async fn destroy(&self, id: i64) -> Result<(), ResourceError>;
}
