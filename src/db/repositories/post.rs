//! Post repository
//!
//! Database operations for posts and their `post_tag` pivot rows.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite and MySQL
//!
//! Every read filters `deleted_at IS NULL` on posts, and tag lookups through
//! the pivot skip soft-deleted tags as well.

use super::tag::{row_to_tag_mysql, row_to_tag_sqlite};
use crate::db::{Backend, DynDatabasePool};
use crate::models::{Post, PostTag, Tag, Timestamps};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get an active post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// List active posts ordered by ID
    async fn list(&self) -> Result<Vec<Post>>;

    /// Persist the writable fields and `updated_at`
    async fn update(&self, post: &Post) -> Result<()>;

    /// Set `deleted_at` on an active post. Returns false if none matched.
    async fn soft_delete(&self, id: i64) -> Result<bool>;

    /// Check whether the pivot row already exists
    async fn has_tag(&self, link: &PostTag) -> Result<bool>;

    /// Insert a pivot row
    async fn add_tag(&self, link: &PostTag) -> Result<()>;

    /// Active tags attached to a post, ordered by tag ID
    async fn tags_for_post(&self, post_id: i64) -> Result<Vec<Tag>>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_post_sqlite(pool, post).await,
            Backend::Mysql(pool) => create_post_mysql(pool, post).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_post_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_post_by_id_mysql(pool, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Post>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_posts_sqlite(pool).await,
            Backend::Mysql(pool) => list_posts_mysql(pool).await,
        }
    }

    async fn update(&self, post: &Post) -> Result<()> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => update_post_sqlite(pool, post).await,
            Backend::Mysql(pool) => update_post_mysql(pool, post).await,
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => soft_delete_post_sqlite(pool, id).await,
            Backend::Mysql(pool) => soft_delete_post_mysql(pool, id).await,
        }
    }

    async fn has_tag(&self, link: &PostTag) -> Result<bool> {
        let sql = "SELECT COUNT(*) as count FROM post_tag WHERE post_id = ? AND tag_id = ?";
        let count: i64 = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(sql)
                .bind(link.post_id)
                .bind(link.tag_id)
                .fetch_one(pool)
                .await
                .context("Failed to check post tag")?
                .get("count"),
            Backend::Mysql(pool) => sqlx::query(sql)
                .bind(link.post_id)
                .bind(link.tag_id)
                .fetch_one(pool)
                .await
                .context("Failed to check post tag")?
                .get("count"),
        };

        Ok(count > 0)
    }

    async fn add_tag(&self, link: &PostTag) -> Result<()> {
        let sql = "INSERT INTO post_tag (post_id, tag_id) VALUES (?, ?)";
        match self.pool.backend() {
            Backend::Sqlite(pool) => {
                sqlx::query(sql)
                    .bind(link.post_id)
                    .bind(link.tag_id)
                    .execute(pool)
                    .await
                    .context("Failed to add tag to post")?;
            }
            Backend::Mysql(pool) => {
                sqlx::query(sql)
                    .bind(link.post_id)
                    .bind(link.tag_id)
                    .execute(pool)
                    .await
                    .context("Failed to add tag to post")?;
            }
        }

        Ok(())
    }

    async fn tags_for_post(&self, post_id: i64) -> Result<Vec<Tag>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => {
                let rows = sqlx::query(TAGS_FOR_POST_SQL)
                    .bind(post_id)
                    .fetch_all(pool)
                    .await
                    .context("Failed to get tags for post")?;
                Ok(rows.iter().map(row_to_tag_sqlite).collect())
            }
            Backend::Mysql(pool) => {
                let rows = sqlx::query(TAGS_FOR_POST_SQL)
                    .bind(post_id)
                    .fetch_all(pool)
                    .await
                    .context("Failed to get tags for post")?;
                Ok(rows.iter().map(row_to_tag_mysql).collect())
            }
        }
    }
}

const TAGS_FOR_POST_SQL: &str = r#"
    SELECT t.id, t.title, t.created_at, t.updated_at, t.deleted_at
    FROM tags t
    INNER JOIN post_tag pt ON pt.tag_id = t.id
    WHERE pt.post_id = ? AND t.deleted_at IS NULL
    ORDER BY t.id
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, content, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(post.published)
    .bind(post.timestamps.created_at)
    .bind(post.timestamps.updated_at)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(Post {
        id: result.last_insert_rowid(),
        ..post.clone()
    })
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, content, published, created_at, updated_at, deleted_at
        FROM posts
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_sqlite))
}

async fn list_posts_sqlite(pool: &SqlitePool) -> Result<Vec<Post>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, content, published, created_at, updated_at, deleted_at
        FROM posts
        WHERE deleted_at IS NULL
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list posts")?;

    Ok(rows.iter().map(row_to_post_sqlite).collect())
}

async fn update_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, content = ?, published = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(post.published)
    .bind(post.timestamps.updated_at)
    .bind(post.id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    Ok(())
}

async fn soft_delete_post_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut timestamps = Timestamps::now();
    timestamps.soft_delete();

    let result = sqlx::query(
        "UPDATE posts SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(timestamps.deleted_at)
    .bind(timestamps.updated_at)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        published: row.get("published"),
        timestamps: Timestamps {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
        },
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, content, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(post.published)
    .bind(post.timestamps.created_at)
    .bind(post.timestamps.updated_at)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(Post {
        id: result.last_insert_id() as i64,
        ..post.clone()
    })
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, content, published, created_at, updated_at, deleted_at
        FROM posts
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_mysql))
}

async fn list_posts_mysql(pool: &MySqlPool) -> Result<Vec<Post>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, content, published, created_at, updated_at, deleted_at
        FROM posts
        WHERE deleted_at IS NULL
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list posts")?;

    Ok(rows.iter().map(row_to_post_mysql).collect())
}

async fn update_post_mysql(pool: &MySqlPool, post: &Post) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, content = ?, published = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(post.published)
    .bind(post.timestamps.updated_at)
    .bind(post.id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    Ok(())
}

async fn soft_delete_post_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let mut timestamps = Timestamps::now();
    timestamps.soft_delete();

    let result = sqlx::query(
        "UPDATE posts SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(timestamps.deleted_at)
    .bind(timestamps.updated_at)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        published: row.get("published"),
        timestamps: Timestamps {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
        },
    }
}
