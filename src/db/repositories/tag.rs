//! Tag repository
//!
//! Database operations for tags.
//!
//! This module provides:
//! - `TagRepository` trait defining the interface for tag data access
//! - `SqlxTagRepository` implementing the trait for SQLite and MySQL
//!
//! Reads skip soft-deleted rows. `clear` is the only hard delete.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Tag, TagWithCount, Timestamps};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get an active tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// List active tags ordered by ID, each with its active post count
    async fn list_with_counts(&self) -> Result<Vec<TagWithCount>>;

    /// Number of active posts carrying the tag
    async fn post_count(&self, tag_id: i64) -> Result<i64>;

    /// Persist the writable fields and `updated_at`
    async fn update(&self, tag: &Tag) -> Result<()>;

    /// Set `deleted_at` on an active tag. Returns false if none matched.
    async fn soft_delete(&self, id: i64) -> Result<bool>;

    /// Hard-delete every tag and every pivot row. Returns the tags removed.
    async fn clear(&self) -> Result<u64>;
}

/// SQLx-based tag repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_tag_sqlite(pool, tag).await,
            Backend::Mysql(pool) => create_tag_mysql(pool, tag).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_tag_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_tag_by_id_mysql(pool, id).await,
        }
    }

    async fn list_with_counts(&self) -> Result<Vec<TagWithCount>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_tags_with_counts_sqlite(pool).await,
            Backend::Mysql(pool) => list_tags_with_counts_mysql(pool).await,
        }
    }

    async fn post_count(&self, tag_id: i64) -> Result<i64> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => {
                let row = sqlx::query(POST_COUNT_SQL)
                    .bind(tag_id)
                    .fetch_one(pool)
                    .await
                    .context("Failed to count posts for tag")?;
                Ok(row.get("count"))
            }
            Backend::Mysql(pool) => {
                let row = sqlx::query(POST_COUNT_SQL)
                    .bind(tag_id)
                    .fetch_one(pool)
                    .await
                    .context("Failed to count posts for tag")?;
                Ok(row.get("count"))
            }
        }
    }

    async fn update(&self, tag: &Tag) -> Result<()> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => update_tag_sqlite(pool, tag).await,
            Backend::Mysql(pool) => update_tag_mysql(pool, tag).await,
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => soft_delete_tag_sqlite(pool, id).await,
            Backend::Mysql(pool) => soft_delete_tag_mysql(pool, id).await,
        }
    }

    async fn clear(&self) -> Result<u64> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => clear_tags_sqlite(pool).await,
            Backend::Mysql(pool) => clear_tags_mysql(pool).await,
        }
    }
}

const POST_COUNT_SQL: &str = r#"
    SELECT COUNT(p.id) as count
    FROM post_tag pt
    INNER JOIN posts p ON p.id = pt.post_id
    WHERE pt.tag_id = ? AND p.deleted_at IS NULL
"#;

const LIST_WITH_COUNTS_SQL: &str = r#"
    SELECT t.id, t.title, t.created_at, t.updated_at, t.deleted_at,
           COUNT(p.id) as post_count
    FROM tags t
    LEFT JOIN post_tag pt ON pt.tag_id = t.id
    LEFT JOIN posts p ON p.id = pt.post_id AND p.deleted_at IS NULL
    WHERE t.deleted_at IS NULL
    GROUP BY t.id, t.title, t.created_at, t.updated_at, t.deleted_at
    ORDER BY t.id
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_tag_sqlite(pool: &SqlitePool, tag: &Tag) -> Result<Tag> {
    let result = sqlx::query(
        r#"
        INSERT INTO tags (title, created_at, updated_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&tag.title)
    .bind(tag.timestamps.created_at)
    .bind(tag.timestamps.updated_at)
    .execute(pool)
    .await
    .context("Failed to create tag")?;

    Ok(Tag {
        id: result.last_insert_rowid(),
        ..tag.clone()
    })
}

async fn get_tag_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, created_at, updated_at, deleted_at
        FROM tags
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get tag by ID")?;

    Ok(row.as_ref().map(row_to_tag_sqlite))
}

async fn list_tags_with_counts_sqlite(pool: &SqlitePool) -> Result<Vec<TagWithCount>> {
    let rows = sqlx::query(LIST_WITH_COUNTS_SQL)
        .fetch_all(pool)
        .await
        .context("Failed to list tags")?;

    Ok(rows
        .iter()
        .map(|row| TagWithCount::new(row_to_tag_sqlite(row), row.get("post_count")))
        .collect())
}

async fn update_tag_sqlite(pool: &SqlitePool, tag: &Tag) -> Result<()> {
    sqlx::query("UPDATE tags SET title = ?, updated_at = ? WHERE id = ?")
        .bind(&tag.title)
        .bind(tag.timestamps.updated_at)
        .bind(tag.id)
        .execute(pool)
        .await
        .context("Failed to update tag")?;

    Ok(())
}

async fn soft_delete_tag_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut timestamps = Timestamps::now();
    timestamps.soft_delete();

    let result = sqlx::query(
        "UPDATE tags SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(timestamps.deleted_at)
    .bind(timestamps.updated_at)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete tag")?;

    Ok(result.rows_affected() > 0)
}

async fn clear_tags_sqlite(pool: &SqlitePool) -> Result<u64> {
    sqlx::query("DELETE FROM post_tag")
        .execute(pool)
        .await
        .context("Failed to clear post tags")?;

    let result = sqlx::query("DELETE FROM tags")
        .execute(pool)
        .await
        .context("Failed to clear tags")?;

    Ok(result.rows_affected())
}

pub(crate) fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        title: row.get("title"),
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

async fn create_tag_mysql(pool: &MySqlPool, tag: &Tag) -> Result<Tag> {
    let result = sqlx::query(
        r#"
        INSERT INTO tags (title, created_at, updated_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&tag.title)
    .bind(tag.timestamps.created_at)
    .bind(tag.timestamps.updated_at)
    .execute(pool)
    .await
    .context("Failed to create tag")?;

    Ok(Tag {
        id: result.last_insert_id() as i64,
        ..tag.clone()
    })
}

async fn get_tag_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, created_at, updated_at, deleted_at
        FROM tags
        WHERE id = ? AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get tag by ID")?;

    Ok(row.as_ref().map(row_to_tag_mysql))
}

async fn list_tags_with_counts_mysql(pool: &MySqlPool) -> Result<Vec<TagWithCount>> {
    let rows = sqlx::query(LIST_WITH_COUNTS_SQL)
        .fetch_all(pool)
        .await
        .context("Failed to list tags")?;

    Ok(rows
        .iter()
        .map(|row| TagWithCount::new(row_to_tag_mysql(row), row.get("post_count")))
        .collect())
}

async fn update_tag_mysql(pool: &MySqlPool, tag: &Tag) -> Result<()> {
    sqlx::query("UPDATE tags SET title = ?, updated_at = ? WHERE id = ?")
        .bind(&tag.title)
        .bind(tag.timestamps.updated_at)
        .bind(tag.id)
        .execute(pool)
        .await
        .context("Failed to update tag")?;

    Ok(())
}

async fn soft_delete_tag_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let mut timestamps = Timestamps::now();
    timestamps.soft_delete();

    let result = sqlx::query(
        "UPDATE tags SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(timestamps.deleted_at)
    .bind(timestamps.updated_at)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete tag")?;

    Ok(result.rows_affected() > 0)
}

async fn clear_tags_mysql(pool: &MySqlPool) -> Result<u64> {
    sqlx::query("DELETE FROM post_tag")
        .execute(pool)
        .await
        .context("Failed to clear post tags")?;

    let result = sqlx::query("DELETE FROM tags")
        .execute(pool)
        .await
        .context("Failed to clear tags")?;

    Ok(result.rows_affected())
}

pub(crate) fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Tag {
    Tag {
        id: row.get("id"),
        title: row.get("title"),
        timestamps: Timestamps {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
        },
    }
}
