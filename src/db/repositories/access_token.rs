//! Access token repository
//!
//! Database operations for bearer tokens. Tokens are hard-deleted on logout.

use crate::db::{Backend, DynDatabasePool};
use crate::models::AccessToken;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Access token repository trait
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// Persist a new token
    async fn create(&self, token: &AccessToken) -> Result<AccessToken>;

    /// Look up a token by its string value
    async fn get_by_token(&self, token: &str) -> Result<Option<AccessToken>>;

    /// Delete a token by its string value, returning the number of rows removed
    async fn delete_by_token(&self, token: &str) -> Result<u64>;
}

/// SQLx-based access token repository implementation
pub struct SqlxAccessTokenRepository {
    pool: DynDatabasePool,
}

impl SqlxAccessTokenRepository {
    /// Create a new SQLx access token repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AccessTokenRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AccessTokenRepository for SqlxAccessTokenRepository {
    async fn create(&self, token: &AccessToken) -> Result<AccessToken> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_token_sqlite(pool, token).await,
            Backend::Mysql(pool) => create_token_mysql(pool, token).await,
        }
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<AccessToken>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_token_sqlite(pool, token).await,
            Backend::Mysql(pool) => get_token_mysql(pool, token).await,
        }
    }

    async fn delete_by_token(&self, token: &str) -> Result<u64> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => {
                let result = sqlx::query("DELETE FROM access_tokens WHERE token = ?")
                    .bind(token)
                    .execute(pool)
                    .await
                    .context("Failed to delete access token")?;
                Ok(result.rows_affected())
            }
            Backend::Mysql(pool) => {
                let result = sqlx::query("DELETE FROM access_tokens WHERE token = ?")
                    .bind(token)
                    .execute(pool)
                    .await
                    .context("Failed to delete access token")?;
                Ok(result.rows_affected())
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_token_sqlite(pool: &SqlitePool, token: &AccessToken) -> Result<AccessToken> {
    let result = sqlx::query(
        "INSERT INTO access_tokens (token, user_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(&token.token)
    .bind(token.user_id)
    .bind(token.created_at)
    .execute(pool)
    .await
    .context("Failed to create access token")?;

    Ok(AccessToken {
        id: result.last_insert_rowid(),
        ..token.clone()
    })
}

async fn get_token_sqlite(pool: &SqlitePool, token: &str) -> Result<Option<AccessToken>> {
    let row = sqlx::query(
        "SELECT id, token, user_id, created_at FROM access_tokens WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .context("Failed to get access token")?;

    Ok(row.map(|row| AccessToken {
        id: row.get("id"),
        token: row.get("token"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_token_mysql(pool: &MySqlPool, token: &AccessToken) -> Result<AccessToken> {
    let result = sqlx::query(
        "INSERT INTO access_tokens (token, user_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(&token.token)
    .bind(token.user_id)
    .bind(token.created_at)
    .execute(pool)
    .await
    .context("Failed to create access token")?;

    Ok(AccessToken {
        id: result.last_insert_id() as i64,
        ..token.clone()
    })
}

async fn get_token_mysql(pool: &MySqlPool, token: &str) -> Result<Option<AccessToken>> {
    let row = sqlx::query(
        "SELECT id, token, user_id, created_at FROM access_tokens WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .context("Failed to get access token")?;

    Ok(row.map(|row| AccessToken {
        id: row.get("id"),
        token: row.get("token"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }))
}
