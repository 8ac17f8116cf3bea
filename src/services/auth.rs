//! Authentication service
//!
//! Implements account and token management:
//! - Registration with argon2 password hashing
//! - Bearer token issuance, lookup and revocation
//! - Username/password verification for HTTP Basic logins
//!
//! Tokens are opaque strings stored in `access_tokens`. They do not expire;
//! a token stays valid until it is revoked through logout.

use crate::db::is_unique_violation;
use crate::db::repositories::{AccessTokenRepository, UserRepository};
use crate::models::{AccessToken, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for auth service operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Token to revoke does not exist
    #[error("Token not found")]
    TokenNotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Auth service for users and access tokens
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    token_repo: Arc<dyn AccessTokenRepository>,
}

impl AuthService {
    /// Create a new auth service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_repo: Arc<dyn AccessTokenRepository>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username or password is empty
    /// - `UserExists` if the username is already taken
    /// - `InternalError` for database errors
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthServiceError::ValidationError(
                "Username is required".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AuthServiceError::ValidationError(
                "Password is required".to_string(),
            ));
        }

        if self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(AuthServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let password_hash = hash_password(password).context("Failed to hash password")?;
        let user = match self
            .user_repo
            .create(&User::new(username.to_string(), password_hash))
            .await
        {
            Ok(user) => user,
            // A concurrent registration won the race past the lookup above
            Err(e) if is_unique_violation(&e) => {
                return Err(AuthServiceError::UserExists(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
            Err(e) => return Err(e.context("Failed to create user").into()),
        };

        tracing::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Issue a fresh random token for a user.
    pub async fn issue_token(&self, user_id: i64) -> Result<AccessToken, AuthServiceError> {
        let token = Uuid::new_v4().simple().to_string();
        self.issue_fixed_token(user_id, &token).await
    }

    /// Persist a caller-chosen token string for a user.
    pub async fn issue_fixed_token(
        &self,
        user_id: i64,
        token: &str,
    ) -> Result<AccessToken, AuthServiceError> {
        let created = self
            .token_repo
            .create(&AccessToken::new(token.to_string(), user_id))
            .await
            .context("Failed to create access token")?;

        tracing::debug!("Issued access token for user {}", user_id);
        Ok(created)
    }

    /// Resolve a bearer token to its user. Unknown tokens yield `None`.
    pub async fn authenticate_by_token(&self, token: &str) -> Result<Option<User>, AuthServiceError> {
        let access_token = match self
            .token_repo
            .get_by_token(token)
            .await
            .context("Failed to look up access token")?
        {
            Some(access_token) => access_token,
            None => return Ok(None),
        };

        let user = self
            .user_repo
            .get_by_id(access_token.user_id)
            .await
            .context("Failed to get token owner")?;

        Ok(user)
    }

    /// Verify a username and password.
    ///
    /// The username is trimmed as on registration. Unknown users and wrong
    /// passwords produce the same error.
    pub async fn authenticate_by_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AuthServiceError> {
        let invalid = || AuthServiceError::AuthenticationError("Invalid username or password".to_string());
        let username = username.trim();

        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user")?
            .ok_or_else(invalid)?;

        let password_valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            return Err(invalid());
        }

        Ok(user)
    }

    /// Delete a token.
    ///
    /// # Errors
    ///
    /// - `TokenNotFound` if no row matched
    pub async fn revoke(&self, token: &str) -> Result<(), AuthServiceError> {
        let deleted = self
            .token_repo
            .delete_by_token(token)
            .await
            .context("Failed to delete access token")?;

        if deleted == 0 {
            return Err(AuthServiceError::TokenNotFound);
        }
        Ok(())
    }

    /// Every user except the given one
    pub async fn list_other_users(&self, user_id: i64) -> Result<Vec<User>, AuthServiceError> {
        Ok(self
            .user_repo
            .list_except(user_id)
            .await
            .context("Failed to list users")?)
    }

    pub async fn count_users(&self) -> Result<i64, AuthServiceError> {
        Ok(self.user_repo.count().await.context("Failed to count users")?)
    }
}
