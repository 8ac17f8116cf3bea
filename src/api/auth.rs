//! Authentication API endpoints
//!
//! Handles HTTP requests for accounts and tokens:
//! - POST /register - Create an account and receive a token
//! - POST /token    - Exchange HTTP Basic credentials for a new token
//! - POST /logout   - Revoke the bearer token used for the request
//! - GET  /me       - Username of the authenticated user
//! - GET  /users    - Every other user

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, BasicCredentials, BearerToken};
use crate::models::{Credentials, User};

/// Response for registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub access_token: String,
    pub user: User,
}

/// Response for token issuance
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Routes that need no bearer token
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(issue_token))
}

/// Routes behind bearer auth
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/users", get(list_users))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(credentials) = body?;

    let user = state
        .auth_service
        .register(&credentials.username, &credentials.password)
        .await?;
    let token = state.auth_service.issue_token(user.id).await?;

    Ok(Json(RegisterResponse {
        access_token: token.token,
        user,
    }))
}

/// POST /token
pub async fn issue_token(
    State(state): State<AppState>,
    BasicCredentials(credentials): BasicCredentials,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .auth_service
        .authenticate_by_password(&credentials.username, &credentials.password)
        .await?;
    let token = state.auth_service.issue_token(user.id).await?;

    Ok(Json(TokenResponse {
        access_token: token.token,
    }))
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.auth_service.revoke(&token).await?;
    Ok(StatusCode::OK)
}

/// GET /me
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> String {
    user.username
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.auth_service.list_other_users(user.id).await?;
    Ok(Json(users))
}
