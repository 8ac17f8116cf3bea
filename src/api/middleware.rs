//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The JSON error envelope and its status mapping
//! - Bearer token authentication middleware
//! - Extractors for the authenticated user, the raw bearer token, and HTTP
//!   Basic credentials

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequestParts, Request, State,
    },
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use data_encoding::BASE64;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{Credentials, User};
use crate::services::{AuthService, AuthServiceError, PostService, ResourceError, TagService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub post_service: Arc<PostService>,
    pub tag_service: Arc<TagService>,
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Bearer token that authenticated the request
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Username and password decoded from an `Authorization: Basic` header
#[derive(Debug, Clone)]
pub struct BasicCredentials(pub Credentials);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// HTTP status for the error code
    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "BAD_REQUEST" | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::with_details(
            "BAD_REQUEST",
            "Invalid JSON body",
            serde_json::Value::String(rejection.body_text()),
        )
    }
}

/// An `{id}` segment that is not a valid integer names no resource
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::with_details(
            "NOT_FOUND",
            "Resource not found",
            serde_json::Value::String(rejection.body_text()),
        )
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound(_) => Self::not_found(err.to_string()),
            ResourceError::ValidationError(message) => Self::validation_error(message),
            ResourceError::DuplicateTag => Self::bad_request(err.to_string()),
            ResourceError::InternalError(e) => {
                tracing::error!("Resource operation failed: {:#}", e);
                Self::internal_error("Internal server error")
            }
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::AuthenticationError(message) => Self::unauthorized(message),
            AuthServiceError::ValidationError(message) => Self::validation_error(message),
            AuthServiceError::UserExists(message) => Self::conflict(message),
            AuthServiceError::TokenNotFound => Self::bad_request(err.to_string()),
            AuthServiceError::InternalError(e) => {
                tracing::error!("Auth operation failed: {:#}", e);
                Self::internal_error("Internal server error")
            }
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Decode an `Authorization: Basic <base64(user:password)>` header
fn extract_basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let encoded = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Basic ")?;

    let decoded = BASE64.decode(encoded.trim().as_bytes()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Authentication middleware
///
/// Resolves the bearer token and stores the user and the token in request
/// extensions for the handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .auth_service
        .authenticate_by_token(&token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid authentication token"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    request.extensions_mut().insert(BearerToken(token));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_basic_credentials(&parts.headers)
            .map(BasicCredentials)
            .ok_or_else(|| ApiError::unauthorized("Missing or malformed basic credentials"))
    }
}
