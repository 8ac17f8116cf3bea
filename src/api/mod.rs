//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints for Postboard:
//! - Public endpoints (banner, hello, websocket echo)
//! - Account endpoints (register, token, logout, me, users)
//! - Post and tag resources under `/api/v1`, rendered as JSON:API documents

pub mod auth;
pub mod jsonapi;
pub mod middleware;
pub mod posts;
pub mod public;
pub mod tags;

#[cfg(test)]
mod tests;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Routes that require a valid bearer token
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::protected_router())
        // Legacy alias kept next to the versioned resource
        .route("/posts", get(posts::list_posts))
        .nest("/api/v1/posts", posts::router())
        .nest("/api/v1/tags", tags::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ))
}

fn cors_layer(cors_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if cors_origin == "*" {
        return cors.allow_origin(Any);
    }

    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Ignoring invalid CORS origin: {}", cors_origin);
            cors
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .merge(public::router())
        .merge(auth::public_router())
        .merge(protected_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origin)),
        )
        .with_state(state)
}
