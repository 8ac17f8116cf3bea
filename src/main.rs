//! Postboard - a small posts and tags REST backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postboard::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        DatabasePool,
        repositories::{
            SqlxAccessTokenRepository, SqlxPostRepository, SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{seed_data, AuthService, PostService, TagService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postboard=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Postboard...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let token_repo = SqlxAccessTokenRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());

    // Initialize services
    let auth_service = Arc::new(AuthService::new(user_repo, token_repo));
    let post_service = Arc::new(PostService::new(post_repo, tag_repo.clone()));
    let tag_service = Arc::new(TagService::new(tag_repo));

    if config.seed.enabled {
        seed_data(&auth_service, &post_service, &tag_service).await;
    }

    let state = AppState {
        auth_service,
        post_service,
        tag_service,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    pool.close().await;
    Ok(())
}
