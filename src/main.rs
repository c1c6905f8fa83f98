mod auth;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::AuthService;
use crate::config::Config;
use crate::services::{file_service::FileService, user_service::UserService};
use crate::storage::ObjectStorage;

/// Upload request bodies are capped well above typical use; the object
/// store enforces its own quota beyond this.
const MAX_UPLOAD_BODY_BYTES: usize = 100 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Starting Cloudvault...");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    // Initialize database connection pool
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    info!("Database migrations completed");

    // Initialize object storage client
    let storage = Arc::new(ObjectStorage::new(&config.storage));
    info!("Object storage client initialized");

    // Initialize services
    let auth_service = Arc::new(AuthService::new(config.jwt.clone()));
    let user_service = Arc::new(UserService::new(db_pool.clone(), auth_service.clone()));
    let file_service = Arc::new(FileService::new(db_pool.clone(), storage.clone()));

    // Build application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        db_pool,
        auth_service,
        user_service,
        file_service,
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // File routes sit behind the bearer-token gate
    let file_routes = Router::new()
        .route("/files", get(handlers::files::list_files))
        .route("/files/upload", post(handlers::files::upload_files))
        .route("/files/download/:id", get(handlers::files::download_file))
        .route("/files/:id", delete(handlers::files::delete_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth_middleware,
        ));

    // Build router
    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh_token))
        .merge(file_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Cloudvault listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub struct AppState {
    pub config: Config,
    pub db_pool: sqlx::PgPool,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub file_service: Arc<FileService>,
}
