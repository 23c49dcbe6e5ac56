pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod todos;

use std::sync::Arc;
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use crate::config::{Settings, StorageBackend};

pub use auth::{AuthService, AuthenticatedUser, Identity};
pub use db::{DbOperations, InMemoryRepository, Repository};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub repo: Arc<dyn Repository>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let repo: Arc<dyn Repository> = match config.database.backend {
            StorageBackend::Postgres => {
                let db = DbOperations::new_with_options(
                    &config.database.url,
                    config.database.max_connections,
                    config.database.acquire_timeout(),
                )
                .await?;
                db.migrate().await?;
                info!("Connected to Postgres and applied migrations");
                Arc::new(db)
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; data is lost on restart");
                Arc::new(InMemoryRepository::new())
            }
        };

        Ok(Self::with_repository(config, repo))
    }

    pub fn with_repository(config: Settings, repo: Arc<dyn Repository>) -> Self {
        let auth = AuthService::from_settings(repo.clone(), &config);
        Self {
            config: Arc::new(config),
            repo,
            auth: Arc::new(auth),
        }
    }
}

fn validation_error(err: impl std::fmt::Display, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}

/// Registers every route plus extractor error handlers, so malformed
/// bodies, queries and paths come back as 422 in the common error shape.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| validation_error(err, req)))
        .app_data(web::FormConfig::default().error_handler(|err, req| validation_error(err, req)))
        .app_data(web::QueryConfig::default().error_handler(|err, req| validation_error(err, req)))
        .app_data(web::PathConfig::default().error_handler(|err, req| validation_error(err, req)))
        .route("/health", web::get().to(health_check))
        .route("/register", web::post().to(auth::handlers::register))
        .route("/token", web::post().to(auth::handlers::login))
        .route("/login", web::post().to(auth::handlers::login))
        .route("/users/me", web::get().to(auth::handlers::me))
        .route("/users/{user_id}/role", web::post().to(auth::handlers::assign_role));
    todos::configure(cfg);
}
