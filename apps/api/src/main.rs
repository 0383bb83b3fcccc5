//! Parrot admin server composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod error;
mod handlers;
mod resources;
mod state;
mod submission;
mod views;

use std::sync::Arc;

use parrot_application::RecordRepository;
use parrot_core::AppError;
use parrot_infrastructure::{
    Argon2PasswordHasher, InMemoryRecordRepository, PostgresRecordRepository,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::{ApiConfig, StorageConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let repository: Arc<dyn RecordRepository> = match &config.storage {
        StorageConfig::Memory => Arc::new(InMemoryRecordRepository::new()),
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to connect to database: {error}"))
                })?;

            sqlx::migrate!("../../crates/infrastructure/migrations")
                .run(&pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to run database migrations: {error}"))
                })?;

            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }

            Arc::new(PostgresRecordRepository::new(pool))
        }
    };

    let registry = resources::build_registry(
        config.admin_path_prefix.as_str(),
        repository,
        Arc::new(Argon2PasswordHasher::new()),
    )?;
    for summary in registry.summaries() {
        info!(
            resource = %summary.resource,
            route_prefix = %summary.route_prefix,
            "registered resource"
        );
    }

    let app = api_router::build_router(AppState {
        registry,
        storage_backend: config.storage.label(),
    });

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, storage = config.storage.label(), "parrot admin listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}
