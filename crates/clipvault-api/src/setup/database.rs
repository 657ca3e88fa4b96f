//! Database setup and initialization

use anyhow::{Context, Result};
use clipvault_core::Config;
use clipvault_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Connect to PostgreSQL and run migrations, or fall back to an in-memory
/// repository when no `DATABASE_URL` is configured.
pub async fn setup_database(
    config: &Config,
) -> Result<(Option<PgPool>, Arc<dyn VideoRepository>)> {
    let Some(database_url) = config.base.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; video records are kept in memory and lost on restart");
        return Ok((None, Arc::new(InMemoryVideoRepository::new())));
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.base.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.base.db_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.base.db_max_connections,
        "Database connected successfully"
    );

    // Workspace migrations/ relative to this crate
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let videos: Arc<dyn VideoRepository> = Arc::new(PgVideoRepository::new(pool.clone()));
    Ok((Some(pool), videos))
}
