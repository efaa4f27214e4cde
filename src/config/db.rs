// src/config/db.rs
// DOCUMENTATION: Database pool and schema setup
// PURPOSE: Connect to PostgreSQL (waiting for the db container) and apply migrations

use crate::config::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// The db container may still be initializing when the API starts
const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
}

/// Build the shared pool, retrying while the server refuses connections
/// Called by the API server and by load-data
pub async fn init_db_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 1;

    let pool = loop {
        match pool_options(config).connect(&config.database_url).await {
            Ok(pool) => break pool,
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                log::warn!(
                    "Database not ready (attempt {}/{}): {}",
                    attempt,
                    CONNECT_ATTEMPTS,
                    e
                );
                attempt += 1;
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(e) => return Err(e),
        }
    };

    sqlx::query("SELECT 1").execute(&pool).await?;

    log::info!("Connected to database after {} attempt(s)", attempt);
    Ok(pool)
}

/// Apply pending schema migrations from ./migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations applied");
    Ok(())
}
