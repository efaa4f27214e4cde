// src/main.rs
// DOCUMENTATION: API server entry point
// PURPOSE: Load settings, prepare the database, serve /api and /health

use actix_web::middleware::{Compress, Logger, NormalizePath, TrailingSlash};
use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use yamdb::config::{self, Config};
use yamdb::handlers;
use yamdb::services::{start_rate_limit_cleanup_task, AuthRateLimiter, FileMailer};

/// Seconds between sweeps of idle rate-limit buckets
const LIMITER_CLEANUP_INTERVAL: u64 = 300;

/// RUST_LOG wins over LOG_LEVEL
fn init_logging(config: &Config) {
    if std::env::var("RUST_LOG").is_err() {
        let filter = match config.log_level.as_str() {
            "" => "info,actix_web=info,sqlx=warn",
            level => level,
        };
        std::env::set_var("RUST_LOG", filter);
    }
    env_logger::init();
}

fn exit_with(message: &str, err: impl std::fmt::Display) -> ! {
    log::error!("{}: {}", message, err);
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }
    init_logging(&config);

    log::info!(
        "Starting yamdb {} ({})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    let pool = config::init_db_pool(&config)
        .await
        .unwrap_or_else(|e| exit_with("Failed to connect to database", e));
    if let Err(e) = config::run_migrations(&pool).await {
        exit_with("Failed to apply migrations", e);
    }

    let limiter = Arc::new(AuthRateLimiter::new(config.auth_rate_limit_per_minute));
    start_rate_limit_cleanup_task(limiter.clone(), LIMITER_CLEANUP_INTERVAL);

    let mailer = FileMailer::new(&config.email_file_path, &config.default_from_email);
    log::info!("Outgoing mail is written to {}", mailer.dir().display());

    let bind_to = (config.server_address.clone(), config.server_port);
    log::info!("Listening on {}:{}", bind_to.0, bind_to.1);

    let state = web::Data::new(config);
    let pool = web::Data::new(pool);
    let limiter = web::Data::from(limiter);
    let mailer = web::Data::new(mailer);

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(state.clone())
            .app_data(limiter.clone())
            .app_data(mailer.clone())
            .wrap(NormalizePath::new(TrailingSlash::Always))
            .wrap(Logger::default())
            .wrap(Compress::default())
            .configure(handlers::health_config)
            .configure(handlers::api_config)
    })
    .bind(bind_to)?
    .run()
    .await
}
