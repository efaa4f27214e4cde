// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components and assemble the /api tree

pub mod auth;
pub mod categories;
pub mod health;
pub mod reviews;
pub mod schema;
pub mod support;
pub mod titles;
pub mod users;

pub use health::config as health_config;

use actix_web::web;

/// Everything under /api: versioned resources plus the schema document
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(support::json_config())
            .app_data(support::path_config())
            .app_data(support::query_config())
            .service(
                web::scope("/v1")
                    .configure(auth::config)
                    .configure(categories::config)
                    .configure(titles::config)
                    .configure(reviews::config)
                    .configure(users::config),
            )
            .configure(schema::config),
    );
}
