// src/handlers/auth.rs
// DOCUMENTATION: HTTP handlers for signup and token exchange
// PURPOSE: Rate-limited entry points that issue confirmation codes and access tokens

use super::support::client_ip;
use crate::config::Config;
use crate::errors::YamdbError;
use crate::models::{SignUpRequest, TokenRequest};
use crate::services::{AuthRateLimiter, FileMailer, UserService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;

fn throttle(
    req: &HttpRequest,
    config: &Config,
    limiter: &AuthRateLimiter,
) -> Result<(), YamdbError> {
    match client_ip(req, &config.trusted_proxies) {
        Some(ip) => limiter.check(ip),
        None => Ok(()),
    }
}

/// POST /auth/signup/
/// Register or re-send a confirmation code
pub async fn signup(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    mailer: web::Data<FileMailer>,
    limiter: web::Data<AuthRateLimiter>,
    body: web::Json<SignUpRequest>,
) -> Result<impl Responder, YamdbError> {
    throttle(&req, &config, &limiter)?;
    let registered = UserService::signup(pool.get_ref(), &mailer, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(registered))
}

/// POST /auth/token/
/// Exchange a confirmation code for a JWT
pub async fn token(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    limiter: web::Data<AuthRateLimiter>,
    body: web::Json<TokenRequest>,
) -> Result<impl Responder, YamdbError> {
    throttle(&req, &config, &limiter)?;
    let token = UserService::obtain_token(pool.get_ref(), &config, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// Configuration for auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/signup/").route(web::post().to(signup)))
        .service(web::resource("/auth/token/").route(web::post().to(token)));
}
