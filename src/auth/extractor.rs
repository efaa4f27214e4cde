// src/auth/extractor.rs
// DOCUMENTATION: Bearer token extractors for actix handlers
// PURPOSE: Resolve the Authorization header to a User loaded from the database

use crate::auth::jwt::validate_token;
use crate::config::Config;
use crate::db::UserRepository;
use crate::errors::YamdbError;
use crate::models::User;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;

/// The caller, if a bearer token was sent
/// A missing header yields `None`; a malformed or expired token is a 401
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl OptionalUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// An authenticated caller; anonymous requests are rejected with 401
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(req: &HttpRequest) -> Result<Option<String>, YamdbError> {
    let header = match req.headers().get("Authorization") {
        Some(value) => value,
        None => return Ok(None),
    };

    let value = header
        .to_str()
        .map_err(|_| YamdbError::Unauthorized("Invalid Authorization header".into()))?;

    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        YamdbError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
    })?;

    Ok(Some(token.trim().to_string()))
}

async fn resolve_user(
    token: Option<String>,
    pool: Option<web::Data<PgPool>>,
    config: Option<web::Data<Config>>,
) -> Result<Option<User>, YamdbError> {
    let token = match token {
        Some(token) => token,
        None => return Ok(None),
    };

    let (pool, config) = match (pool, config) {
        (Some(pool), Some(config)) => (pool, config),
        _ => {
            log::error!("Database pool or config missing from app data");
            return Err(YamdbError::InternalError("Application state not configured".into()));
        }
    };

    let claims = validate_token(&token, &config).map_err(|e| {
        log::warn!("Rejected bearer token: {}", e);
        YamdbError::Unauthorized("Invalid or expired token".into())
    })?;

    let user = UserRepository::find_by_id(pool.get_ref(), claims.user_id)
        .await?
        .ok_or_else(|| {
            log::warn!("Token for missing user {}", claims.user_id);
            YamdbError::Unauthorized("User not found".into())
        })?;

    Ok(Some(user))
}

impl FromRequest for OptionalUser {
    type Error = YamdbError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let pool = req.app_data::<web::Data<PgPool>>().cloned();
        let config = req.app_data::<web::Data<Config>>().cloned();

        Box::pin(async move {
            let user = resolve_user(token?, pool, config).await?;
            Ok(OptionalUser(user))
        })
    }
}

impl FromRequest for AuthUser {
    type Error = YamdbError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let optional = OptionalUser::from_request(req, payload);

        Box::pin(async move {
            match optional.await?.0 {
                Some(user) => Ok(AuthUser(user)),
                None => Err(YamdbError::Unauthorized(
                    "Authentication credentials were not provided".into(),
                )),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), Some("abc.def.ghi".to_string()));

        let anonymous = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&anonymous).unwrap(), None);

        let basic = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(matches!(
            bearer_token(&basic),
            Err(YamdbError::Unauthorized(_))
        ));
    }

    #[actix_rt::test]
    async fn test_anonymous_request_yields_no_user() {
        let (req, mut payload) = TestRequest::default().to_http_parts();
        let user = OptionalUser::from_request(&req, &mut payload).await.unwrap();
        assert!(user.0.is_none());
    }

    #[actix_rt::test]
    async fn test_auth_user_requires_credentials() {
        let (req, mut payload) = TestRequest::default().to_http_parts();
        let result = AuthUser::from_request(&req, &mut payload).await;
        assert!(matches!(result, Err(YamdbError::Unauthorized(_))));
    }

    #[actix_rt::test]
    async fn test_garbage_token_rejected_before_database() {
        let (req, mut payload) = TestRequest::default()
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .app_data(web::Data::new(Config::for_tests()))
            .app_data(web::Data::new(
                PgPool::connect_lazy("postgresql://localhost/unused").unwrap(),
            ))
            .to_http_parts();

        let result = OptionalUser::from_request(&req, &mut payload).await;
        assert!(matches!(result, Err(YamdbError::Unauthorized(_))));
    }
}
