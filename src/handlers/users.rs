// src/handlers/users.rs
// DOCUMENTATION: HTTP handlers for user administration and the own profile
// PURPOSE: /users/ is admin-only; /users/me/ lets any account read and edit itself

use super::support::{method_not_allowed, request_url};
use crate::auth::{AuthUser, OptionalUser, Permission};
use crate::config::Config;
use crate::errors::YamdbError;
use crate::models::{CreateUserRequest, PageRequest, UpdateUserRequest, UserQuery};
use crate::services::UserService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;

const PERMISSION: Permission = Permission::IsAdmin;

/// GET /users/
pub async fn list_users(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: OptionalUser,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let page = PageRequest::new(query.page, config.page_size)?;
    let users = UserService::list_users(
        pool.get_ref(),
        query.search.as_deref(),
        page,
        &request_url(&req),
    )
    .await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /users/
pub async fn create_user(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    body: web::Json<CreateUserRequest>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let created = UserService::create_user(pool.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// GET /users/{username}/
pub async fn get_user(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    path: web::Path<String>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let found = UserService::get_user(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// PATCH /users/{username}/
pub async fn update_user(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let updated =
        UserService::update_user(pool.get_ref(), &path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /users/{username}/
pub async fn delete_user(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    path: web::Path<String>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    UserService::delete_user(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /users/me/
pub async fn get_me(user: AuthUser) -> Result<impl Responder, YamdbError> {
    Ok(HttpResponse::Ok().json(user.0.to_response()))
}

/// PATCH /users/me/
pub async fn update_me(
    pool: web::Data<PgPool>,
    user: AuthUser,
    body: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, YamdbError> {
    let updated = UserService::update_me(pool.get_ref(), &user.0, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Configuration for user routes
/// `/users/me/` is registered before `/users/{username}/`
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users/")
            .route(web::get().to(list_users))
            .route(web::post().to(create_user))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/users/me/")
            .route(web::get().to(get_me))
            .route(web::patch().to(update_me))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/users/{username}/")
            .route(web::get().to(get_user))
            .route(web::patch().to(update_user))
            .route(web::delete().to(delete_user))
            .default_service(web::to(method_not_allowed)),
    );
}
