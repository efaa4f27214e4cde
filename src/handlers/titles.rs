// src/handlers/titles.rs
// DOCUMENTATION: HTTP handlers for titles
// PURPOSE: Filtered listing for everyone, writes for administrators

use super::support::{method_not_allowed, request_url};
use crate::auth::{OptionalUser, Permission};
use crate::config::Config;
use crate::errors::YamdbError;
use crate::models::{CreateTitleRequest, PageRequest, TitleQuery, UpdateTitleRequest};
use crate::services::CatalogService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;

const PERMISSION: Permission = Permission::IsAdminOrReadOnly;

/// GET /titles/
/// Filters: category, genre (slugs), name (substring), year
pub async fn list_titles(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: OptionalUser,
    query: web::Query<TitleQuery>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let page = PageRequest::new(query.page, config.page_size)?;
    let titles =
        CatalogService::list_titles(pool.get_ref(), &query, page, &request_url(&req)).await?;
    Ok(HttpResponse::Ok().json(titles))
}

/// POST /titles/
pub async fn create_title(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    body: web::Json<CreateTitleRequest>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let title = CatalogService::create_title(pool.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(title))
}

/// GET /titles/{id}/
pub async fn get_title(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    path: web::Path<i64>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let title = CatalogService::get_title(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(title))
}

/// PATCH /titles/{id}/
pub async fn update_title(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    path: web::Path<i64>,
    body: web::Json<UpdateTitleRequest>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let title =
        CatalogService::update_title(pool.get_ref(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(title))
}

/// DELETE /titles/{id}/
pub async fn delete_title(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    path: web::Path<i64>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    CatalogService::delete_title(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for title routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/titles/")
            .route(web::get().to(list_titles))
            .route(web::post().to(create_title))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/titles/{id}/")
            .route(web::get().to(get_title))
            .route(web::patch().to(update_title))
            .route(web::delete().to(delete_title))
            .default_service(web::to(method_not_allowed)),
    );
}
