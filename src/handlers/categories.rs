// src/handlers/categories.rs
// DOCUMENTATION: HTTP handlers for categories and genres
// PURPOSE: One set of handlers serving both dictionaries, selected per scope

use super::support::{method_not_allowed, request_url};
use crate::auth::{OptionalUser, Permission};
use crate::config::Config;
use crate::errors::YamdbError;
use crate::models::{CreateTaxonomyItemRequest, PageRequest, Taxonomy, TaxonomyQuery};
use crate::services::CatalogService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;

const PERMISSION: Permission = Permission::IsAdminOrReadOnly;

/// GET /categories/ and /genres/
pub async fn list_items(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    taxonomy: web::Data<Taxonomy>,
    user: OptionalUser,
    query: web::Query<TaxonomyQuery>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let page = PageRequest::new(query.page, config.page_size)?;
    let items = CatalogService::list_items(
        pool.get_ref(),
        **taxonomy,
        query.search.as_deref(),
        page,
        &request_url(&req),
    )
    .await?;
    Ok(HttpResponse::Ok().json(items))
}

/// POST /categories/ and /genres/
pub async fn create_item(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    taxonomy: web::Data<Taxonomy>,
    user: OptionalUser,
    body: web::Json<CreateTaxonomyItemRequest>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let item = CatalogService::create_item(pool.get_ref(), **taxonomy, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

/// DELETE /categories/{slug}/ and /genres/{slug}/
pub async fn delete_item(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    taxonomy: web::Data<Taxonomy>,
    user: OptionalUser,
    path: web::Path<String>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    CatalogService::delete_item(pool.get_ref(), **taxonomy, &path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn taxonomy_scope(prefix: &str, taxonomy: Taxonomy) -> actix_web::Scope {
    web::scope(prefix)
        .app_data(web::Data::new(taxonomy))
        .service(
            web::resource("/")
                .route(web::get().to(list_items))
                .route(web::post().to(create_item))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/{slug}/")
                .route(web::delete().to(delete_item))
                .default_service(web::to(method_not_allowed)),
        )
}

/// Configuration for category and genre routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(taxonomy_scope("/categories", Taxonomy::Category))
        .service(taxonomy_scope("/genres", Taxonomy::Genre));
}
