// src/handlers/reviews.rs
// DOCUMENTATION: HTTP handlers for reviews and their comments
// PURPOSE: Nested routes under a title; writes need authentication, edits need authorship or staff

use super::support::{method_not_allowed, request_url};
use crate::auth::{AuthUser, OptionalUser, Permission};
use crate::config::Config;
use crate::errors::YamdbError;
use crate::models::{
    CommentRequest, CreateReviewRequest, PageRequest, UpdateCommentRequest, UpdateReviewRequest,
};
use crate::services::ReviewService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::PgPool;

const PERMISSION: Permission = Permission::IsAuthorOrStaffOrReadOnly;

#[derive(Debug, Deserialize)]
pub struct PageParam {
    pub page: Option<i64>,
}

/// GET /titles/{title_id}/reviews/
pub async fn list_reviews(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: OptionalUser,
    path: web::Path<i64>,
    query: web::Query<PageParam>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let page = PageRequest::new(query.page, config.page_size)?;
    let reviews =
        ReviewService::list_reviews(pool.get_ref(), path.into_inner(), page, &request_url(&req))
            .await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /titles/{title_id}/reviews/
pub async fn create_review(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<CreateReviewRequest>,
) -> Result<impl Responder, YamdbError> {
    let review =
        ReviewService::create_review(pool.get_ref(), &user.0, path.into_inner(), body.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /titles/{title_id}/reviews/{review_id}/
pub async fn get_review(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let (title_id, review_id) = path.into_inner();
    let review = ReviewService::get_review(pool.get_ref(), title_id, review_id).await?;
    Ok(HttpResponse::Ok().json(review))
}

/// PATCH /titles/{title_id}/reviews/{review_id}/
pub async fn update_review(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<(i64, i64)>,
    body: web::Json<UpdateReviewRequest>,
) -> Result<impl Responder, YamdbError> {
    let (title_id, review_id) = path.into_inner();
    let review = ReviewService::update_review(
        pool.get_ref(),
        req.method(),
        &user.0,
        title_id,
        review_id,
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(review))
}

/// DELETE /titles/{title_id}/reviews/{review_id}/
pub async fn delete_review(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, YamdbError> {
    let (title_id, review_id) = path.into_inner();
    ReviewService::delete_review(pool.get_ref(), req.method(), &user.0, title_id, review_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /titles/{title_id}/reviews/{review_id}/comments/
pub async fn list_comments(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: OptionalUser,
    path: web::Path<(i64, i64)>,
    query: web::Query<PageParam>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let (title_id, review_id) = path.into_inner();
    let page = PageRequest::new(query.page, config.page_size)?;
    let comments = ReviewService::list_comments(
        pool.get_ref(),
        title_id,
        review_id,
        page,
        &request_url(&req),
    )
    .await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /titles/{title_id}/reviews/{review_id}/comments/
pub async fn create_comment(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<(i64, i64)>,
    body: web::Json<CommentRequest>,
) -> Result<impl Responder, YamdbError> {
    let (title_id, review_id) = path.into_inner();
    let comment = ReviewService::create_comment(
        pool.get_ref(),
        &user.0,
        title_id,
        review_id,
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /titles/{title_id}/reviews/{review_id}/comments/{comment_id}/
pub async fn get_comment(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: OptionalUser,
    path: web::Path<(i64, i64, i64)>,
) -> Result<impl Responder, YamdbError> {
    PERMISSION.check(req.method(), user.user())?;
    let (title_id, review_id, comment_id) = path.into_inner();
    let comment =
        ReviewService::get_comment(pool.get_ref(), title_id, review_id, comment_id).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// PATCH /titles/{title_id}/reviews/{review_id}/comments/{comment_id}/
pub async fn update_comment(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<impl Responder, YamdbError> {
    let (title_id, review_id, comment_id) = path.into_inner();
    let comment = ReviewService::update_comment(
        pool.get_ref(),
        req.method(),
        &user.0,
        title_id,
        review_id,
        comment_id,
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// DELETE /titles/{title_id}/reviews/{review_id}/comments/{comment_id}/
pub async fn delete_comment(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<(i64, i64, i64)>,
) -> Result<impl Responder, YamdbError> {
    let (title_id, review_id, comment_id) = path.into_inner();
    ReviewService::delete_comment(
        pool.get_ref(),
        req.method(),
        &user.0,
        title_id,
        review_id,
        comment_id,
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for review and comment routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/titles/{title_id}/reviews/")
            .route(web::get().to(list_reviews))
            .route(web::post().to(create_review))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/titles/{title_id}/reviews/{review_id}/")
            .route(web::get().to(get_review))
            .route(web::patch().to(update_review))
            .route(web::delete().to(delete_review))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/titles/{title_id}/reviews/{review_id}/comments/")
            .route(web::get().to(list_comments))
            .route(web::post().to(create_comment))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/")
            .route(web::get().to(get_comment))
            .route(web::patch().to(update_comment))
            .route(web::delete().to(delete_comment))
            .default_service(web::to(method_not_allowed)),
    );
}
