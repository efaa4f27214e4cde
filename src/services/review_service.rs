// src/services/review_service.rs
// DOCUMENTATION: Business logic for reviews and comments
// PURPOSE: Scope reviews to titles and comments to reviews, enforce authorship rules

use crate::auth::Permission;
use crate::db::{CommentRepository, ReviewRepository, TitleRepository};
use crate::errors::YamdbError;
use crate::models::{
    CommentRequest, CommentResponse, CreateReviewRequest, Page, PageRequest, Review,
    ReviewResponse, UpdateCommentRequest, UpdateReviewRequest, User,
};
use actix_web::http::Method;
use sqlx::PgPool;
use validator::Validate;

/// Object rule shared by reviews and comments
const OBJECT_PERMISSION: Permission = Permission::IsAuthorOrStaffOrReadOnly;

pub struct ReviewService;

impl ReviewService {
    pub async fn list_reviews(
        pool: &PgPool,
        title_id: i64,
        page: PageRequest,
        request_url: &str,
    ) -> Result<Page<ReviewResponse>, YamdbError> {
        TitleRepository::get(pool, title_id).await?;
        let (reviews, total) = ReviewRepository::get_reviews_by_title(pool, title_id, page).await?;
        let page = Page::new(reviews, total, page, request_url)?;
        Ok(page.map(|r| r.to_response()))
    }

    pub async fn get_review(
        pool: &PgPool,
        title_id: i64,
        review_id: i64,
    ) -> Result<ReviewResponse, YamdbError> {
        let review = ReviewRepository::get_review(pool, title_id, review_id).await?;
        Ok(review.to_response())
    }

    /// One review per author and title
    pub async fn create_review(
        pool: &PgPool,
        author: &User,
        title_id: i64,
        req: CreateReviewRequest,
    ) -> Result<ReviewResponse, YamdbError> {
        req.validate()?;
        TitleRepository::get(pool, title_id).await?;

        if ReviewRepository::exists_for_author(pool, title_id, author.id).await? {
            log::warn!(
                "User {} already reviewed title {}",
                author.username,
                title_id
            );
            return Err(YamdbError::ValidationError(
                "You have already reviewed this title".to_string(),
            ));
        }

        let review = ReviewRepository::create_review(pool, title_id, author.id, &req).await?;
        Ok(review.to_response())
    }

    pub async fn update_review(
        pool: &PgPool,
        method: &Method,
        user: &User,
        title_id: i64,
        review_id: i64,
        req: UpdateReviewRequest,
    ) -> Result<ReviewResponse, YamdbError> {
        let review = ReviewRepository::get_review(pool, title_id, review_id).await?;
        OBJECT_PERMISSION.check_object(method, Some(user), review.author_id)?;
        req.validate()?;

        let updated = ReviewRepository::update_review(pool, title_id, review_id, &req).await?;
        Ok(updated.to_response())
    }

    pub async fn delete_review(
        pool: &PgPool,
        method: &Method,
        user: &User,
        title_id: i64,
        review_id: i64,
    ) -> Result<(), YamdbError> {
        let review = ReviewRepository::get_review(pool, title_id, review_id).await?;
        OBJECT_PERMISSION.check_object(method, Some(user), review.author_id)?;
        ReviewRepository::delete_review(pool, review.id).await
    }

    pub async fn list_comments(
        pool: &PgPool,
        title_id: i64,
        review_id: i64,
        page: PageRequest,
        request_url: &str,
    ) -> Result<Page<CommentResponse>, YamdbError> {
        let review = Self::review_of_title(pool, title_id, review_id).await?;
        let (comments, total) =
            CommentRepository::get_comments_by_review(pool, review.id, page).await?;
        let page = Page::new(comments, total, page, request_url)?;
        Ok(page.map(|c| c.to_response()))
    }

    pub async fn get_comment(
        pool: &PgPool,
        title_id: i64,
        review_id: i64,
        comment_id: i64,
    ) -> Result<CommentResponse, YamdbError> {
        let review = Self::review_of_title(pool, title_id, review_id).await?;
        let comment = CommentRepository::get_comment(pool, review.id, comment_id).await?;
        Ok(comment.to_response())
    }

    pub async fn create_comment(
        pool: &PgPool,
        author: &User,
        title_id: i64,
        review_id: i64,
        req: CommentRequest,
    ) -> Result<CommentResponse, YamdbError> {
        req.validate()?;
        let review = Self::review_of_title(pool, title_id, review_id).await?;
        let comment = CommentRepository::create_comment(pool, review.id, author.id, &req).await?;
        Ok(comment.to_response())
    }

    pub async fn update_comment(
        pool: &PgPool,
        method: &Method,
        user: &User,
        title_id: i64,
        review_id: i64,
        comment_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<CommentResponse, YamdbError> {
        let review = Self::review_of_title(pool, title_id, review_id).await?;
        let comment = CommentRepository::get_comment(pool, review.id, comment_id).await?;
        OBJECT_PERMISSION.check_object(method, Some(user), comment.author_id)?;
        req.validate()?;

        let updated = CommentRepository::update_comment(pool, review.id, comment_id, &req).await?;
        Ok(updated.to_response())
    }

    pub async fn delete_comment(
        pool: &PgPool,
        method: &Method,
        user: &User,
        title_id: i64,
        review_id: i64,
        comment_id: i64,
    ) -> Result<(), YamdbError> {
        let review = Self::review_of_title(pool, title_id, review_id).await?;
        let comment = CommentRepository::get_comment(pool, review.id, comment_id).await?;
        OBJECT_PERMISSION.check_object(method, Some(user), comment.author_id)?;
        CommentRepository::delete_comment(pool, comment.id).await
    }

    /// Review lookup that 404s when the title is missing or the review belongs elsewhere
    async fn review_of_title(
        pool: &PgPool,
        title_id: i64,
        review_id: i64,
    ) -> Result<Review, YamdbError> {
        TitleRepository::get(pool, title_id).await?;
        ReviewRepository::get_review(pool, title_id, review_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            first_name: String::new(),
            last_name: String::new(),
            bio: None,
            role,
            is_staff: false,
            confirmation_code: None,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_object_rule_for_reviews_and_comments() {
        let author = user(1, Role::User);
        let stranger = user(2, Role::User);
        let moderator = user(3, Role::Moderator);

        assert!(OBJECT_PERMISSION
            .check_object(&Method::PATCH, Some(&author), author.id)
            .is_ok());
        assert!(matches!(
            OBJECT_PERMISSION.check_object(&Method::DELETE, Some(&stranger), author.id),
            Err(YamdbError::Forbidden)
        ));
        assert!(OBJECT_PERMISSION
            .check_object(&Method::DELETE, Some(&moderator), author.id)
            .is_ok());
    }

    #[tokio::test]
    async fn test_invalid_review_rejected_before_db() {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let req = CreateReviewRequest {
            text: "Too generous".into(),
            score: 11,
        };

        let result = ReviewService::create_review(&pool, &user(1, Role::User), 1, req).await;
        assert!(matches!(result, Err(YamdbError::ValidationError(_))));
    }
}
