// src/db/review_repository.rs
// DOCUMENTATION: Review database operations
// PURPOSE: Handle CRUD operations for title reviews

use crate::errors::YamdbError;
use crate::models::{CreateReviewRequest, PageRequest, Review, UpdateReviewRequest};
use sqlx::PgPool;

const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.title_id, r.author_id, u.username AS author,
           r.text, r.score, r.pub_date
    FROM reviews r
    JOIN users u ON u.id = r.author_id
"#;

pub struct ReviewRepository;

impl ReviewRepository {
    /// Create a new review
    /// DOCUMENTATION: The (author, title) unique constraint rejects a second review
    pub async fn create_review(
        pool: &PgPool,
        title_id: i64,
        author_id: i64,
        req: &CreateReviewRequest,
    ) -> Result<Review, YamdbError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO reviews (title_id, author_id, text, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(title_id)
        .bind(author_id)
        .bind(&req.text)
        .bind(req.score)
        .fetch_one(pool)
        .await
        .map_err(|e| YamdbError::from_db("Create review failed", e))?;

        log::info!("Created review {} on title {}", id, title_id);
        Self::get_review(pool, title_id, id).await
    }

    pub async fn exists_for_author(
        pool: &PgPool,
        title_id: i64,
        author_id: i64,
    ) -> Result<bool, YamdbError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(title_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .map_err(|e| YamdbError::from_db("Review lookup failed", e))?;

        Ok(exists)
    }

    /// Get one review of a title, 404 when absent or attached to another title
    pub async fn get_review(
        pool: &PgPool,
        title_id: i64,
        review_id: i64,
    ) -> Result<Review, YamdbError> {
        let sql = format!("{} WHERE r.id = $1 AND r.title_id = $2", REVIEW_SELECT);

        sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .bind(title_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| YamdbError::from_db("Fetch review failed", e))?
            .ok_or_else(|| {
                log::warn!("Review {} not found on title {}", review_id, title_id);
                YamdbError::NotFound(format!("Review {}", review_id))
            })
    }

    /// Get reviews for a title, newest first
    /// Returns tuple: (results, total_count) for pagination
    pub async fn get_reviews_by_title(
        pool: &PgPool,
        title_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Review>, i64), YamdbError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(pool)
            .await
            .map_err(|e| YamdbError::from_db("Count reviews failed", e))?;

        let sql = format!(
            "{} WHERE r.title_id = $1 ORDER BY r.pub_date DESC, r.id DESC LIMIT $2 OFFSET $3",
            REVIEW_SELECT
        );

        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(title_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch reviews for title {}: {}", title_id, e);
                YamdbError::DatabaseError(format!("Fetch reviews failed: {}", e))
            })?;

        Ok((reviews, total))
    }

    /// Partial update - only provided fields are modified
    pub async fn update_review(
        pool: &PgPool,
        title_id: i64,
        review_id: i64,
        req: &UpdateReviewRequest,
    ) -> Result<Review, YamdbError> {
        sqlx::query(
            r#"
            UPDATE reviews
            SET text = COALESCE($1, text),
                score = COALESCE($2, score)
            WHERE id = $3 AND title_id = $4
            "#,
        )
        .bind(&req.text)
        .bind(req.score)
        .bind(review_id)
        .bind(title_id)
        .execute(pool)
        .await
        .map_err(|e| YamdbError::from_db("Update review failed", e))?;

        log::info!("Updated review: {}", review_id);
        Self::get_review(pool, title_id, review_id).await
    }

    pub async fn delete_review(pool: &PgPool, review_id: i64) -> Result<(), YamdbError> {
        let rows = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(pool)
            .await
            .map_err(|e| YamdbError::from_db("Delete review failed", e))?
            .rows_affected();

        if rows == 0 {
            return Err(YamdbError::NotFound(format!("Review {}", review_id)));
        }

        log::info!("Deleted review: {}", review_id);
        Ok(())
    }
}
