// src/db/comment_repository.rs
// DOCUMENTATION: Comment database operations
// PURPOSE: Handle CRUD operations for comments on reviews

use crate::errors::YamdbError;
use crate::models::{Comment, CommentRequest, PageRequest, UpdateCommentRequest};
use sqlx::PgPool;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.review_id, c.author_id, u.username AS author,
           c.text, c.pub_date
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

pub struct CommentRepository;

impl CommentRepository {
    pub async fn create_comment(
        pool: &PgPool,
        review_id: i64,
        author_id: i64,
        req: &CommentRequest,
    ) -> Result<Comment, YamdbError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO comments (review_id, author_id, text) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(review_id)
        .bind(author_id)
        .bind(&req.text)
        .fetch_one(pool)
        .await
        .map_err(|e| YamdbError::from_db("Create comment failed", e))?;

        log::info!("Created comment {} on review {}", id, review_id);
        Self::get_comment(pool, review_id, id).await
    }

    /// Get one comment of a review, 404 when absent or attached to another review
    pub async fn get_comment(
        pool: &PgPool,
        review_id: i64,
        comment_id: i64,
    ) -> Result<Comment, YamdbError> {
        let sql = format!("{} WHERE c.id = $1 AND c.review_id = $2", COMMENT_SELECT);

        sqlx::query_as::<_, Comment>(&sql)
            .bind(comment_id)
            .bind(review_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| YamdbError::from_db("Fetch comment failed", e))?
            .ok_or_else(|| {
                log::warn!("Comment {} not found on review {}", comment_id, review_id);
                YamdbError::NotFound(format!("Comment {}", comment_id))
            })
    }

    /// Comments of a review, newest first
    pub async fn get_comments_by_review(
        pool: &PgPool,
        review_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Comment>, i64), YamdbError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE review_id = $1")
                .bind(review_id)
                .fetch_one(pool)
                .await
                .map_err(|e| YamdbError::from_db("Count comments failed", e))?;

        let sql = format!(
            "{} WHERE c.review_id = $1 ORDER BY c.pub_date DESC, c.id DESC LIMIT $2 OFFSET $3",
            COMMENT_SELECT
        );

        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(review_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| YamdbError::from_db("Fetch comments failed", e))?;

        Ok((comments, total))
    }

    pub async fn update_comment(
        pool: &PgPool,
        review_id: i64,
        comment_id: i64,
        req: &UpdateCommentRequest,
    ) -> Result<Comment, YamdbError> {
        sqlx::query("UPDATE comments SET text = COALESCE($1, text) WHERE id = $2 AND review_id = $3")
            .bind(&req.text)
            .bind(comment_id)
            .bind(review_id)
            .execute(pool)
            .await
            .map_err(|e| YamdbError::from_db("Update comment failed", e))?;

        log::info!("Updated comment: {}", comment_id);
        Self::get_comment(pool, review_id, comment_id).await
    }

    pub async fn delete_comment(pool: &PgPool, comment_id: i64) -> Result<(), YamdbError> {
        let rows = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(pool)
            .await
            .map_err(|e| YamdbError::from_db("Delete comment failed", e))?
            .rows_affected();

        if rows == 0 {
            return Err(YamdbError::NotFound(format!("Comment {}", comment_id)));
        }

        log::info!("Deleted comment: {}", comment_id);
        Ok(())
    }
}
