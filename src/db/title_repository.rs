// src/db/title_repository.rs
// DOCUMENTATION: Title database operations
// PURPOSE: Titles with their genre links, rating aggregation and list filters

use super::escape_like;
use crate::errors::YamdbError;
use crate::models::{PageRequest, Title, TitleGenreRow, TitleQuery, TitleRow};
use sqlx::{PgPool, Postgres, Transaction};

/// SELECT list shared by detail and list queries
/// Rating is the integer part of the average score, NULL without reviews
const TITLE_ROW_SELECT: &str = r#"
    SELECT
        t.id, t.name, t.year, t.description,
        TRUNC(AVG(r.score))::INTEGER AS rating,
        c.name AS category_name, c.slug AS category_slug
    FROM titles t
    JOIN categories c ON c.id = t.category_id
    LEFT JOIN reviews r ON r.title_id = t.id
"#;

/// Filter clause over $1 category slug, $2 genre slug, $3 name pattern, $4 year
const TITLE_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR c.slug = $1)
      AND ($2::text IS NULL OR EXISTS (
            SELECT 1 FROM genre_title gt
            JOIN genres g ON g.id = gt.genre_id
            WHERE gt.title_id = t.id AND g.slug = $2))
      AND ($3::text IS NULL OR t.name ILIKE $3)
      AND ($4::integer IS NULL OR t.year = $4)
"#;

/// Column values for an insert or a full overwrite
#[derive(Debug, Clone)]
pub struct TitleFields<'a> {
    pub name: &'a str,
    pub year: i32,
    pub description: Option<&'a str>,
    pub category_id: i64,
}

pub struct TitleRepository;

impl TitleRepository {
    /// Plain title record, 404 when absent
    pub async fn get(pool: &PgPool, id: i64) -> Result<Title, YamdbError> {
        sqlx::query_as::<_, Title>(
            "SELECT id, name, year, description, category_id FROM titles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| YamdbError::from_db("Fetch title failed", e))?
        .ok_or_else(|| {
            log::warn!("Title not found: {}", id);
            YamdbError::NotFound(format!("Title {}", id))
        })
    }

    /// Title with category and rating, 404 when absent
    pub async fn get_row(pool: &PgPool, id: i64) -> Result<TitleRow, YamdbError> {
        let sql = format!(
            "{} WHERE t.id = $1 GROUP BY t.id, c.id",
            TITLE_ROW_SELECT
        );

        sqlx::query_as::<_, TitleRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| YamdbError::from_db("Fetch title failed", e))?
            .ok_or_else(|| {
                log::warn!("Title not found: {}", id);
                YamdbError::NotFound(format!("Title {}", id))
            })
    }

    /// Filtered, paginated list ordered by year (newest first)
    /// Returns tuple: (results, total_count) for pagination
    pub async fn list(
        pool: &PgPool,
        query: &TitleQuery,
        page: PageRequest,
    ) -> Result<(Vec<TitleRow>, i64), YamdbError> {
        let name_pattern = query.name.as_deref().map(|n| format!("%{}%", escape_like(n)));

        let count_sql = format!(
            "SELECT COUNT(*) FROM titles t JOIN categories c ON c.id = t.category_id {}",
            TITLE_FILTER
        );
        let (total,): (i64,) = sqlx::query_as(&count_sql)
            .bind(&query.category)
            .bind(&query.genre)
            .bind(&name_pattern)
            .bind(query.year)
            .fetch_one(pool)
            .await
            .map_err(|e| YamdbError::from_db("Count titles failed", e))?;

        let sql = format!(
            "{} {} GROUP BY t.id, c.id ORDER BY t.year DESC, t.id LIMIT $5 OFFSET $6",
            TITLE_ROW_SELECT, TITLE_FILTER
        );
        log::debug!("Executing title list query: {}", sql);

        let rows = sqlx::query_as::<_, TitleRow>(&sql)
            .bind(&query.category)
            .bind(&query.genre)
            .bind(&name_pattern)
            .bind(query.year)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| YamdbError::from_db("List titles failed", e))?;

        Ok((rows, total))
    }

    /// Genres of a batch of titles, ordered by name
    pub async fn genres_for(
        pool: &PgPool,
        title_ids: &[i64],
    ) -> Result<Vec<TitleGenreRow>, YamdbError> {
        if title_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, TitleGenreRow>(
            r#"
            SELECT gt.title_id, g.name, g.slug
            FROM genre_title gt
            JOIN genres g ON g.id = gt.genre_id
            WHERE gt.title_id = ANY($1)
            ORDER BY g.name, g.id
            "#,
        )
        .bind(title_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| YamdbError::from_db("Fetch title genres failed", e))
    }

    /// Insert a title and its genre links in one transaction
    pub async fn create(
        pool: &PgPool,
        fields: &TitleFields<'_>,
        genre_ids: &[i64],
    ) -> Result<i64, YamdbError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| YamdbError::from_db("Begin transaction failed", e))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO titles (name, year, description, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(fields.name)
        .bind(fields.year)
        .bind(fields.description)
        .bind(fields.category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| YamdbError::from_db("Create title failed", e))?;

        Self::link_genres(&mut tx, id, genre_ids).await?;

        tx.commit()
            .await
            .map_err(|e| YamdbError::from_db("Commit title failed", e))?;

        log::info!("Created title with id: {}", id);
        Ok(id)
    }

    /// Overwrite columns and, when given, replace the genre links
    pub async fn update(
        pool: &PgPool,
        id: i64,
        fields: &TitleFields<'_>,
        genre_ids: Option<&[i64]>,
    ) -> Result<(), YamdbError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| YamdbError::from_db("Begin transaction failed", e))?;

        let rows = sqlx::query(
            r#"
            UPDATE titles
            SET name = $1, year = $2, description = $3, category_id = $4
            WHERE id = $5
            "#,
        )
        .bind(fields.name)
        .bind(fields.year)
        .bind(fields.description)
        .bind(fields.category_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| YamdbError::from_db("Update title failed", e))?
        .rows_affected();

        if rows == 0 {
            return Err(YamdbError::NotFound(format!("Title {}", id)));
        }

        if let Some(genre_ids) = genre_ids {
            sqlx::query("DELETE FROM genre_title WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| YamdbError::from_db("Unlink genres failed", e))?;

            Self::link_genres(&mut tx, id, genre_ids).await?;
        }

        tx.commit()
            .await
            .map_err(|e| YamdbError::from_db("Commit title failed", e))?;

        log::info!("Updated title: {}", id);
        Ok(())
    }

    /// Delete a title; reviews and comments go with it
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), YamdbError> {
        let rows = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| YamdbError::from_db("Delete title failed", e))?
            .rows_affected();

        if rows == 0 {
            return Err(YamdbError::NotFound(format!("Title {}", id)));
        }

        log::info!("Deleted title: {}", id);
        Ok(())
    }

    async fn link_genres(
        tx: &mut Transaction<'_, Postgres>,
        title_id: i64,
        genre_ids: &[i64],
    ) -> Result<(), YamdbError> {
        if genre_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO genre_title (genre_id, title_id)
            SELECT UNNEST($1::bigint[]), $2
            ON CONFLICT (genre_id, title_id) DO NOTHING
            "#,
        )
        .bind(genre_ids)
        .bind(title_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| YamdbError::from_db("Link genres failed", e))?;

        Ok(())
    }
}
