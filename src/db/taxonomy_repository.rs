// src/db/taxonomy_repository.rs
// DOCUMENTATION: Category and genre database operations
// PURPOSE: One implementation for both dictionaries, keyed by Taxonomy

use super::escape_like;
use crate::errors::YamdbError;
use crate::models::{CreateTaxonomyItemRequest, PageRequest, Taxonomy, TaxonomyItem};
use sqlx::PgPool;

pub struct TaxonomyRepository;

impl TaxonomyRepository {
    pub async fn create(
        pool: &PgPool,
        taxonomy: Taxonomy,
        req: &CreateTaxonomyItemRequest,
    ) -> Result<TaxonomyItem, YamdbError> {
        let sql = format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
            taxonomy.table()
        );

        let item = sqlx::query_as::<_, TaxonomyItem>(&sql)
            .bind(&req.name)
            .bind(&req.slug)
            .fetch_one(pool)
            .await
            .map_err(|e| YamdbError::from_db(&format!("Create {} failed", taxonomy.label()), e))?;

        log::info!("Created {} '{}'", taxonomy.label(), item.slug);
        Ok(item)
    }

    pub async fn find_by_slug(
        pool: &PgPool,
        taxonomy: Taxonomy,
        slug: &str,
    ) -> Result<Option<TaxonomyItem>, YamdbError> {
        let sql = format!(
            "SELECT id, name, slug FROM {} WHERE slug = $1",
            taxonomy.table()
        );

        sqlx::query_as::<_, TaxonomyItem>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(|e| YamdbError::from_db(&format!("Fetch {} failed", taxonomy.label()), e))
    }

    /// Resolve slugs to rows, failing on the first unknown slug
    /// DOCUMENTATION: Used when a title references its category and genres
    pub async fn resolve_slugs(
        pool: &PgPool,
        taxonomy: Taxonomy,
        slugs: &[String],
    ) -> Result<Vec<TaxonomyItem>, YamdbError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, name, slug FROM {} WHERE slug = ANY($1)",
            taxonomy.table()
        );

        let found = sqlx::query_as::<_, TaxonomyItem>(&sql)
            .bind(slugs)
            .fetch_all(pool)
            .await
            .map_err(|e| YamdbError::from_db(&format!("Resolve {} failed", taxonomy.label()), e))?;

        let mut resolved = Vec::with_capacity(slugs.len());
        for slug in slugs {
            match found.iter().find(|item| &item.slug == slug) {
                Some(item) => {
                    if !resolved.iter().any(|r: &TaxonomyItem| r.id == item.id) {
                        resolved.push(item.clone());
                    }
                }
                None => {
                    return Err(YamdbError::ValidationError(format!(
                        "{} with slug '{}' does not exist",
                        taxonomy.label(),
                        slug
                    )))
                }
            }
        }

        Ok(resolved)
    }

    pub async fn delete_by_slug(
        pool: &PgPool,
        taxonomy: Taxonomy,
        slug: &str,
    ) -> Result<(), YamdbError> {
        let sql = format!("DELETE FROM {} WHERE slug = $1", taxonomy.table());
        let rows = sqlx::query(&sql)
            .bind(slug)
            .execute(pool)
            .await
            .map_err(|e| YamdbError::from_db(&format!("Delete {} failed", taxonomy.label()), e))?
            .rows_affected();

        if rows == 0 {
            log::warn!("{} not found: {}", taxonomy.label(), slug);
            return Err(YamdbError::NotFound(format!(
                "{} '{}'",
                taxonomy.label(),
                slug
            )));
        }

        log::info!("Deleted {} '{}'", taxonomy.label(), slug);
        Ok(())
    }

    /// List items ordered by name, optionally filtered by a name substring
    /// Returns tuple: (results, total_count) for pagination
    pub async fn list(
        pool: &PgPool,
        taxonomy: Taxonomy,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<TaxonomyItem>, i64), YamdbError> {
        let pattern = search.map(|s| format!("%{}%", escape_like(s)));

        let count_sql = format!(
            "SELECT COUNT(*) FROM {} WHERE ($1::text IS NULL OR name ILIKE $1)",
            taxonomy.table()
        );
        let (total,): (i64,) = sqlx::query_as(&count_sql)
            .bind(&pattern)
            .fetch_one(pool)
            .await
            .map_err(|e| YamdbError::from_db(&format!("Count {} failed", taxonomy.label()), e))?;

        let sql = format!(
            r#"
            SELECT id, name, slug FROM {}
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY name, id
            LIMIT $2 OFFSET $3
            "#,
            taxonomy.table()
        );

        let items = sqlx::query_as::<_, TaxonomyItem>(&sql)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| YamdbError::from_db(&format!("List {} failed", taxonomy.label()), e))?;

        Ok((items, total))
    }
}
