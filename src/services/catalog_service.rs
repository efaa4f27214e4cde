// src/services/catalog_service.rs
// DOCUMENTATION: Business logic for categories, genres and titles
// PURPOSE: Resolve slug references and assemble nested title responses

use crate::db::{TaxonomyRepository, TitleFields, TitleRepository};
use crate::errors::YamdbError;
use crate::models::{
    CreateTaxonomyItemRequest, CreateTitleRequest, Page, PageRequest, Taxonomy,
    TaxonomyItem, TaxonomyItemResponse, TitleGenreRow, TitleQuery, TitleResponse, TitleRow,
    TitleWriteResponse, UpdateTitleRequest,
};
use sqlx::PgPool;
use std::collections::HashMap;
use validator::Validate;

/// Group genre rows by title, preserving row order
fn group_genres(rows: Vec<TitleGenreRow>) -> HashMap<i64, Vec<TaxonomyItemResponse>> {
    let mut grouped: HashMap<i64, Vec<TaxonomyItemResponse>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.title_id)
            .or_default()
            .push(TaxonomyItemResponse {
                name: row.name,
                slug: row.slug,
            });
    }
    grouped
}

/// Attach genres to title rows
fn assemble(rows: Vec<TitleRow>, genres: Vec<TitleGenreRow>) -> Vec<TitleResponse> {
    let mut grouped = group_genres(genres);
    rows.into_iter()
        .map(|row| {
            let genre = grouped.remove(&row.id).unwrap_or_default();
            row.into_response(genre)
        })
        .collect()
}

pub struct CatalogService;

impl CatalogService {
    pub async fn list_items(
        pool: &PgPool,
        taxonomy: Taxonomy,
        search: Option<&str>,
        page: PageRequest,
        request_url: &str,
    ) -> Result<Page<TaxonomyItemResponse>, YamdbError> {
        let (items, total) = TaxonomyRepository::list(pool, taxonomy, search, page).await?;
        let page = Page::new(items, total, page, request_url)?;
        Ok(page.map(|item| item.to_response()))
    }

    pub async fn create_item(
        pool: &PgPool,
        taxonomy: Taxonomy,
        req: CreateTaxonomyItemRequest,
    ) -> Result<TaxonomyItemResponse, YamdbError> {
        req.validate()?;
        let item = TaxonomyRepository::create(pool, taxonomy, &req).await?;
        Ok(item.to_response())
    }

    pub async fn delete_item(
        pool: &PgPool,
        taxonomy: Taxonomy,
        slug: &str,
    ) -> Result<(), YamdbError> {
        TaxonomyRepository::delete_by_slug(pool, taxonomy, slug).await
    }

    pub async fn list_titles(
        pool: &PgPool,
        query: &TitleQuery,
        page: PageRequest,
        request_url: &str,
    ) -> Result<Page<TitleResponse>, YamdbError> {
        let (rows, total) = TitleRepository::list(pool, query, page).await?;
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let genres = TitleRepository::genres_for(pool, &ids).await?;
        Page::new(assemble(rows, genres), total, page, request_url)
    }

    pub async fn get_title(pool: &PgPool, id: i64) -> Result<TitleResponse, YamdbError> {
        let row = TitleRepository::get_row(pool, id).await?;
        let genres = TitleRepository::genres_for(pool, &[id]).await?;
        assemble(vec![row], genres)
            .pop()
            .ok_or_else(|| YamdbError::NotFound(format!("Title {}", id)))
    }

    pub async fn create_title(
        pool: &PgPool,
        req: CreateTitleRequest,
    ) -> Result<TitleWriteResponse, YamdbError> {
        req.check()?;

        let category = Self::resolve_category(pool, &req.category).await?;
        let genres = TaxonomyRepository::resolve_slugs(pool, Taxonomy::Genre, &req.genre).await?;
        let genre_ids: Vec<i64> = genres.iter().map(|g| g.id).collect();

        let fields = TitleFields {
            name: &req.name,
            year: req.year,
            description: req.description.as_deref(),
            category_id: category.id,
        };
        let id = TitleRepository::create(pool, &fields, &genre_ids).await?;

        Ok(TitleWriteResponse {
            id,
            name: req.name,
            year: req.year,
            description: req.description,
            genre: genres.into_iter().map(|g| g.slug).collect(),
            category: category.slug,
        })
    }

    /// Partial update; genres are replaced only when the field is present
    pub async fn update_title(
        pool: &PgPool,
        id: i64,
        req: UpdateTitleRequest,
    ) -> Result<TitleWriteResponse, YamdbError> {
        req.check()?;

        let current = TitleRepository::get_row(pool, id).await?;

        let category_slug = req.category.as_deref().unwrap_or(&current.category_slug);
        let category = Self::resolve_category(pool, category_slug).await?;

        let new_genres = match &req.genre {
            Some(slugs) => {
                Some(TaxonomyRepository::resolve_slugs(pool, Taxonomy::Genre, slugs).await?)
            }
            None => None,
        };
        let new_genre_ids: Option<Vec<i64>> = new_genres
            .as_ref()
            .map(|genres| genres.iter().map(|g| g.id).collect());

        let name = req.name.unwrap_or(current.name);
        let year = req.year.unwrap_or(current.year);
        let description = match req.description {
            Some(description) => description,
            None => current.description,
        };

        let fields = TitleFields {
            name: &name,
            year,
            description: description.as_deref(),
            category_id: category.id,
        };
        TitleRepository::update(pool, id, &fields, new_genre_ids.as_deref()).await?;

        let genre = match new_genres {
            Some(genres) => genres.into_iter().map(|g| g.slug).collect(),
            None => TitleRepository::genres_for(pool, &[id])
                .await?
                .into_iter()
                .map(|g| g.slug)
                .collect(),
        };

        Ok(TitleWriteResponse {
            id,
            name,
            year,
            description,
            genre,
            category: category.slug,
        })
    }

    pub async fn delete_title(pool: &PgPool, id: i64) -> Result<(), YamdbError> {
        TitleRepository::delete(pool, id).await
    }

    async fn resolve_category(
        pool: &PgPool,
        slug: &str,
    ) -> Result<TaxonomyItem, YamdbError> {
        TaxonomyRepository::find_by_slug(pool, Taxonomy::Category, slug)
            .await?
            .ok_or_else(|| {
                YamdbError::ValidationError(format!(
                    "category: category with slug '{}' does not exist",
                    slug
                ))
            })
    }
}
