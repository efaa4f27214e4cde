// src/models/category.rs
// DOCUMENTATION: Categories and genres
// PURPOSE: Both are flat (name, slug) dictionaries stored in separate tables

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Which dictionary a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taxonomy {
    Category,
    Genre,
}

impl Taxonomy {
    pub fn table(&self) -> &'static str {
        match self {
            Taxonomy::Category => "categories",
            Taxonomy::Genre => "genres",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Taxonomy::Category => "Category",
            Taxonomy::Genre => "Genre",
        }
    }
}

/// A category or genre row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxonomyItem {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// `{name, slug}` as exposed via API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TaxonomyItemResponse {
    pub name: String,
    pub slug: String,
}

impl TaxonomyItem {
    pub fn to_response(&self) -> TaxonomyItemResponse {
        TaxonomyItemResponse {
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Slugs: ASCII letters, digits, hyphen and underscore
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_slug");
        err.message = Some("Enter a valid slug: letters, numbers, underscores or hyphens".into());
        Err(err)
    }
}

/// Request body for POST /categories/ and POST /genres/
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTaxonomyItemRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(min = 1, max = 50), custom = "validate_slug")]
    pub slug: String,
}

/// Query string of the category and genre lists
#[derive(Debug, Default, Deserialize)]
pub struct TaxonomyQuery {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub page: Option<i64>,
}
