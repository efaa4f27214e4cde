// src/models/title.rs
// DOCUMENTATION: Titles (reviewed works) and their DTOs
// PURPOSE: Read model with rating and nested category/genres, write model referencing slugs

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::TaxonomyItemResponse;
use crate::errors::YamdbError;

/// Title as stored, without relations
#[derive(Debug, Clone, FromRow)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: i64,
}

/// Title joined with its category and average score
/// DOCUMENTATION: `rating` is the integer part of the mean review score,
/// NULL when the title has no reviews
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub rating: Option<i32>,
    pub category_name: String,
    pub category_slug: String,
}

/// One (title, genre) pair used to attach genres to a batch of titles
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenreRow {
    pub title_id: i64,
    pub name: String,
    pub slug: String,
}

/// Title DTO for GET endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleResponse {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub rating: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<TaxonomyItemResponse>,
    pub category: TaxonomyItemResponse,
}

impl TitleRow {
    pub fn into_response(self, genre: Vec<TaxonomyItemResponse>) -> TitleResponse {
        TitleResponse {
            id: self.id,
            name: self.name,
            year: self.year,
            rating: self.rating,
            description: self.description,
            genre,
            category: TaxonomyItemResponse {
                name: self.category_name,
                slug: self.category_slug,
            },
        }
    }
}

/// Title DTO returned by POST and PATCH
/// Relations are echoed back as slugs, the way they were submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleWriteResponse {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub category: String,
}

/// Release year must not be in the future
pub fn check_year(year: i32) -> Result<(), YamdbError> {
    let current = Utc::now().year();
    if year > current {
        return Err(YamdbError::ValidationError(format!(
            "year: {} has not come yet (current year is {})",
            year, current
        )));
    }
    if year < 0 {
        return Err(YamdbError::ValidationError(
            "year: must be a positive number".to_string(),
        ));
    }
    Ok(())
}

/// Request body for POST /titles/
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTitleRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    pub year: i32,

    pub description: Option<String>,

    /// Genre slugs
    pub genre: Vec<String>,

    /// Category slug
    #[validate(length(min = 1, max = 50))]
    pub category: String,
}

impl CreateTitleRequest {
    pub fn check(&self) -> Result<(), YamdbError> {
        self.validate()?;
        check_year(self.year)
    }
}

/// Request body for PATCH /titles/{id}/
/// All fields are optional - only provided fields are updated
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTitleRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    pub year: Option<i32>,

    /// `null` clears the description
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,

    pub genre: Option<Vec<String>>,

    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
}

impl UpdateTitleRequest {
    pub fn check(&self) -> Result<(), YamdbError> {
        self.validate()?;
        match self.year {
            Some(year) => check_year(year),
            None => Ok(()),
        }
    }
}

/// Filters of GET /titles/
#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    /// Category slug
    pub category: Option<String>,
    /// Genre slug
    pub genre: Option<String>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Exact release year
    pub year: Option<i32>,
    pub page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_year_rejected() {
        let next_year = Utc::now().year() + 1;
        assert!(check_year(next_year).is_err());
        assert!(check_year(Utc::now().year()).is_ok());
        assert!(check_year(1894).is_ok());
        assert!(check_year(-1).is_err());
    }

    #[test]
    fn test_create_request_check() {
        let req = CreateTitleRequest {
            name: "Solaris".into(),
            year: 1972,
            description: None,
            genre: vec!["drama".into(), "sci-fi".into()],
            category: "movie".into(),
        };
        assert!(req.check().is_ok());

        let unnamed = CreateTitleRequest {
            name: String::new(),
            ..req
        };
        assert!(matches!(
            unnamed.check(),
            Err(YamdbError::ValidationError(_))
        ));
    }

    #[test]
    fn test_patch_with_only_description() {
        let req: UpdateTitleRequest =
            serde_json::from_str(r#"{"description": "Tarkovsky"}"#).unwrap();
        assert!(req.check().is_ok());
        assert!(req.genre.is_none());
        assert_eq!(req.description, Some(Some("Tarkovsky".to_string())));

        let cleared: UpdateTitleRequest =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let untouched: UpdateTitleRequest = serde_json::from_str(r#"{"year": 1972}"#).unwrap();
        assert_eq!(untouched.description, None);
    }

    #[test]
    fn test_row_into_response_nests_category() {
        let row = TitleRow {
            id: 3,
            name: "Solaris".into(),
            year: 1972,
            description: None,
            rating: Some(8),
            category_name: "Movie".into(),
            category_slug: "movie".into(),
        };
        let response = row.into_response(vec![TaxonomyItemResponse {
            name: "Drama".into(),
            slug: "drama".into(),
        }]);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["category"]["slug"], "movie");
        assert_eq!(json["genre"][0]["name"], "Drama");
        assert_eq!(json["rating"], 8);
    }
}
