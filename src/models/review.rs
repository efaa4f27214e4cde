// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Review of a title, joined with its author's username
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub title_id: i64,
    pub author_id: i64,
    pub author: String,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

/// Request to create a new review
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1))]
    pub text: String,

    #[validate(range(min = 0, max = 10))]
    pub score: i16,
}

/// Request to partially update a review
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(min = 1))]
    pub text: Option<String>,

    #[validate(range(min = 0, max = 10))]
    pub score: Option<i16>,
}

/// Review response DTO exposed via API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

impl Review {
    /// Convert database Review into API response
    pub fn to_response(&self) -> ReviewResponse {
        ReviewResponse {
            id: self.id,
            author: self.author.clone(),
            text: self.text.clone(),
            score: self.score,
            pub_date: self.pub_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        let ok = CreateReviewRequest {
            text: "Great".into(),
            score: 10,
        };
        assert!(ok.validate().is_ok());

        let zero = CreateReviewRequest {
            text: "Awful".into(),
            score: 0,
        };
        assert!(zero.validate().is_ok());

        let too_high = CreateReviewRequest {
            text: "Off the charts".into(),
            score: 11,
        };
        assert!(too_high.validate().is_err());
    }

    #[test]
    fn test_empty_text_rejected() {
        let req = CreateReviewRequest {
            text: String::new(),
            score: 5,
        };
        assert!(req.validate().is_err());

        let patch = UpdateReviewRequest {
            text: Some(String::new()),
            score: None,
        };
        assert!(patch.validate().is_err());
    }
}
