// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
/// Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug)]
pub enum YamdbError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Method \"{0}\" not allowed")]
    MethodNotAllowed(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl YamdbError {
    /// Map a sqlx error, turning constraint violations into client errors
    /// DOCUMENTATION: Used by repositories so duplicate slugs, usernames or
    /// reviews surface as 400 instead of 500
    pub fn from_db(context: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    log::warn!("{}: unique violation: {}", context, db_err.message());
                    return YamdbError::ValidationError(unique_violation_message(
                        db_err.constraint(),
                    ));
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    log::warn!("{}: foreign key violation: {}", context, db_err.message());
                    return YamdbError::ValidationError(
                        "Referenced object does not exist".to_string(),
                    );
                }
                _ => {}
            }
        }

        log::error!("{}: {}", context, err);
        YamdbError::DatabaseError(format!("{}: {}", context, err))
    }

    fn code(&self) -> &'static str {
        match self {
            YamdbError::NotFound(_) => "NOT_FOUND",
            YamdbError::DatabaseError(_) => "DATABASE_ERROR",
            YamdbError::InvalidInput(_) => "INVALID_INPUT",
            YamdbError::ValidationError(_) => "VALIDATION_ERROR",
            YamdbError::Unauthorized(_) => "UNAUTHORIZED",
            YamdbError::Forbidden => "FORBIDDEN",
            YamdbError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            YamdbError::InternalError(_) => "INTERNAL_ERROR",
            YamdbError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }
}

fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_username_key") => "A user with that username already exists".to_string(),
        Some("users_email_key") => "A user with that email already exists".to_string(),
        Some("categories_slug_key") | Some("genres_slug_key") => {
            "Slug must be unique".to_string()
        }
        Some("unique_review_author") => {
            "Only one review per title is allowed".to_string()
        }
        Some(other) => format!("Duplicate value violates {}", other),
        None => "Duplicate value".to_string(),
    }
}

impl From<ValidationErrors> for YamdbError {
    fn from(errors: ValidationErrors) -> Self {
        YamdbError::ValidationError(errors.to_string())
    }
}

/// Convert YamdbError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for YamdbError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            YamdbError::NotFound(_) => StatusCode::NOT_FOUND,
            YamdbError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            YamdbError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            YamdbError::ValidationError(_) => StatusCode::BAD_REQUEST,
            YamdbError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            YamdbError::Forbidden => StatusCode::FORBIDDEN,
            YamdbError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            YamdbError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            YamdbError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            YamdbError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            YamdbError::Unauthorized("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(YamdbError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            YamdbError::MethodNotAllowed("PUT".into()).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            YamdbError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_rt::test]
    async fn test_error_body_shape() {
        let response = YamdbError::NotFound("Title 7".into()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Not found: Title 7");
        assert!(body["error"]["timestamp"].is_string());
    }

    #[test]
    fn test_unique_violation_messages() {
        assert_eq!(
            unique_violation_message(Some("unique_review_author")),
            "Only one review per title is allowed"
        );
        assert_eq!(unique_violation_message(None), "Duplicate value");
    }
}
