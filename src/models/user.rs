// src/models/user.rs
// DOCUMENTATION: User accounts, roles and auth DTOs
// PURPOSE: Defines the user record and the request/response shapes of /users and /auth

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Reserved for the `/users/me/` endpoint
pub const RESERVED_USERNAME: &str = "me";

/// Length of generated confirmation codes
pub const CONFIRMATION_CODE_LENGTH: usize = 12;

/// User role, stored as lowercase text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// User record as stored in the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub role: String,
    pub is_staff: bool,
    pub confirmation_code: Option<String>,
    pub date_joined: DateTime<Utc>,
}

/// User with a parsed role
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub role: Role,
    pub is_staff: bool,
    pub confirmation_code: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            bio: row.bio,
            role: row.role.parse()?,
            is_staff: row.is_staff,
            confirmation_code: row.confirmation_code,
            date_joined: row.date_joined,
        })
    }
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            bio: self.bio.clone(),
            role: self.role,
        }
    }
}

/// User DTO exposed via /users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub role: Role,
}

/// Usernames follow the usual account rules: letters, digits and @/./+/-/_
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value == RESERVED_USERNAME {
        let mut err = ValidationError::new("reserved_username");
        err.message = Some("Username \"me\" is not allowed".into());
        return Err(err);
    }

    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    if !valid {
        let mut err = ValidationError::new("invalid_username");
        err.message = Some("Enter a valid username: letters, digits and @/./+/-/_ only".into());
        return Err(err);
    }

    Ok(())
}

/// Request body for POST /auth/signup/
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 150), custom = "validate_username")]
    pub username: String,
}

/// Request body for POST /auth/token/
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(required, length(min = 1, max = 150))]
    pub username: Option<String>,

    #[validate(required, length(min = 1, max = 12))]
    pub confirmation_code: Option<String>,
}

/// Response body for POST /auth/token/
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Request body for POST /users/
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 150), custom = "validate_username")]
    pub username: String,

    #[validate(email, length(max = 254))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    pub bio: Option<String>,

    #[serde(default)]
    pub role: Role,
}

/// Request body for PATCH /users/{username}/ and PATCH /users/me/
/// All fields are optional - only provided fields are updated
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 150), custom = "validate_username")]
    pub username: Option<String>,

    #[validate(email, length(max = 254))]
    pub email: Option<String>,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    /// `null` clears the biography
    #[serde(default, deserialize_with = "super::nullable")]
    pub bio: Option<Option<String>>,

    pub role: Option<Role>,
}

/// Query string of GET /users/
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_and_default() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!("moderator".parse::<Role>(), Ok(Role::Moderator));
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("john.doe+1@x").is_ok());
        assert!(validate_username("me").is_err());
        assert!(validate_username("john doe").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_signup_validation() {
        let ok = SignUpRequest {
            email: "user@example.com".into(),
            username: "user".into(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = SignUpRequest {
            email: "not-an-email".into(),
            username: "user".into(),
        };
        assert!(bad_email.validate().is_err());

        let reserved = SignUpRequest {
            email: "me@example.com".into(),
            username: "me".into(),
        };
        assert!(reserved.validate().is_err());
    }

    #[test]
    fn test_token_request_requires_both_fields() {
        let missing: TokenRequest = serde_json::from_str(r#"{"username": "user"}"#).unwrap();
        assert!(missing.validate().is_err());

        let full: TokenRequest =
            serde_json::from_str(r#"{"username": "user", "confirmation_code": "abc"}"#).unwrap();
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_patch_distinguishes_null_bio_from_absent() {
        let absent: UpdateUserRequest = serde_json::from_str(r#"{"first_name": "Ann"}"#).unwrap();
        assert_eq!(absent.bio, None);

        let cleared: UpdateUserRequest = serde_json::from_str(r#"{"bio": null}"#).unwrap();
        assert_eq!(cleared.bio, Some(None));

        let set: UpdateUserRequest = serde_json::from_str(r#"{"bio": "Critic"}"#).unwrap();
        assert_eq!(set.bio, Some(Some("Critic".to_string())));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_user_row_conversion_rejects_unknown_role() {
        let row = UserRow {
            id: 1,
            username: "user".into(),
            email: "user@example.com".into(),
            first_name: String::new(),
            last_name: String::new(),
            bio: None,
            role: "root".into(),
            is_staff: false,
            confirmation_code: None,
            date_joined: Utc::now(),
        };
        assert!(User::try_from(row).is_err());
    }
}
