// src/services/user_service.rs
// DOCUMENTATION: Business logic for accounts
// PURPOSE: Signup with emailed confirmation codes, token exchange, user administration

use crate::auth::generate_access_token;
use crate::config::Config;
use crate::db::UserRepository;
use crate::errors::YamdbError;
use crate::models::{
    CreateUserRequest, Page, PageRequest, SignUpRequest, TokenRequest, TokenResponse,
    UpdateUserRequest, User, UserResponse, CONFIRMATION_CODE_LENGTH,
};
use crate::services::FileMailer;
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::PgPool;
use validator::Validate;

/// Random alphanumeric code mailed on signup
pub fn generate_confirmation_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CONFIRMATION_CODE_LENGTH)
        .map(char::from)
        .collect()
}

pub struct UserService;

impl UserService {
    /// Register a user or re-issue the code of an existing one
    /// DOCUMENTATION: An existing username only gets a new code when the
    /// email matches; any other username/email collision is rejected
    pub async fn signup(
        pool: &PgPool,
        mailer: &FileMailer,
        req: SignUpRequest,
    ) -> Result<SignUpRequest, YamdbError> {
        req.validate()?;

        let code = generate_confirmation_code();

        match UserRepository::find_by_username(pool, &req.username).await? {
            Some(user) if user.email == req.email => {
                UserRepository::set_confirmation_code(pool, user.id, &code).await?;
                log::info!("Re-issued confirmation code for {}", user.username);
            }
            Some(_) => {
                return Err(YamdbError::ValidationError(
                    "username: a user with this username is registered with another email"
                        .to_string(),
                ));
            }
            None => {
                if UserRepository::email_taken(pool, &req.email).await? {
                    return Err(YamdbError::ValidationError(
                        "email: a user with this email already exists".to_string(),
                    ));
                }
                UserRepository::create_with_code(pool, &req.username, &req.email, &code).await?;
            }
        }

        mailer
            .send_confirmation_code(&req.username, &req.email, &code)
            .await?;

        Ok(req)
    }

    /// Exchange username + confirmation code for an access token
    pub async fn obtain_token(
        pool: &PgPool,
        config: &Config,
        req: TokenRequest,
    ) -> Result<TokenResponse, YamdbError> {
        req.validate()?;

        let (username, code) = match (req.username, req.confirmation_code) {
            (Some(username), Some(code)) => (username, code),
            _ => {
                return Err(YamdbError::ValidationError(
                    "username and confirmation_code are required".to_string(),
                ))
            }
        };

        let user = UserRepository::get_by_username(pool, &username).await?;

        if user.confirmation_code.as_deref() != Some(code.as_str()) {
            log::warn!("Wrong confirmation code for {}", username);
            return Err(YamdbError::ValidationError(
                "confirmation_code: invalid confirmation code".to_string(),
            ));
        }

        let token = generate_access_token(user.id, config).map_err(|e| {
            log::error!("Token generation failed for {}: {}", username, e);
            YamdbError::InternalError("Token generation failed".to_string())
        })?;

        log::info!("Issued access token for {}", username);
        Ok(TokenResponse { token })
    }

    pub async fn list_users(
        pool: &PgPool,
        search: Option<&str>,
        page: PageRequest,
        request_url: &str,
    ) -> Result<Page<UserResponse>, YamdbError> {
        let (users, total) = UserRepository::list(pool, search, page).await?;
        let page = Page::new(users, total, page, request_url)?;
        Ok(page.map(|u| u.to_response()))
    }

    pub async fn create_user(
        pool: &PgPool,
        req: CreateUserRequest,
    ) -> Result<UserResponse, YamdbError> {
        req.validate()?;
        let user = UserRepository::create(pool, &req).await?;
        Ok(user.to_response())
    }

    pub async fn get_user(pool: &PgPool, username: &str) -> Result<UserResponse, YamdbError> {
        let user = UserRepository::get_by_username(pool, username).await?;
        Ok(user.to_response())
    }

    /// Administrator edit, role included
    pub async fn update_user(
        pool: &PgPool,
        username: &str,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, YamdbError> {
        req.validate()?;
        let user = UserRepository::get_by_username(pool, username).await?;
        let updated = UserRepository::update(pool, user.id, &req).await?;
        Ok(updated.to_response())
    }

    pub async fn delete_user(pool: &PgPool, username: &str) -> Result<(), YamdbError> {
        UserRepository::delete_by_username(pool, username).await
    }

    /// Self edit via /users/me/; the role field is read-only here
    pub async fn update_me(
        pool: &PgPool,
        me: &User,
        mut req: UpdateUserRequest,
    ) -> Result<UserResponse, YamdbError> {
        req.validate()?;
        if req.role.take().is_some() {
            log::debug!("Ignoring role change requested by {}", me.username);
        }
        let updated = UserRepository::update(pool, me.id, &req).await?;
        Ok(updated.to_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_code_shape() {
        let code = generate_confirmation_code();
        assert_eq!(code.len(), CONFIRMATION_CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_confirmation_codes_differ() {
        assert_ne!(generate_confirmation_code(), generate_confirmation_code());
    }

    #[tokio::test]
    async fn test_token_request_without_fields_rejected_before_db() {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let config = Config::for_tests();
        let req = TokenRequest {
            username: Some("reviewer".into()),
            confirmation_code: None,
        };

        let result = UserService::obtain_token(&pool, &config, req).await;
        assert!(matches!(result, Err(YamdbError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_signup_with_reserved_username_rejected_before_db() {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mailer = FileMailer::new(dir.path(), "webmaster@localhost");
        let req = SignUpRequest {
            email: "me@example.com".into(),
            username: "me".into(),
        };

        let result = UserService::signup(&pool, &mailer, req).await;
        assert!(matches!(result, Err(YamdbError::ValidationError(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
