// src/auth/jwt.rs
// DOCUMENTATION: Access token issuing and validation
// PURPOSE: HS256 JWTs carrying the user id, signed with SECRET_KEY

use crate::config::Config;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ACCESS_TOKEN_TYPE: &str = "access";

/// JWT claims embedded in every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user's database id
    pub user_id: i64,
    /// Always "access"; refresh tokens are not issued
    pub token_type: String,
    /// Expiration time (UTC Unix timestamp)
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp)
    pub iat: i64,
    /// Unique token identifier
    pub jti: String,
}

/// Issue an access token valid for the configured number of days
pub fn generate_access_token(
    user_id: i64,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.access_token_lifetime_days * 24 * 60 * 60;

    let claims = Claims {
        user_id,
        token_type: ACCESS_TOKEN_TYPE.to_string(),
        exp,
        iat: now,
        jti: Uuid::new_v4().simple().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret_key.as_bytes()),
    )
}

/// Validate signature and expiry, and reject anything that is not an access token
pub fn validate_token(
    token: &str,
    config: &Config,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret_key.as_bytes()),
        &Validation::default(),
    )?;

    if data.claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = Config::for_tests();
        let token = generate_access_token(42, &config).expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
        assert_eq!(claims.jti.len(), 32);
    }

    #[test]
    fn test_expired_token_fails() {
        let config = Config::for_tests();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret_key.as_bytes()),
        )
        .expect("encoding should succeed");

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_refresh_type_rejected() {
        let config = Config::for_tests();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            token_type: "refresh".to_string(),
            exp: now + 300,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret_key.as_bytes()),
        )
        .expect("encoding should succeed");

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = Config::for_tests();
        let mut config_b = Config::for_tests();
        config_b.secret_key = "another-secret".to_string();

        let token = generate_access_token(1, &config_a).expect("token generation should succeed");
        assert!(validate_token(&token, &config_b).is_err());
    }
}
