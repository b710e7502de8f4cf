use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};

use crate::errors::AppError;

use super::models::{TokenClaims, User};

/// Access tokens are valid for one day; there is no refresh flow.
pub const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 24;

/// Create a new JWT access token for a user
pub fn create_access_token(user: &User, jwt_secret: &Secret<String>) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS);

    let claims = TokenClaims {
        sub: user.id,
        email: user.email.clone(),
        name: user.full_name.clone(),
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Failed to create access token: {e}")))
}

/// Decode and validate a JWT access token
pub fn decode_token(token: &str, jwt_secret: &Secret<String>) -> Result<TokenClaims, AppError> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))
}

/// Extract Bearer token from Authorization header
pub fn extract_token(req: &HttpRequest) -> Result<String, AppError> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid Authorization header".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 42,
            full_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "irrelevant".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips() {
        let secret = Secret::new("unit-test-secret".to_string());
        let token = create_access_token(&test_user(), &secret).expect("Should create token");

        let claims = decode_token(&token, &secret).expect("Should decode token");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "test@example.com");
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let secret = Secret::new("unit-test-secret".to_string());
        let other = Secret::new("a-different-secret".to_string());
        let token = create_access_token(&test_user(), &secret).expect("Should create token");

        assert!(matches!(
            decode_token(&token, &other),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let secret = Secret::new("unit-test-secret".to_string());
        assert!(decode_token("not.a.jwt", &secret).is_err());
    }
}
