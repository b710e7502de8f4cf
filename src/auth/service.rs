use secrecy::Secret;
use sqlx::PgPool;

use crate::errors::AppError;

use super::jwt::create_access_token;
use super::models::{AuthTokenResponse, SignupDto, User};
use super::password::{hash_password, verify_password};

/// Authentication service handling user registration and login logic
pub struct AuthService;

impl AuthService {
    /// Register a new user and return an access token
    pub async fn signup(
        pool: &PgPool,
        jwt_secret: &Secret<String>,
        dto: &SignupDto,
    ) -> Result<AuthTokenResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        // Check if email already exists
        let existing =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&email)
                .fetch_one(pool)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;

        if existing {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&dto.full_name)
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let token = create_access_token(&user, jwt_secret)?;

        Ok(AuthTokenResponse::new(token, &user))
    }

    /// Authenticate a user by email and password, return an access token
    pub async fn signin(
        pool: &PgPool,
        jwt_secret: &Secret<String>,
        email: &str,
        password: &str,
    ) -> Result<AuthTokenResponse, AppError> {
        let email = email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        let is_valid = verify_password(password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        let token = create_access_token(&user, jwt_secret)?;

        Ok(AuthTokenResponse::new(token, &user))
    }

    /// Get user by ID
    pub async fn get_user_by_id(pool: &PgPool, user_id: i32) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_hash, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
    }
}
