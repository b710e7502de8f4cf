use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for user registration
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupDto {
    /// User's display name (4-100 characters)
    #[validate(length(min = 4, max = 100, message = "Full name must be 4-100 characters"))]
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    /// User's email address
    #[validate(email(message = "Invalid email"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Password (6-100 characters)
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    #[schema(example = "hunter2!")]
    pub password: String,
}

/// Request body for user login
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigninDto {
    /// User's email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User's password
    #[schema(example = "hunter2!")]
    pub password: String,
}

/// User information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    pub id: i32,
    /// User's display name
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    /// User's email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Response containing the access token and the authenticated user
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Authenticated user
    pub user: UserResponse,
}

impl AuthTokenResponse {
    pub fn new(token: String, user: &User) -> Self {
        Self {
            token,
            user: UserResponse::from_user(user),
        }
    }
}

/// JWT access token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: i32,         // User ID
    pub email: String,    // User email
    pub name: String,     // User display name
    pub iat: usize,       // Issued at
    pub exp: usize,       // Expiration
}
