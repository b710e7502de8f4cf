use sqlx::PgPool;

use super::models::Category;
use crate::errors::AppError;

/// Service layer for the seeded category lookups.
pub struct CategoryService;

impl CategoryService {
    /// List the account categories (Checking, Savings, ...).
    pub async fn list_account_categories(pool: &PgPool) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name FROM account_categories ORDER BY id ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// List the transaction categories (Income, Food & Dining, ...).
    pub async fn list_transaction_categories(pool: &PgPool) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name FROM transaction_categories ORDER BY id ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }
}
