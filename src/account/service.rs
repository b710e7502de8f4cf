use rust_decimal::Decimal;
use sqlx::PgPool;

use super::models::{Account, AccountRecord, CreateAccountDto, UpdateAccountDto};
use crate::errors::AppError;

/// Service layer for account business logic.
///
/// Also owns the two persistence primitives the ledger operations are built
/// on: loading an account inside a store transaction and writing a new
/// balance with an optimistic version check.
pub struct AccountService;

impl AccountService {
    /// Load an account owned by the given user inside a store transaction.
    pub async fn load(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        account_id: i32,
        user_id: i32,
    ) -> Result<Option<Account>, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, user_id, name, balance, version
            FROM accounts
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(account_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Compare-and-swap the account balance.
    ///
    /// Returns false when a concurrent writer bumped the version since the
    /// account was loaded; the caller retries the whole operation from the
    /// top (bounded by `ledger::MAX_BALANCE_RETRIES`).
    pub async fn store_balance(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        account: &Account,
        new_balance: Decimal,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = $1, version = version + 1, updated_at = NOW()
            WHERE id = $2 AND version = $3
            "#,
        )
        .bind(new_balance)
        .bind(account.id)
        .bind(account.version)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    /// List all accounts for a user with category names resolved.
    pub async fn list_accounts(
        pool: &PgPool,
        user_id: i32,
    ) -> Result<Vec<AccountRecord>, AppError> {
        sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT a.id, a.name, a.account_category_id, c.name AS account_category_name,
                   a.balance, a.created_at, a.updated_at
            FROM accounts a
            JOIN account_categories c ON a.account_category_id = c.id
            WHERE a.user_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Create a new account with a zero starting balance.
    pub async fn create_account(
        pool: &PgPool,
        user_id: i32,
        dto: &CreateAccountDto,
    ) -> Result<AccountRecord, AppError> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        let category_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM account_categories WHERE id = $1)",
        )
        .bind(dto.account_category_id)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if !category_exists {
            return Err(AppError::NotFound(
                "Account category not found".to_string(),
            ));
        }

        let duplicate = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM accounts
                WHERE user_id = $1 AND name = $2 AND account_category_id = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(&name)
        .bind(dto.account_category_id)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if duplicate {
            return Err(AppError::Conflict(
                "Account with similar name and category already exists".to_string(),
            ));
        }

        let account_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO accounts (user_id, name, account_category_id, balance, version)
            VALUES ($1, $2, $3, 0, 0)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&name)
        .bind(dto.account_category_id)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Self::get_record(pool, account_id, user_id).await
    }

    /// Update an account's name and category.
    pub async fn update_account(
        pool: &PgPool,
        account_id: i32,
        user_id: i32,
        dto: &UpdateAccountDto,
    ) -> Result<AccountRecord, AppError> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1 AND user_id = $2)",
        )
        .bind(account_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if !exists {
            return Err(AppError::NotFound("Account not found".to_string()));
        }

        let category_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM account_categories WHERE id = $1)",
        )
        .bind(dto.account_category_id)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if !category_exists {
            return Err(AppError::NotFound(
                "Account category not found".to_string(),
            ));
        }

        let duplicate = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM accounts
                WHERE user_id = $1 AND name = $2 AND account_category_id = $3 AND id <> $4
            )
            "#,
        )
        .bind(user_id)
        .bind(&name)
        .bind(dto.account_category_id)
        .bind(account_id)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if duplicate {
            return Err(AppError::Conflict(
                "Account with similar name already exists".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE accounts
            SET name = $3, account_category_id = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(account_id)
        .bind(user_id)
        .bind(&name)
        .bind(dto.account_category_id)
        .execute(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Self::get_record(pool, account_id, user_id).await
    }

    /// Fetch a single account with its category name resolved.
    async fn get_record(
        pool: &PgPool,
        account_id: i32,
        user_id: i32,
    ) -> Result<AccountRecord, AppError> {
        sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT a.id, a.name, a.account_category_id, c.name AS account_category_name,
                   a.balance, a.created_at, a.updated_at
            FROM accounts a
            JOIN account_categories c ON a.account_category_id = c.id
            WHERE a.id = $1 AND a.user_id = $2
            "#,
        )
        .bind(account_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
    }
}
