use sqlx::PgPool;

use super::models::{
    CreateTransactionDto, Transaction, TransactionFilters, TransactionRecord, UpdateTransactionDto,
};
use crate::account::service::AccountService;
use crate::errors::AppError;
use crate::ledger::{self, MAX_BALANCE_RETRIES};

/// Service layer for single-leg transaction business logic.
///
/// Every write keeps the owning account's balance consistent with the full
/// lifecycle of the transaction: create applies the signed effect, update
/// reverses the old effect before applying the new one, delete reverses the
/// effect before removing the row. All of it happens in one store
/// transaction per operation.
pub struct TransactionService;

impl TransactionService {
    /// Create a transaction and apply its effect to the account balance.
    pub async fn create_transaction(
        pool: &PgPool,
        user_id: i32,
        dto: &CreateTransactionDto,
    ) -> Result<TransactionRecord, AppError> {
        let mut attempts = 0;
        loop {
            match Self::try_create(pool, user_id, dto).await {
                Err(AppError::Conflict(msg)) => {
                    attempts += 1;
                    if attempts >= MAX_BALANCE_RETRIES {
                        return Err(AppError::Conflict(msg));
                    }
                }
                result => return result,
            }
        }
    }

    async fn try_create(
        pool: &PgPool,
        user_id: i32,
        dto: &CreateTransactionDto,
    ) -> Result<TransactionRecord, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let account = AccountService::load(&mut tx, dto.account_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        Self::require_category(&mut tx, dto.category_id).await?;

        let new_balance = ledger::apply(account.balance, dto.amount, dto.transaction_type)?;

        if !AccountService::store_balance(&mut tx, &account, new_balance).await? {
            return Err(AppError::Conflict(
                "Account was modified concurrently".to_string(),
            ));
        }

        let transaction_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO transactions
                (account_id, category_id, amount, transaction_date, transaction_type, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(dto.account_id)
        .bind(dto.category_id)
        .bind(dto.amount)
        .bind(dto.transaction_date)
        .bind(dto.transaction_type.as_str())
        .bind(&dto.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let record = Self::fetch_record(&mut tx, transaction_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(record)
    }

    /// Update a transaction, reversing the old balance effect before
    /// applying the new one.
    ///
    /// The two phases are deliberately discrete rather than a net diff:
    /// amount, type and account may all change at once, and the reversal of
    /// the old leg must pass its own balance check before the new leg is
    /// considered.
    pub async fn update_transaction(
        pool: &PgPool,
        user_id: i32,
        transaction_id: i32,
        dto: &UpdateTransactionDto,
    ) -> Result<TransactionRecord, AppError> {
        let mut attempts = 0;
        loop {
            match Self::try_update(pool, user_id, transaction_id, dto).await {
                Err(AppError::Conflict(msg)) => {
                    attempts += 1;
                    if attempts >= MAX_BALANCE_RETRIES {
                        return Err(AppError::Conflict(msg));
                    }
                }
                result => return result,
            }
        }
    }

    async fn try_update(
        pool: &PgPool,
        user_id: i32,
        transaction_id: i32,
        dto: &UpdateTransactionDto,
    ) -> Result<TransactionRecord, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let old = Self::load_owned(&mut tx, transaction_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

        let old_type = old.kind().ok_or_else(|| {
            AppError::InternalError(format!(
                "Transaction {} has invalid type code '{}'",
                old.id, old.transaction_type
            ))
        })?;

        Self::require_category(&mut tx, dto.category_id).await?;

        let old_account = AccountService::load(&mut tx, old.account_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        // Phase 1: undo the old effect against the old account.
        let reversed = ledger::reverse(old_account.balance, old.amount, old_type)?;

        // Phase 2: apply the new effect against the (possibly different)
        // target account.
        if dto.account_id == old.account_id {
            let new_balance = ledger::apply(reversed, dto.amount, dto.transaction_type)?;
            if !AccountService::store_balance(&mut tx, &old_account, new_balance).await? {
                return Err(AppError::Conflict(
                    "Account was modified concurrently".to_string(),
                ));
            }
        } else {
            let new_account = AccountService::load(&mut tx, dto.account_id, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

            let applied = ledger::apply(new_account.balance, dto.amount, dto.transaction_type)?;

            // Write balances in account-id order so concurrent moves between
            // the same pair of accounts cannot deadlock on row locks.
            let mut writes = [(&old_account, reversed), (&new_account, applied)];
            writes.sort_by_key(|(account, _)| account.id);
            for (account, balance) in writes {
                if !AccountService::store_balance(&mut tx, account, balance).await? {
                    return Err(AppError::Conflict(
                        "Account was modified concurrently".to_string(),
                    ));
                }
            }
        }

        sqlx::query(
            r#"
            UPDATE transactions SET
                account_id = $2,
                category_id = $3,
                amount = $4,
                transaction_date = $5,
                transaction_type = $6,
                description = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .bind(dto.account_id)
        .bind(dto.category_id)
        .bind(dto.amount)
        .bind(dto.transaction_date)
        .bind(dto.transaction_type.as_str())
        .bind(&dto.description)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let record = Self::fetch_record(&mut tx, transaction_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(record)
    }

    /// Delete a transaction, reversing its balance effect first.
    pub async fn delete_transaction(
        pool: &PgPool,
        user_id: i32,
        transaction_id: i32,
    ) -> Result<(), AppError> {
        let mut attempts = 0;
        loop {
            match Self::try_delete(pool, user_id, transaction_id).await {
                Err(AppError::Conflict(msg)) => {
                    attempts += 1;
                    if attempts >= MAX_BALANCE_RETRIES {
                        return Err(AppError::Conflict(msg));
                    }
                }
                result => return result,
            }
        }
    }

    async fn try_delete(
        pool: &PgPool,
        user_id: i32,
        transaction_id: i32,
    ) -> Result<(), AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let old = Self::load_owned(&mut tx, transaction_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

        let old_type = old.kind().ok_or_else(|| {
            AppError::InternalError(format!(
                "Transaction {} has invalid type code '{}'",
                old.id, old.transaction_type
            ))
        })?;

        let account = AccountService::load(&mut tx, old.account_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let restored = ledger::reverse(account.balance, old.amount, old_type)?;

        if !AccountService::store_balance(&mut tx, &account, restored).await? {
            return Err(AppError::Conflict(
                "Account was modified concurrently".to_string(),
            ));
        }

        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(())
    }

    /// List transactions for the user, most recent first.
    ///
    /// Without filters every transaction across the user's accounts is
    /// returned (an empty list is success, not an error). With an account
    /// filter the account must exist and belong to the caller; the category
    /// filter only further narrows an account-scoped query.
    pub async fn list_transactions(
        pool: &PgPool,
        user_id: i32,
        filters: &TransactionFilters,
    ) -> Result<Vec<TransactionRecord>, AppError> {
        if let Some(account_id) = filters.account_id {
            let owned = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1 AND user_id = $2)",
            )
            .bind(account_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

            if !owned {
                return Err(AppError::NotFound("Account not found".to_string()));
            }
        }

        let category_filter = filters.account_id.and(filters.category_id);

        sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT t.id, t.amount, t.transaction_date, t.description,
                   t.account_id, a.name AS account_name,
                   t.category_id, c.name AS category_name,
                   t.transaction_type
            FROM transactions t
            JOIN accounts a ON t.account_id = a.id
            JOIN transaction_categories c ON t.category_id = c.id
            WHERE a.user_id = $1
              AND ($2::int4 IS NULL OR t.account_id = $2)
              AND ($3::int4 IS NULL OR t.category_id = $3)
            ORDER BY t.transaction_date DESC, t.id DESC
            "#,
        )
        .bind(user_id)
        .bind(filters.account_id)
        .bind(category_filter)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Load a transaction owned (through its account) by the given user.
    async fn load_owned(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transaction_id: i32,
        user_id: i32,
    ) -> Result<Option<Transaction>, AppError> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT t.id, t.account_id, t.amount, t.transaction_type
            FROM transactions t
            JOIN accounts a ON t.account_id = a.id
            WHERE t.id = $1 AND a.user_id = $2
            "#,
        )
        .bind(transaction_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    async fn require_category(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        category_id: i32,
    ) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM transaction_categories WHERE id = $1)",
        )
        .bind(category_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if !exists {
            return Err(AppError::NotFound(
                "Transaction category not found".to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch_record(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transaction_id: i32,
    ) -> Result<TransactionRecord, AppError> {
        sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT t.id, t.amount, t.transaction_date, t.description,
                   t.account_id, a.name AS account_name,
                   t.category_id, c.name AS category_name,
                   t.transaction_type
            FROM transactions t
            JOIN accounts a ON t.account_id = a.id
            JOIN transaction_categories c ON t.category_id = c.id
            WHERE t.id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }
}
