use rand::Rng;
use sqlx::PgPool;

use super::models::{CreateTransferDto, TransferRecord};
use crate::account::service::AccountService;
use crate::errors::AppError;
use crate::ledger::{self, TransactionType, MAX_BALANCE_RETRIES};

/// Seeded "Other" transaction category; both legs of a transfer are tagged
/// with it.
pub const TRANSFER_CATEGORY_ID: i32 = 10;

/// Service layer for transfers between two of the caller's accounts.
///
/// A transfer is one atomic unit: two balance updates, two transaction legs
/// and the transfer row itself all commit together or not at all. Transfers
/// are immutable once created; undoing one means deleting or adjusting its
/// legs, which is deliberately not offered.
pub struct TransferService;

impl TransferService {
    /// Move an amount between two accounts owned by the caller.
    pub async fn create_transfer(
        pool: &PgPool,
        user_id: i32,
        dto: &CreateTransferDto,
    ) -> Result<TransferRecord, AppError> {
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
        dto: &CreateTransferDto,
    ) -> Result<TransferRecord, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // Checked in order; the first failure wins.
        let from_account = AccountService::load(&mut tx, dto.from_account_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Source account not found".to_string()))?;

        let to_account = AccountService::load(&mut tx, dto.to_account_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Destination account not found".to_string()))?;

        if dto.from_account_id == dto.to_account_id {
            return Err(AppError::ValidationError(
                "Source and destination accounts cannot be the same".to_string(),
            ));
        }

        let from_balance = ledger::apply(from_account.balance, dto.amount, TransactionType::Debit)
            .map_err(|_| {
                AppError::InsufficientFunds(
                    "Insufficient balance in source account".to_string(),
                )
            })?;
        let to_balance = ledger::apply(to_account.balance, dto.amount, TransactionType::Credit)?;

        // Write balances in account-id order so two opposing transfers
        // cannot deadlock on row locks.
        let mut writes = [(&from_account, from_balance), (&to_account, to_balance)];
        writes.sort_by_key(|(account, _)| account.id);
        for (account, balance) in writes {
            if !AccountService::store_balance(&mut tx, account, balance).await? {
                return Err(AppError::Conflict(
                    "Account was modified concurrently".to_string(),
                ));
            }
        }

        let debit_description = leg_description("to", &to_account.name, dto.description.as_deref());
        let debit_transaction_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO transactions
                (account_id, category_id, amount, transaction_date, transaction_type, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(dto.from_account_id)
        .bind(TRANSFER_CATEGORY_ID)
        .bind(dto.amount)
        .bind(dto.transfer_date)
        .bind(TransactionType::Debit.as_str())
        .bind(&debit_description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let credit_description =
            leg_description("from", &from_account.name, dto.description.as_deref());
        let credit_transaction_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO transactions
                (account_id, category_id, amount, transaction_date, transaction_type, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(dto.to_account_id)
        .bind(TRANSFER_CATEGORY_ID)
        .bind(dto.amount)
        .bind(dto.transfer_date)
        .bind(TransactionType::Credit.as_str())
        .bind(&credit_description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let reference_number = generate_reference_number();

        let transfer_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO transfers
                (amount, transfer_date, from_account_id, to_account_id, user_id,
                 description, reference_number, debit_transaction_id, credit_transaction_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(dto.amount)
        .bind(dto.transfer_date)
        .bind(dto.from_account_id)
        .bind(dto.to_account_id)
        .bind(user_id)
        .bind(&dto.description)
        .bind(&reference_number)
        .bind(debit_transaction_id)
        .bind(credit_transaction_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let record = Self::fetch_record(&mut tx, transfer_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError("Failed to retrieve created transfer".to_string())
            })?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(record)
    }

    /// List the caller's transfers, most recent first.
    pub async fn list_transfers(
        pool: &PgPool,
        user_id: i32,
    ) -> Result<Vec<TransferRecord>, AppError> {
        sqlx::query_as::<_, TransferRecord>(
            r#"
            SELECT tr.id, tr.amount, tr.transfer_date,
                   tr.from_account_id, fa.name AS from_account_name,
                   tr.to_account_id, ta.name AS to_account_name,
                   tr.description, tr.reference_number,
                   tr.debit_transaction_id, tr.credit_transaction_id
            FROM transfers tr
            JOIN accounts fa ON tr.from_account_id = fa.id
            JOIN accounts ta ON tr.to_account_id = ta.id
            WHERE tr.user_id = $1
            ORDER BY tr.transfer_date DESC, tr.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Fetch a single transfer owned by the caller.
    pub async fn get_transfer(
        pool: &PgPool,
        user_id: i32,
        transfer_id: i32,
    ) -> Result<TransferRecord, AppError> {
        sqlx::query_as::<_, TransferRecord>(
            r#"
            SELECT tr.id, tr.amount, tr.transfer_date,
                   tr.from_account_id, fa.name AS from_account_name,
                   tr.to_account_id, ta.name AS to_account_name,
                   tr.description, tr.reference_number,
                   tr.debit_transaction_id, tr.credit_transaction_id
            FROM transfers tr
            JOIN accounts fa ON tr.from_account_id = fa.id
            JOIN accounts ta ON tr.to_account_id = ta.id
            WHERE tr.id = $1 AND tr.user_id = $2
            "#,
        )
        .bind(transfer_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Transfer not found".to_string()))
    }

    async fn fetch_record(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transfer_id: i32,
        user_id: i32,
    ) -> Result<Option<TransferRecord>, AppError> {
        sqlx::query_as::<_, TransferRecord>(
            r#"
            SELECT tr.id, tr.amount, tr.transfer_date,
                   tr.from_account_id, fa.name AS from_account_name,
                   tr.to_account_id, ta.name AS to_account_name,
                   tr.description, tr.reference_number,
                   tr.debit_transaction_id, tr.credit_transaction_id
            FROM transfers tr
            JOIN accounts fa ON tr.from_account_id = fa.id
            JOIN accounts ta ON tr.to_account_id = ta.id
            WHERE tr.id = $1 AND tr.user_id = $2
            "#,
        )
        .bind(transfer_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }
}

/// Reference number: "TXF-" + UTC timestamp + 8 random uppercase characters.
fn generate_reference_number() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(8)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("TXF-{timestamp}-{suffix}")
}

/// Annotate a transfer leg with the account on the other side.
fn leg_description(direction: &str, other_account: &str, description: Option<&str>) -> String {
    match description.map(str::trim) {
        Some(text) if !text.is_empty() => {
            format!("Transfer {direction} {other_account} - {text}")
        }
        _ => format!("Transfer {direction} {other_account}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_number_has_expected_shape() {
        let reference = generate_reference_number();
        let parts: Vec<&str> = reference.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TXF");
        assert_eq!(parts[1].len(), 14);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn reference_numbers_are_unique() {
        let a = generate_reference_number();
        let b = generate_reference_number();
        assert_ne!(a, b);
    }

    #[test]
    fn leg_description_includes_user_text() {
        assert_eq!(
            leg_description("to", "Savings", Some("rainy day fund")),
            "Transfer to Savings - rainy day fund"
        );
    }

    #[test]
    fn leg_description_without_user_text() {
        assert_eq!(leg_description("from", "Checking", None), "Transfer from Checking");
        assert_eq!(
            leg_description("from", "Checking", Some("   ")),
            "Transfer from Checking"
        );
    }
}
