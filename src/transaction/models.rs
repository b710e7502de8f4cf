use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::ledger::TransactionType;

/// Validate that amount is positive
fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    Ok(())
}

/// Validate that the date is not in the future and at most 12 months old
fn validate_transaction_date(date: &DateTime<Utc>) -> Result<(), ValidationError> {
    let now = Utc::now();
    if *date > now {
        return Err(ValidationError::new("date_in_future"));
    }
    let oldest = now
        .checked_sub_months(Months::new(12))
        .ok_or_else(|| ValidationError::new("date_out_of_range"))?;
    if *date < oldest {
        return Err(ValidationError::new("date_too_old"));
    }
    Ok(())
}

/// The slice of a stored transaction the balance bookkeeping needs when
/// reversing its effect.
#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: i32,
    pub account_id: i32,
    pub amount: Decimal,
    pub transaction_type: String,
}

impl Transaction {
    /// The stored type code; rows only ever hold the canonical encoding.
    pub fn kind(&self) -> Option<TransactionType> {
        TransactionType::parse(&self.transaction_type)
    }
}

/// Transaction row joined with account and category names for responses
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRecord {
    pub id: i32,
    pub amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub description: Option<String>,
    pub account_id: i32,
    pub account_name: String,
    pub category_id: i32,
    pub category_name: String,
    pub transaction_type: String,
}

/// Transaction information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Unique transaction identifier
    pub id: i32,
    /// Transaction amount (always positive)
    #[schema(example = 50.00)]
    pub amount: Decimal,
    /// Date of the transaction
    pub transaction_date: DateTime<Utc>,
    /// Optional description
    #[schema(example = "Weekly groceries")]
    pub description: Option<String>,
    /// Account the transaction belongs to
    pub account_id: i32,
    /// Resolved account name
    #[schema(example = "Everyday Checking")]
    pub account_name: String,
    /// Category this transaction belongs to
    pub category_id: i32,
    /// Resolved category name
    #[schema(example = "Food & Dining")]
    pub category_name: String,
    /// Transaction type code ("C" credit, "D" debit)
    #[schema(example = "D")]
    pub transaction_type: String,
}

impl From<TransactionRecord> for TransactionResponse {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            amount: record.amount,
            transaction_date: record.transaction_date,
            description: record.description,
            account_id: record.account_id,
            account_name: record.account_name,
            category_id: record.category_id,
            category_name: record.category_name,
            transaction_type: record.transaction_type,
        }
    }
}

/// Request body for creating a transaction
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionDto {
    /// Account the transaction is booked against
    pub account_id: i32,

    /// Category this transaction belongs to
    pub category_id: i32,

    /// Transaction amount (must be positive)
    #[validate(custom(
        function = "validate_positive_amount",
        message = "Amount must be positive"
    ))]
    #[schema(example = 50.00)]
    pub amount: Decimal,

    /// Date of the transaction (not in the future, at most 12 months old)
    #[validate(custom(
        function = "validate_transaction_date",
        message = "Transaction date must be within the last 12 months"
    ))]
    pub transaction_date: DateTime<Utc>,

    /// Transaction type ("C" credit, "D" debit)
    pub transaction_type: TransactionType,

    /// Optional description (max 500 chars)
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    #[schema(example = "Weekly groceries")]
    pub description: Option<String>,
}

/// Request body for updating a transaction. Updates are full replacements:
/// the old balance effect is reversed and the new one applied, so every
/// field must be supplied.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionDto {
    /// Account the transaction should be booked against
    pub account_id: i32,

    /// Category this transaction belongs to
    pub category_id: i32,

    /// Transaction amount (must be positive)
    #[validate(custom(
        function = "validate_positive_amount",
        message = "Amount must be positive"
    ))]
    #[schema(example = 75.00)]
    pub amount: Decimal,

    /// Date of the transaction (not in the future, at most 12 months old)
    #[validate(custom(
        function = "validate_transaction_date",
        message = "Transaction date must be within the last 12 months"
    ))]
    pub transaction_date: DateTime<Utc>,

    /// Transaction type ("C" credit, "D" debit)
    pub transaction_type: TransactionType,

    /// Optional description (max 500 chars)
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    #[schema(example = "Updated description")]
    pub description: Option<String>,
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    /// Scope to one account (must belong to the caller)
    pub account_id: Option<i32>,
    /// Further scope to one category; only honored together with accountId
    pub category_id: Option<i32>,
}

/// Response for listing transactions
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsListResponse {
    /// List of transactions, most recent first
    pub transactions: Vec<TransactionResponse>,
    /// Total count
    #[schema(example = 12)]
    pub total_count: usize,
}

/// Delete operation response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTransactionResponse {
    /// Success message
    #[schema(example = "Transaction deleted successfully")]
    pub message: String,
    /// Deleted transaction ID
    pub id: i32,
}

/// Path parameters for transaction ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionIdPath {
    /// Transaction identifier
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn current_date_is_accepted() {
        assert!(validate_transaction_date(&(Utc::now() - Duration::hours(1))).is_ok());
    }

    #[test]
    fn future_date_is_rejected() {
        assert!(validate_transaction_date(&(Utc::now() + Duration::days(1))).is_err());
    }

    #[test]
    fn date_older_than_a_year_is_rejected() {
        assert!(validate_transaction_date(&(Utc::now() - Duration::days(400))).is_err());
    }

    #[test]
    fn zero_amount_is_rejected() {
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_positive_amount(&Decimal::from(-5)).is_err());
        assert!(validate_positive_amount(&Decimal::ONE).is_ok());
    }
}
