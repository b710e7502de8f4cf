use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Validate that amount is positive
fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    Ok(())
}

/// Transfer row joined with the source and destination account names.
///
/// A transfer never exists without its two transaction legs, but the leg ids
/// are nullable: a leg could in principle be removed independently, and the
/// transfer record must survive that.
#[derive(Debug, Clone, FromRow)]
pub struct TransferRecord {
    pub id: i32,
    pub amount: Decimal,
    pub transfer_date: DateTime<Utc>,
    pub from_account_id: i32,
    pub from_account_name: String,
    pub to_account_id: i32,
    pub to_account_name: String,
    pub description: Option<String>,
    pub reference_number: String,
    pub debit_transaction_id: Option<i32>,
    pub credit_transaction_id: Option<i32>,
}

/// Transfer information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    /// Unique transfer identifier
    pub id: i32,
    /// Transferred amount
    #[schema(example = 250.00)]
    pub amount: Decimal,
    /// Date of the transfer
    pub transfer_date: DateTime<Utc>,
    /// Source account
    pub from_account_id: i32,
    /// Resolved source account name
    #[schema(example = "Everyday Checking")]
    pub from_account_name: String,
    /// Destination account
    pub to_account_id: i32,
    /// Resolved destination account name
    #[schema(example = "Holiday Savings")]
    pub to_account_name: String,
    /// Optional description
    #[schema(example = "Monthly savings")]
    pub description: Option<String>,
    /// Human-readable reference number
    #[schema(example = "TXF-20250801094512-7F3A2B1C")]
    pub reference_number: String,
    /// Debit leg booked against the source account
    pub debit_transaction_id: Option<i32>,
    /// Credit leg booked against the destination account
    pub credit_transaction_id: Option<i32>,
}

impl From<TransferRecord> for TransferResponse {
    fn from(record: TransferRecord) -> Self {
        Self {
            id: record.id,
            amount: record.amount,
            transfer_date: record.transfer_date,
            from_account_id: record.from_account_id,
            from_account_name: record.from_account_name,
            to_account_id: record.to_account_id,
            to_account_name: record.to_account_name,
            description: record.description,
            reference_number: record.reference_number,
            debit_transaction_id: record.debit_transaction_id,
            credit_transaction_id: record.credit_transaction_id,
        }
    }
}

/// Request body for creating a transfer
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferDto {
    /// Source account (must belong to the caller)
    pub from_account_id: i32,

    /// Destination account (must belong to the caller, different from source)
    pub to_account_id: i32,

    /// Amount to move (must be positive)
    #[validate(custom(
        function = "validate_positive_amount",
        message = "Transfer amount must be greater than 0"
    ))]
    #[schema(example = 250.00)]
    pub amount: Decimal,

    /// Date of the transfer
    pub transfer_date: DateTime<Utc>,

    /// Optional description (max 500 chars)
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    #[schema(example = "Monthly savings")]
    pub description: Option<String>,
}

/// Response for listing transfers
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransfersListResponse {
    /// List of transfers, most recent first
    pub transfers: Vec<TransferResponse>,
    /// Total count
    #[schema(example = 4)]
    pub total_count: usize,
}

/// Path parameters for transfer ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransferIdPath {
    /// Transfer identifier
    pub id: i32,
}
