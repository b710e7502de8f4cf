use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// The slice of an account row the ledger operations work on.
///
/// `version` is bumped on every balance write; balance updates are a
/// compare-and-swap against it so concurrent writers cannot silently
/// overwrite each other's arithmetic.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i32,
    #[allow(dead_code)]
    pub user_id: i32,
    pub name: String,
    pub balance: Decimal,
    pub version: i32,
}

/// Account row joined with its category name for responses
#[derive(Debug, Clone, FromRow)]
pub struct AccountRecord {
    pub id: i32,
    pub name: String,
    pub account_category_id: i32,
    pub account_category_name: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Unique account identifier
    pub id: i32,
    /// Account name
    #[schema(example = "Everyday Checking")]
    pub name: String,
    /// Account category this account belongs to
    pub account_category_id: i32,
    /// Resolved category name
    #[schema(example = "Checking")]
    pub account_category_name: String,
    /// Current balance
    #[schema(example = 1500.00)]
    pub balance: Decimal,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRecord> for AccountResponse {
    fn from(record: AccountRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            account_category_id: record.account_category_id,
            account_category_name: record.account_category_name,
            balance: record.balance,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response for listing accounts
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountsListResponse {
    /// List of accounts
    pub accounts: Vec<AccountResponse>,
    /// Total count
    #[schema(example = 3)]
    pub total_count: usize,
}

/// Request body for creating an account
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountDto {
    /// Account name (1-20 characters)
    #[validate(length(min = 1, max = 20, message = "Name must be 1-20 characters"))]
    #[schema(example = "Everyday Checking")]
    pub name: String,

    /// Account category
    #[validate(range(min = 1, message = "Account category id invalid"))]
    pub account_category_id: i32,
}

/// Request body for updating an account
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountDto {
    /// Account name (1-20 characters)
    #[validate(length(min = 1, max = 20, message = "Name must be 1-20 characters"))]
    #[schema(example = "Holiday Savings")]
    pub name: String,

    /// Account category
    #[validate(range(min = 1, message = "Account category id invalid"))]
    pub account_category_id: i32,
}

/// Path parameters for account ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct AccountIdPath {
    /// Account identifier
    pub id: i32,
}
