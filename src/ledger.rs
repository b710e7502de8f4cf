use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

/// How many times a balance write is retried when the optimistic version
/// check loses to a concurrent writer, before giving up with a conflict.
pub const MAX_BALANCE_RETRIES: u32 = 3;

/// Direction of a transaction's effect on an account balance.
///
/// Stored as a single character: "C" credits (increases) the balance,
/// "D" debits (decreases) it. Amounts are always positive magnitudes;
/// the direction comes solely from this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TransactionType {
    /// Money received (increases account balance)
    #[serde(rename = "C")]
    Credit,
    /// Money spent (decreases account balance)
    #[serde(rename = "D")]
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "C",
            TransactionType::Debit => "D",
        }
    }

    /// Parse the canonical code. Anything else, including the legacy
    /// income/expense codes "I"/"E", is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "C" => Some(TransactionType::Credit),
            "D" => Some(TransactionType::Debit),
            _ => None,
        }
    }
}

/// The signed effect a transaction has on its account balance.
pub fn signed_effect(amount: Decimal, transaction_type: TransactionType) -> Decimal {
    match transaction_type {
        TransactionType::Credit => amount,
        TransactionType::Debit => -amount,
    }
}

/// Apply a transaction's effect to a balance, returning the new balance.
///
/// A debit larger than the current balance is refused: accounts are not
/// allowed to be overdrawn.
pub fn apply(
    balance: Decimal,
    amount: Decimal,
    transaction_type: TransactionType,
) -> Result<Decimal, AppError> {
    if transaction_type == TransactionType::Debit && amount > balance {
        return Err(AppError::InsufficientFunds(
            "Insufficient balance to debit this amount".to_string(),
        ));
    }
    Ok(balance + signed_effect(amount, transaction_type))
}

/// Undo a previously applied effect, returning the restored balance.
///
/// Reversing a credit claws the amount back out of the balance, so it fails
/// the same way a debit does when the funds have already been spent by a
/// later debit. That situation signals a conflicting mutation, not normal
/// operation.
pub fn reverse(
    balance: Decimal,
    amount: Decimal,
    transaction_type: TransactionType,
) -> Result<Decimal, AppError> {
    if transaction_type == TransactionType::Credit && amount > balance {
        return Err(AppError::InsufficientFunds(
            "Insufficient balance to reverse this credit".to_string(),
        ));
    }
    Ok(balance - signed_effect(amount, transaction_type))
}
