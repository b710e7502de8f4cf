use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{
    CreateTransactionDto, DeleteTransactionResponse, TransactionFilters, TransactionIdPath,
    TransactionResponse, TransactionsListResponse, UpdateTransactionDto,
};
use super::service::TransactionService;

/// GET /transactions - List transactions, optionally scoped to an account
/// (and within it, a category)
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "Transactions",
    params(TransactionFilters),
    responses(
        (status = 200, description = "List of transactions, most recent first", body = TransactionsListResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/transactions")]
pub async fn list_transactions(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    query: web::Query<TransactionFilters>,
) -> Result<HttpResponse, AppError> {
    let transactions =
        TransactionService::list_transactions(pool.get_ref(), auth.user_id, &query).await?;

    let transactions: Vec<TransactionResponse> =
        transactions.into_iter().map(Into::into).collect();
    let total_count = transactions.len();

    Ok(HttpResponse::Ok().json(TransactionsListResponse {
        transactions,
        total_count,
    }))
}

/// POST /transactions - Create a transaction (atomically updates the account balance)
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "Transactions",
    request_body = CreateTransactionDto,
    responses(
        (status = 201, description = "Transaction created", body = TransactionResponse),
        (status = 400, description = "Validation error or insufficient funds", body = ErrorResponse),
        (status = 404, description = "Account or category not found", body = ErrorResponse),
        (status = 409, description = "Concurrent balance update conflict", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/transactions")]
pub async fn create_transaction(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<CreateTransactionDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let transaction =
        TransactionService::create_transaction(pool.get_ref(), auth.user_id, &body).await?;

    Ok(HttpResponse::Created().json(TransactionResponse::from(transaction)))
}

/// PUT /transactions/{id} - Replace a transaction (reverses the old balance
/// effect, then applies the new one)
#[utoipa::path(
    put,
    path = "/transactions/{id}",
    tag = "Transactions",
    params(TransactionIdPath),
    request_body = UpdateTransactionDto,
    responses(
        (status = 200, description = "Transaction updated", body = TransactionResponse),
        (status = 400, description = "Validation error or insufficient funds", body = ErrorResponse),
        (status = 404, description = "Transaction or account not found", body = ErrorResponse),
        (status = 409, description = "Concurrent balance update conflict", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[put("/transactions/{id}")]
pub async fn update_transaction(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<TransactionIdPath>,
    body: web::Json<UpdateTransactionDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let transaction =
        TransactionService::update_transaction(pool.get_ref(), auth.user_id, path.id, &body)
            .await?;

    Ok(HttpResponse::Ok().json(TransactionResponse::from(transaction)))
}

/// DELETE /transactions/{id} - Delete a transaction (restores the account balance)
#[utoipa::path(
    delete,
    path = "/transactions/{id}",
    tag = "Transactions",
    params(TransactionIdPath),
    responses(
        (status = 200, description = "Transaction deleted", body = DeleteTransactionResponse),
        (status = 400, description = "Insufficient funds to reverse", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/transactions/{id}")]
pub async fn delete_transaction(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<TransactionIdPath>,
) -> Result<HttpResponse, AppError> {
    TransactionService::delete_transaction(pool.get_ref(), auth.user_id, path.id).await?;

    Ok(HttpResponse::Ok().json(DeleteTransactionResponse {
        message: "Transaction deleted successfully".to_string(),
        id: path.id,
    }))
}
