use actix_web::{get, patch, post, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{
    AccountIdPath, AccountResponse, AccountsListResponse, CreateAccountDto, UpdateAccountDto,
};
use super::service::AccountService;

/// GET /accounts - List the caller's accounts
#[utoipa::path(
    get,
    path = "/accounts",
    tag = "Accounts",
    responses(
        (status = 200, description = "List of accounts", body = AccountsListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/accounts")]
pub async fn list_accounts(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let accounts = AccountService::list_accounts(pool.get_ref(), auth.user_id).await?;

    let accounts: Vec<AccountResponse> = accounts.into_iter().map(Into::into).collect();
    let total_count = accounts.len();

    Ok(HttpResponse::Ok().json(AccountsListResponse {
        accounts,
        total_count,
    }))
}

/// POST /accounts - Create a new account with a zero balance
#[utoipa::path(
    post,
    path = "/accounts",
    tag = "Accounts",
    request_body = CreateAccountDto,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Account category not found", body = ErrorResponse),
        (status = 409, description = "Duplicate account name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/accounts")]
pub async fn create_account(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<CreateAccountDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let account = AccountService::create_account(pool.get_ref(), auth.user_id, &body).await?;

    Ok(HttpResponse::Created().json(AccountResponse::from(account)))
}

/// PATCH /accounts/{id} - Rename an account or move it to another category
#[utoipa::path(
    patch,
    path = "/accounts/{id}",
    tag = "Accounts",
    params(AccountIdPath),
    request_body = UpdateAccountDto,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 409, description = "Duplicate account name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[patch("/accounts/{id}")]
pub async fn update_account(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<AccountIdPath>,
    body: web::Json<UpdateAccountDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let account =
        AccountService::update_account(pool.get_ref(), path.id, auth.user_id, &body).await?;

    Ok(HttpResponse::Ok().json(AccountResponse::from(account)))
}
