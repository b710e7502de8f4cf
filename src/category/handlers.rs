use actix_web::{get, web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::CategoryResponse;
use super::service::CategoryService;

/// GET /categories/accounts - List the seeded account categories
#[utoipa::path(
    get,
    path = "/categories/accounts",
    tag = "Categories",
    responses(
        (status = 200, description = "List of account categories", body = Vec<CategoryResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/categories/accounts")]
pub async fn list_account_categories(
    pool: web::Data<PgPool>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let categories = CategoryService::list_account_categories(pool.get_ref()).await?;

    let response: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /categories/transactions - List the seeded transaction categories
#[utoipa::path(
    get,
    path = "/categories/transactions",
    tag = "Categories",
    responses(
        (status = 200, description = "List of transaction categories", body = Vec<CategoryResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/categories/transactions")]
pub async fn list_transaction_categories(
    pool: web::Data<PgPool>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let categories = CategoryService::list_transaction_categories(pool.get_ref()).await?;

    let response: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}
