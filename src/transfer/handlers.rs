use actix_web::{get, post, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::models::{
    CreateTransferDto, TransferIdPath, TransferResponse, TransfersListResponse,
};
use super::service::TransferService;

/// POST /transfers - Move money between two of the caller's accounts
#[utoipa::path(
    post,
    path = "/transfers",
    tag = "Transfers",
    request_body = CreateTransferDto,
    responses(
        (status = 201, description = "Transfer completed", body = TransferResponse),
        (status = 400, description = "Same account, insufficient funds or validation error", body = ErrorResponse),
        (status = 404, description = "Source or destination account not found", body = ErrorResponse),
        (status = 409, description = "Concurrent balance update conflict", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[post("/transfers")]
pub async fn create_transfer(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    body: web::Json<CreateTransferDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let transfer = TransferService::create_transfer(pool.get_ref(), auth.user_id, &body).await?;

    Ok(HttpResponse::Created().json(TransferResponse::from(transfer)))
}

/// GET /transfers - List the caller's transfers
#[utoipa::path(
    get,
    path = "/transfers",
    tag = "Transfers",
    responses(
        (status = 200, description = "List of transfers, most recent first", body = TransfersListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/transfers")]
pub async fn list_transfers(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let transfers = TransferService::list_transfers(pool.get_ref(), auth.user_id).await?;

    let transfers: Vec<TransferResponse> = transfers.into_iter().map(Into::into).collect();
    let total_count = transfers.len();

    Ok(HttpResponse::Ok().json(TransfersListResponse {
        transfers,
        total_count,
    }))
}

/// GET /transfers/{id} - Fetch a single transfer
#[utoipa::path(
    get,
    path = "/transfers/{id}",
    tag = "Transfers",
    params(TransferIdPath),
    responses(
        (status = 200, description = "Transfer details", body = TransferResponse),
        (status = 404, description = "Transfer not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/transfers/{id}")]
pub async fn get_transfer(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<TransferIdPath>,
) -> Result<HttpResponse, AppError> {
    let transfer = TransferService::get_transfer(pool.get_ref(), auth.user_id, path.id).await?;

    Ok(HttpResponse::Ok().json(TransferResponse::from(transfer)))
}
