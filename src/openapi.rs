use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::models::{
    AccountResponse, AccountsListResponse, CreateAccountDto, UpdateAccountDto,
};
use crate::auth::models::{AuthTokenResponse, SigninDto, SignupDto, UserResponse};
use crate::category::models::CategoryResponse;
use crate::errors::ErrorResponse;
use crate::ledger::TransactionType;
use crate::transaction::models::{
    CreateTransactionDto, DeleteTransactionResponse, TransactionResponse,
    TransactionsListResponse, UpdateTransactionDto,
};
use crate::transfer::models::{
    CreateTransferDto, TransferResponse, TransfersListResponse,
};

/// Security scheme modifier for Bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FinTrack API",
        version = "1.0.0",
        description = "RESTful API for personal finance tracking with double-entry transfers",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Authentication and user management"),
        (name = "Accounts", description = "Financial account management"),
        (name = "Categories", description = "Seeded category lookups"),
        (name = "Transactions", description = "Transaction management with atomic balance updates"),
        (name = "Transfers", description = "Atomic transfers between accounts")
    ),
    paths(
        // Auth endpoints
        crate::auth::handlers::signup,
        crate::auth::handlers::signin,
        crate::auth::handlers::me,
        // Account endpoints
        crate::account::handlers::list_accounts,
        crate::account::handlers::create_account,
        crate::account::handlers::update_account,
        // Category endpoints
        crate::category::handlers::list_account_categories,
        crate::category::handlers::list_transaction_categories,
        // Transaction endpoints
        crate::transaction::handlers::list_transactions,
        crate::transaction::handlers::create_transaction,
        crate::transaction::handlers::update_transaction,
        crate::transaction::handlers::delete_transaction,
        // Transfer endpoints
        crate::transfer::handlers::create_transfer,
        crate::transfer::handlers::list_transfers,
        crate::transfer::handlers::get_transfer,
    ),
    components(
        schemas(
            // Error response
            ErrorResponse,
            // Auth schemas
            SignupDto,
            SigninDto,
            UserResponse,
            AuthTokenResponse,
            // Account schemas
            AccountResponse,
            AccountsListResponse,
            CreateAccountDto,
            UpdateAccountDto,
            // Category schemas
            CategoryResponse,
            // Transaction schemas
            TransactionType,
            TransactionResponse,
            TransactionsListResponse,
            CreateTransactionDto,
            UpdateTransactionDto,
            DeleteTransactionResponse,
            // Transfer schemas
            TransferResponse,
            TransfersListResponse,
            CreateTransferDto,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
