pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{list_account_categories, list_transaction_categories};
