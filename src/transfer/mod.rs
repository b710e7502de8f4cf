pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{create_transfer, get_transfer, list_transfers};
