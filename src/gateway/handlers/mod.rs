pub mod account;
pub mod health;
pub mod transfer;

pub use account::{create_account, get_balance, list_accounts, login};
pub use health::health_check;
pub use transfer::{create_transfer, list_transfers};

use crate::error::AppError;

/// Unknown path
pub async fn route_not_found() -> AppError {
    AppError::not_found("route does not exist")
}

/// Known path, unsupported method
pub async fn method_not_allowed() -> AppError {
    AppError::not_allowed("method not allowed")
}
