//! Orchestration
//!
//! Each use case loads entities through the repository traits, applies the
//! domain rules and persists the result. Errors pass through unchanged.

pub mod create_account;
pub mod find_accounts;
pub mod find_balance;
pub mod find_transfers;
pub mod login;
pub mod make_transfer;

pub use create_account::{CreateAccount, CreateAccountInput, CreateAccountOutput};
pub use find_accounts::{AccountSummary, FindAccounts};
pub use find_balance::{BalanceOutput, FindBalance};
pub use find_transfers::{FindTransfers, TransferSummary};
pub use login::{Login, LoginInput, LoginOutput};
pub use make_transfer::{AccountRef, MakeTransfer, MakeTransferInput, MakeTransferOutput};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::AppError;

pub const DEFAULT_ACCOUNT_PAGE: i64 = 10;
pub const DEFAULT_TRANSFER_PAGE: i64 = 20;

/// Resolve a requested page: 0 means `default_limit`, negatives are rejected
pub(crate) fn page_window(
    limit: i64,
    offset: i64,
    default_limit: i64,
) -> Result<(i64, i64), AppError> {
    let mut err = AppError::bad_request("invalid pagination");
    let mut bad = false;
    if limit < 0 {
        err.push("limit cannot be negative");
        bad = true;
    }
    if offset < 0 {
        err.push("offset cannot be negative");
        bad = true;
    }
    if bad {
        return Err(err);
    }

    let limit = if limit == 0 { default_limit } else { limit };
    Ok((limit, offset))
}

pub(crate) fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
