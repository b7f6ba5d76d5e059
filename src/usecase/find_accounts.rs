//! Paginated account listing

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::{DEFAULT_ACCOUNT_PAGE, page_window};
use crate::error::AppError;
use crate::repository::AccountRepository;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct FindAccounts<A> {
    accounts: Arc<A>,
}

impl<A: AccountRepository> FindAccounts<A> {
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    /// Page of accounts; `limit == 0` means the default page size
    pub async fn execute(&self, limit: i64, offset: i64) -> Result<Vec<AccountSummary>, AppError> {
        let (limit, offset) = page_window(limit, offset, DEFAULT_ACCOUNT_PAGE)?;

        let accounts = self.accounts.find(limit, offset).await?;
        Ok(accounts
            .iter()
            .map(|a| AccountSummary {
                id: a.id().to_string(),
                name: a.name().to_string(),
                created_at: a.created_at(),
            })
            .collect())
    }
}
