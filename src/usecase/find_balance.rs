//! Balance lookup for the account holder

use serde::Serialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::repository::AccountRepository;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct BalanceOutput {
    pub balance: i64,
}

pub struct FindBalance<A> {
    accounts: Arc<A>,
}

impl<A: AccountRepository> FindBalance<A> {
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    /// Balance of `account_id`. When `requester` is given it must own the
    /// account.
    pub async fn execute(
        &self,
        account_id: &str,
        requester: Option<&str>,
    ) -> Result<BalanceOutput, AppError> {
        let account = self.accounts.find_by_id(account_id).await?;
        if let Some(requester) = requester {
            account.ensure_owned_by(requester)?;
        }
        Ok(BalanceOutput {
            balance: account.balance(),
        })
    }
}
