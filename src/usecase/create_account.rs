//! Account creation

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::entity::Account;
use crate::error::AppError;
use crate::repository::AccountRepository;

#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    pub id: Option<String>,
    pub name: String,
    pub cpf: String,
    pub secret: String,
    pub balance: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateAccountOutput {
    pub id: String,
    pub name: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

pub struct CreateAccount<A> {
    accounts: Arc<A>,
}

impl<A: AccountRepository> CreateAccount<A> {
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    pub async fn execute(&self, input: CreateAccountInput) -> Result<CreateAccountOutput, AppError> {
        let account = Account::new(
            input.id,
            input.name,
            input.cpf,
            &input.secret,
            input.balance,
            input.created_at,
        )?;

        self.accounts.create(&account, None).await?;
        tracing::info!(account_id = %account.id(), "account created");

        Ok(CreateAccountOutput {
            id: account.id().to_string(),
            name: account.name().to_string(),
            balance: account.balance(),
            created_at: account.created_at(),
        })
    }
}
