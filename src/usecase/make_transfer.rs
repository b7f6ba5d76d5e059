//! Transfer orchestration
//!
//! ```text
//! LOADING_ACCOUNTS -> VALIDATING -> TX_OPEN -> PERSISTING_TRANSFER
//!     -> PERSISTING_BALANCES -> COMMITTED
//!                   (any failure after TX_OPEN) -> ROLLED_BACK
//! ```
//!
//! Nothing is written before the in-memory transfer succeeded. Once the
//! transaction is open, an error rolls it back exactly once and a panic
//! rolls it back before unwinding continues.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;

use super::rfc3339;
use crate::entity::{Account, Transfer};
use crate::error::AppError;
use crate::repository::{AccountRepository, Backend, Repositories, TransferRepository, TxGuard};

#[derive(Debug, Clone)]
pub struct MakeTransferInput {
    pub id: Option<String>,
    pub origin_account_id: String,
    pub destination_account_id: String,
    pub amount: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccountRef {
    pub id: String,
    pub name: String,
}

impl From<&Account> for AccountRef {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id().to_string(),
            name: account.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MakeTransferOutput {
    pub id: String,
    pub amount: i64,
    pub created_at: String,
    pub origin_account: AccountRef,
    pub destination_account: AccountRef,
}

impl From<&Transfer> for MakeTransferOutput {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: transfer.id().to_string(),
            amount: transfer.amount(),
            created_at: rfc3339(transfer.created_at()),
            origin_account: transfer.origin().into(),
            destination_account: transfer.destination().into(),
        }
    }
}

pub struct MakeTransfer<B: Backend> {
    repos: Repositories<B>,
}

impl<B: Backend> MakeTransfer<B> {
    pub fn new(repos: Repositories<B>) -> Self {
        Self { repos }
    }

    pub async fn execute(&self, input: MakeTransferInput) -> Result<MakeTransferOutput, AppError> {
        tracing::debug!(
            origin = %input.origin_account_id,
            destination = %input.destination_account_id,
            state = "LOADING_ACCOUNTS"
        );
        let origin = self
            .repos
            .accounts
            .find_by_id(&input.origin_account_id)
            .await?;
        let destination = self
            .repos
            .accounts
            .find_by_id(&input.destination_account_id)
            .await?;

        let mut transfer = Transfer::new(
            input.id,
            Some(origin),
            Some(destination),
            input.amount,
            input.created_at,
        )?;
        tracing::debug!(transfer_id = %transfer.id(), state = "VALIDATING");

        let observed = (transfer.origin().balance(), transfer.destination().balance());
        transfer.make_transfer()?;

        let mut guard = TxGuard::begin(&*self.repos.transactions).await?;
        tracing::debug!(transfer_id = %transfer.id(), state = "TX_OPEN");

        let outcome = AssertUnwindSafe(self.persist(&transfer, observed, guard.tx()))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {
                guard.commit().await?;
                tracing::info!(
                    transfer_id = %transfer.id(),
                    amount = transfer.amount(),
                    state = "COMMITTED",
                    "transfer committed"
                );
                Ok(MakeTransferOutput::from(&transfer))
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    transfer_id = %transfer.id(),
                    error = %e,
                    state = "ROLLED_BACK",
                    "transfer rolled back"
                );
                if let Err(rb) = guard.rollback().await {
                    tracing::error!(transfer_id = %transfer.id(), error = %rb, "rollback failed");
                }
                Err(e)
            }
            Err(panic) => {
                tracing::warn!(
                    transfer_id = %transfer.id(),
                    state = "ROLLED_BACK",
                    "panic while persisting transfer, rolling back"
                );
                if let Err(rb) = guard.rollback().await {
                    tracing::error!(transfer_id = %transfer.id(), error = %rb, "rollback failed");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    /// Transfer row first, then origin and destination balances.
    async fn persist(
        &self,
        transfer: &Transfer,
        (origin_before, destination_before): (i64, i64),
        mut tx: Option<&mut B::Tx>,
    ) -> Result<(), AppError> {
        tracing::debug!(transfer_id = %transfer.id(), state = "PERSISTING_TRANSFER");
        self.repos
            .transfers
            .create(transfer, tx.as_deref_mut())
            .await?;

        tracing::debug!(transfer_id = %transfer.id(), state = "PERSISTING_BALANCES");
        let origin = transfer.origin();
        self.repos
            .accounts
            .update_balance(
                origin.id(),
                origin_before,
                origin.balance(),
                tx.as_deref_mut(),
            )
            .await?;

        let destination = transfer.destination();
        self.repos
            .accounts
            .update_balance(
                destination.id(),
                destination_before,
                destination.balance(),
                tx.as_deref_mut(),
            )
            .await?;

        Ok(())
    }
}
