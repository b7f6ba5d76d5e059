//! Transfers sent by one account, newest first

use serde::Serialize;
use std::sync::Arc;

use super::{AccountRef, DEFAULT_TRANSFER_PAGE, page_window, rfc3339};
use crate::error::AppError;
use crate::repository::TransferRepository;

/// One sent transfer as seen by its origin account
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransferSummary {
    pub id: String,
    pub amount: i64,
    pub created_at: String,
    pub destination_account: AccountRef,
}

pub struct FindTransfers<T> {
    transfers: Arc<T>,
}

impl<T: TransferRepository> FindTransfers<T> {
    pub fn new(transfers: Arc<T>) -> Self {
        Self { transfers }
    }

    pub async fn execute(
        &self,
        account_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransferSummary>, AppError> {
        let (limit, offset) = page_window(limit, offset, DEFAULT_TRANSFER_PAGE)?;

        let transfers = self
            .transfers
            .find_by_origin_account_id(account_id, limit, offset)
            .await?;

        Ok(transfers
            .iter()
            .map(|t| TransferSummary {
                id: t.id().to_string(),
                amount: t.amount(),
                created_at: rfc3339(t.created_at()),
                destination_account: t.destination().into(),
            })
            .collect())
    }
}
