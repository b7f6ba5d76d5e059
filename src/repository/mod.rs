//! Repository abstractions
//!
//! Account storage, transfer storage and transaction control. The three
//! traits share one transaction handle type (`Tx`); every write takes an
//! `Option<&mut Tx>`, where `None` runs on the ambient pool connection.

pub mod postgres;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use std::sync::Arc;

use crate::entity::{Account, Transfer};
use crate::error::AppError;

pub use postgres::PostgresBackend;

/// Account persistence
#[async_trait]
pub trait AccountRepository: Send + Sync {
    type Tx: Send;

    /// Page of accounts (id, name, created_at populated)
    async fn find(&self, limit: i64, offset: i64) -> Result<Vec<Account>, AppError>;

    /// `NOT_FOUND` when no account has this id
    async fn find_by_id(&self, id: &str) -> Result<Account, AppError>;

    /// Lookup by digits-only CPF; `NOT_FOUND` when absent
    async fn find_by_document(&self, document: &str) -> Result<Account, AppError>;

    /// Insert; `CONFLICT` on a duplicate id or document
    async fn create(&self, account: &Account, tx: Option<&mut Self::Tx>) -> Result<(), AppError>;

    /// Overwrite the balance only if it still equals `expected_balance`.
    ///
    /// A lost race (stored balance changed since it was read) is `CONFLICT`.
    async fn update_balance(
        &self,
        account_id: &str,
        expected_balance: i64,
        new_balance: i64,
        tx: Option<&mut Self::Tx>,
    ) -> Result<(), AppError>;
}

/// Transfer persistence
#[async_trait]
pub trait TransferRepository: Send + Sync {
    type Tx: Send;

    /// Transfers sent by `account_id`, newest first
    async fn find_by_origin_account_id(
        &self,
        account_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, AppError>;

    /// Insert; `INTERNAL` unless exactly one row was written
    async fn create(&self, transfer: &Transfer, tx: Option<&mut Self::Tx>)
    -> Result<(), AppError>;
}

/// Transaction control
#[async_trait]
pub trait TransactionManager: Send + Sync {
    type Tx: Send;

    async fn begin_tx(&self) -> Result<Self::Tx, AppError>;

    async fn commit_tx(&self, tx: Self::Tx) -> Result<(), AppError>;

    async fn rollback_tx(&self, tx: Self::Tx) -> Result<(), AppError>;

    /// Storage liveness check
    async fn health_check(&self) -> Result<(), AppError>;
}

/// One storage backend: the three repositories over a common `Tx`
pub trait Backend: Send + Sync + 'static {
    type Tx: Send + 'static;
    type Accounts: AccountRepository<Tx = Self::Tx> + 'static;
    type Transfers: TransferRepository<Tx = Self::Tx> + 'static;
    type Transactions: TransactionManager<Tx = Self::Tx> + 'static;
}

/// Shared handles to a backend's repositories
pub struct Repositories<B: Backend> {
    pub accounts: Arc<B::Accounts>,
    pub transfers: Arc<B::Transfers>,
    pub transactions: Arc<B::Transactions>,
}

impl<B: Backend> Repositories<B> {
    pub fn new(
        accounts: Arc<B::Accounts>,
        transfers: Arc<B::Transfers>,
        transactions: Arc<B::Transactions>,
    ) -> Self {
        Self {
            accounts,
            transfers,
            transactions,
        }
    }
}

impl<B: Backend> Clone for Repositories<B> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            transfers: Arc::clone(&self.transfers),
            transactions: Arc::clone(&self.transactions),
        }
    }
}

/// Scoped owner of an open transaction.
///
/// `commit` and `rollback` consume the guard. A guard dropped while still
/// holding its handle (panic, cancelled future) drops the handle, and the
/// storage adapter rolls back on drop.
pub struct TxGuard<'a, M: TransactionManager> {
    manager: &'a M,
    tx: Option<M::Tx>,
}

impl<'a, M: TransactionManager> TxGuard<'a, M> {
    pub async fn begin(manager: &'a M) -> Result<Self, AppError> {
        let tx = manager.begin_tx().await?;
        Ok(Self {
            manager,
            tx: Some(tx),
        })
    }

    /// Handle to pass to repository writes
    pub fn tx(&mut self) -> Option<&mut M::Tx> {
        self.tx.as_mut()
    }

    pub async fn commit(mut self) -> Result<(), AppError> {
        match self.tx.take() {
            Some(tx) => self.manager.commit_tx(tx).await,
            None => Err(AppError::internal("transaction already finished")),
        }
    }

    pub async fn rollback(mut self) -> Result<(), AppError> {
        match self.tx.take() {
            Some(tx) => self.manager.rollback_tx(tx).await,
            None => Err(AppError::internal("transaction already finished")),
        }
    }
}

impl<M: TransactionManager> Drop for TxGuard<'_, M> {
    fn drop(&mut self) {
        if self.tx.take().is_some() {
            tracing::warn!("transaction dropped while open, rolling back");
        }
    }
}
