//! PostgreSQL repositories
//!
//! Balance writes are compare-and-swap: `UPDATE ... WHERE id = $ AND
//! balance = $expected`, so two transfers racing on the same account cannot
//! both apply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;

use super::{AccountRepository, Backend, Repositories, TransactionManager, TransferRepository};
use crate::entity::{Account, Transfer};
use crate::error::AppError;

/// Open PostgreSQL transaction; rolls back when dropped uncommitted
pub struct PgTx(Transaction<'static, Postgres>);

/// Marker for the PostgreSQL backend
pub struct PostgresBackend;

impl Backend for PostgresBackend {
    type Tx = PgTx;
    type Accounts = PgAccountRepository;
    type Transfers = PgTransferRepository;
    type Transactions = PgTransactionManager;
}

const MAX_CONNECTIONS: u32 = 20;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

impl PostgresBackend {
    /// Open a pool with fixed limits and build the repositories over it
    pub async fn connect(database_url: &str) -> Result<Repositories<Self>, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections = MAX_CONNECTIONS, "PostgreSQL pool established");
        Ok(Self::repositories(pool))
    }

    /// All three repositories over one pool
    pub fn repositories(pool: PgPool) -> Repositories<Self> {
        Repositories::new(
            PgAccountRepository::new(pool.clone()).into(),
            PgTransferRepository::new(pool.clone()).into(),
            PgTransactionManager::new(pool).into(),
        )
    }
}

pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, AppError> {
    Ok(Account::restore(
        row.try_get("id")?,
        row.try_get("name")?,
        row.try_get("cpf")?,
        row.try_get("secret")?,
        row.try_get("balance")?,
        row.try_get("created_at")?,
    ))
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    type Tx = PgTx;

    async fn find(&self, limit: i64, offset: i64) -> Result<Vec<Account>, AppError> {
        // Listing never exposes documents or secret hashes
        let rows = sqlx::query(
            r#"
            SELECT id, name, ''::TEXT AS cpf, ''::TEXT AS secret, balance, created_at
            FROM account
            ORDER BY created_at, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(account_from_row).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Account, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, ''::TEXT AS cpf, ''::TEXT AS secret, balance, created_at
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => account_from_row(&row),
            None => Err(AppError::not_found(format!("not found account: {}", id))),
        }
    }

    async fn find_by_document(&self, document: &str) -> Result<Account, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, cpf, secret, balance, created_at
            FROM account
            WHERE cpf = $1
            "#,
        )
        .bind(document)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => account_from_row(&row),
            None => Err(AppError::not_found(format!(
                "not found account by CPF: {}",
                document
            ))),
        }
    }

    async fn create(&self, account: &Account, tx: Option<&mut PgTx>) -> Result<(), AppError> {
        let query = sqlx::query(
            r#"
            INSERT INTO account (id, name, cpf, secret, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id())
        .bind(account.name())
        .bind(account.document())
        .bind(account.secret_hash())
        .bind(account.balance())
        .bind(account.created_at());

        match tx {
            Some(tx) => query.execute(&mut *tx.0).await?,
            None => query.execute(&self.pool).await?,
        };

        Ok(())
    }

    async fn update_balance(
        &self,
        account_id: &str,
        expected_balance: i64,
        new_balance: i64,
        tx: Option<&mut PgTx>,
    ) -> Result<(), AppError> {
        let query = sqlx::query(
            r#"
            UPDATE account
            SET balance = $1
            WHERE id = $2 AND balance = $3
            "#,
        )
        .bind(new_balance)
        .bind(account_id)
        .bind(expected_balance);

        let result = match tx {
            Some(tx) => query.execute(&mut *tx.0).await?,
            None => query.execute(&self.pool).await?,
        };

        if result.rows_affected() != 1 {
            tracing::warn!(
                account_id = %account_id,
                expected_balance,
                "balance changed concurrently"
            );
            return Err(AppError::conflict(format!(
                "balance of account {} was modified concurrently",
                account_id
            )));
        }

        Ok(())
    }
}

pub struct PgTransferRepository {
    pool: PgPool,
}

impl PgTransferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransferRepository for PgTransferRepository {
    type Tx = PgTx;

    async fn find_by_origin_account_id(
        &self,
        account_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.amount, t.created_at,
                   o.id AS origin_id, o.name AS origin_name, o.created_at AS origin_created_at,
                   d.id AS destination_id, d.name AS destination_name,
                   d.created_at AS destination_created_at
            FROM transfer t
            INNER JOIN account o ON t.origin_account_id = o.id
            INNER JOIN account d ON t.destination_account_id = d.id
            WHERE t.origin_account_id = $1
            ORDER BY t.created_at DESC, t.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Transfer, AppError> {
                let origin = Account::restore(
                    row.try_get("origin_id")?,
                    row.try_get("origin_name")?,
                    String::new(),
                    String::new(),
                    0,
                    row.try_get("origin_created_at")?,
                );
                let destination = Account::restore(
                    row.try_get("destination_id")?,
                    row.try_get("destination_name")?,
                    String::new(),
                    String::new(),
                    0,
                    row.try_get("destination_created_at")?,
                );
                let created_at: DateTime<Utc> = row.try_get("created_at")?;
                Ok(Transfer::restore(
                    row.try_get("id")?,
                    origin,
                    destination,
                    row.try_get("amount")?,
                    created_at,
                ))
            })
            .collect()
    }

    async fn create(&self, transfer: &Transfer, tx: Option<&mut PgTx>) -> Result<(), AppError> {
        let query = sqlx::query(
            r#"
            INSERT INTO transfer (id, origin_account_id, destination_account_id, amount, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(transfer.id())
        .bind(transfer.origin().id())
        .bind(transfer.destination().id())
        .bind(transfer.amount())
        .bind(transfer.created_at());

        let result = match tx {
            Some(tx) => query.execute(&mut *tx.0).await?,
            None => query.execute(&self.pool).await?,
        };

        if result.rows_affected() != 1 {
            return Err(AppError::internal("unexpected number of affected rows"));
        }

        Ok(())
    }
}

pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    type Tx = PgTx;

    async fn begin_tx(&self) -> Result<PgTx, AppError> {
        Ok(PgTx(self.pool.begin().await?))
    }

    async fn commit_tx(&self, tx: PgTx) -> Result<(), AppError> {
        tx.0.commit().await?;
        Ok(())
    }

    async fn rollback_tx(&self, tx: PgTx) -> Result<(), AppError> {
        tx.0.rollback().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
