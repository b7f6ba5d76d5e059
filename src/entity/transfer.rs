//! Transfer entity
//!
//! One directed movement of funds between two accounts. The transfer owns
//! both accounts for the duration of a single orchestration call and
//! mutates their in-memory balances in [`Transfer::make_transfer`].

use chrono::{DateTime, Utc};

use super::account::Account;
use super::new_id;
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    id: String,
    origin: Account,
    destination: Account,
    amount: i64,
    created_at: DateTime<Utc>,
}

impl Transfer {
    /// Create a new validated transfer.
    ///
    /// Absent accounts, a non-positive amount and a missing timestamp are
    /// all reported together as one `ENTITY_VALIDATION` error.
    pub fn new(
        id: Option<String>,
        origin: Option<Account>,
        destination: Option<Account>,
        amount: i64,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, AppError> {
        let mut err = AppError::new(ErrorKind::EntityValidation);

        if origin.is_none() {
            err.push("origin account cannot be empty");
        }

        if destination.is_none() {
            err.push("destination account cannot be empty");
        }

        if amount < 0 {
            err.push("amount cannot be negative");
        } else if amount == 0 {
            err.push("amount must be greater than zero");
        }

        if created_at.is_none() {
            err.push("created at cannot be empty");
        }

        let (Some(origin), Some(destination), Some(created_at)) = (origin, destination, created_at)
        else {
            return Err(err);
        };
        err.into_result()?;

        Ok(Self {
            id: id.filter(|s| !s.is_empty()).unwrap_or_else(new_id),
            origin,
            destination,
            amount,
            created_at,
        })
    }

    /// Rebuild a transfer read back from storage; no validation.
    pub fn restore(
        id: String,
        origin: Account,
        destination: Account,
        amount: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            origin,
            destination,
            amount,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> &Account {
        &self.origin
    }

    pub fn destination(&self) -> &Account {
        &self.destination
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply the transfer to the in-memory balances.
    ///
    /// The credit is checked for overflow up front, then the origin is
    /// debited and only after that the destination credited. A failure
    /// leaves both balances untouched.
    pub fn make_transfer(&mut self) -> Result<(), AppError> {
        if self.origin.id() == self.destination.id() {
            return Err(AppError::entity_validation(
                "origin and destination must differ",
            ));
        }

        self.destination.ensure_can_receive(self.amount)?;
        self.origin.remove_from_balance(self.amount)?;
        self.destination.add_to_balance(self.amount)
    }
}
