//! Account entity
//!
//! An account holds an integer balance that never goes negative. The secret
//! is hashed (argon2, PHC string) at construction and never kept in clear.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use std::fmt;

use super::document;
use super::new_id;
use crate::error::{AppError, ErrorKind};

/// Holder of funds
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    id: String,
    name: String,
    document: String,
    secret_hash: String,
    balance: i64,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new validated account.
    ///
    /// A UUID is generated when `id` is `None` or empty. Every violated rule
    /// is reported in one `ENTITY_VALIDATION` error. On success the document
    /// is stored digits-only and the secret is replaced by its hash.
    pub fn new(
        id: Option<String>,
        name: impl Into<String>,
        document: impl Into<String>,
        secret: &str,
        balance: i64,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, AppError> {
        let name = name.into();
        let document = document.into();
        let mut err = AppError::new(ErrorKind::EntityValidation);

        if name.trim().is_empty() {
            err.push("name cannot be empty");
        }

        if document.trim().is_empty() {
            err.push("CPF cannot be empty");
        } else if !document::is_valid_cpf(&document) {
            err.push("CPF is invalid");
        }

        if secret.is_empty() {
            err.push("secret cannot be empty");
        }

        if balance < 0 {
            err.push("balance cannot be negative");
        }

        if created_at.is_none() {
            err.push("created at cannot be empty");
        }

        err.into_result()?;

        let secret_hash = hash_secret(secret)?;

        Ok(Self {
            id: id.filter(|s| !s.is_empty()).unwrap_or_else(new_id),
            name,
            document: document::clean(&document),
            secret_hash,
            balance,
            created_at: created_at.unwrap_or_default(),
        })
    }

    /// Rebuild an account read back from storage.
    ///
    /// No validation and no hashing: storage projections may leave the
    /// document or secret hash empty.
    pub fn restore(
        id: String,
        name: String,
        document: String,
        secret_hash: String,
        balance: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            document,
            secret_hash,
            balance,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Verify a candidate secret against the stored hash
    pub fn secret_is_correct(&self, candidate: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.secret_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }

    /// Reject access by anyone other than the account holder
    pub fn ensure_owned_by(&self, account_id: &str) -> Result<(), AppError> {
        if self.id != account_id {
            return Err(AppError::bad_request(
                "account does not belong to the authenticated caller",
            ));
        }
        Ok(())
    }

    /// Fails with `BAD_REQUEST` "balance overflow" when crediting `amount`
    /// would exceed the representable balance.
    pub(crate) fn ensure_can_receive(&self, amount: i64) -> Result<i64, AppError> {
        self.balance
            .checked_add(amount)
            .ok_or_else(|| AppError::bad_request("balance overflow"))
    }

    /// Credit. The amount is validated non-negative by the caller.
    pub(crate) fn add_to_balance(&mut self, amount: i64) -> Result<(), AppError> {
        self.balance = self.ensure_can_receive(amount)?;
        Ok(())
    }

    /// Debit; fails without touching the balance if it would go negative.
    pub(crate) fn remove_from_balance(&mut self, amount: i64) -> Result<(), AppError> {
        match self.balance.checked_sub(amount) {
            Some(remaining) if remaining >= 0 => {
                self.balance = remaining;
                Ok(())
            }
            _ => Err(AppError::bad_request("insufficient balance")),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("document", &self.document)
            .field("secret_hash", &"<redacted>")
            .field("balance", &self.balance)
            .field("created_at", &self.created_at)
            .finish()
    }
}

fn hash_secret(secret: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("error on hashing secret: {}", e)))
}
