//! Typed application error
//!
//! Every domain, orchestration and repository failure is an [`AppError`]:
//! a fixed [`ErrorKind`] plus an ordered list of human-readable messages.
//! The gateway maps the kind to an HTTP status without looking at the text.

use thiserror::Error;

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input to an entity constructor
    EntityValidation,
    /// Referenced account/transfer does not exist
    NotFound,
    /// Storage or infrastructure failure
    Internal,
    /// Action not permitted on this resource
    NotAllowed,
    /// Credential or token rejected
    Unauthorized,
    /// Business-rule rejection (insufficient balance, ownership mismatch)
    BadRequest,
    /// Duplicate identity or concurrent modification
    Conflict,
}

impl ErrorKind {
    /// Stable name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EntityValidation => "ENTITY_VALIDATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL",
            ErrorKind::NotAllowed => "NOT_ALLOWED",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Conflict => "CONFLICT",
        }
    }

    /// Numeric code for API responses
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::EntityValidation => 1001,
            ErrorKind::BadRequest => 1002,
            ErrorKind::Unauthorized => 2002,
            ErrorKind::NotFound => 4001,
            ErrorKind::NotAllowed => 4002,
            ErrorKind::Conflict => 4003,
            ErrorKind::Internal => 5000,
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::EntityValidation => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
            ErrorKind::NotAllowed => 405,
            ErrorKind::Unauthorized => 401,
            ErrorKind::BadRequest => 400,
            ErrorKind::Conflict => 409,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error: one kind, many messages.
///
/// The kind is fixed at construction; messages can only be appended.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .messages.join(", "))]
pub struct AppError {
    kind: ErrorKind,
    messages: Vec<String>,
}

impl AppError {
    /// Create an empty error of the given kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            messages: Vec::new(),
        }
    }

    /// Append a message (chainable)
    pub fn add(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Append a message through a mutable reference
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// `Err(self)` if any message was recorded, `Ok(())` otherwise
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn entity_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EntityValidation).add(message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound).add(message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal).add(message)
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAllowed).add(message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized).add(message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest).add(message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict).add(message)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict(db_err.message().to_string())
            }
            _ => AppError::internal(e.to_string()),
        }
    }
}
