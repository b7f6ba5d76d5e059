//! bank_api - accounts, login and atomic inter-account transfers
//!
//! # Modules
//!
//! - [`error`] - Typed error: one kind, many messages
//! - [`entity`] - Account, Transfer and CPF validation
//! - [`repository`] - Storage traits, transaction guard, PostgreSQL adapters
//! - [`usecase`] - Orchestration (transfer engine, account operations)
//! - [`auth`] - JWT session tokens and middleware
//! - [`gateway`] - axum router and handlers
//! - [`config`] / [`logging`] - process bootstrap

// Domain first
pub mod entity;
pub mod error;

// Storage and orchestration
pub mod repository;
pub mod usecase;

// HTTP surface
pub mod auth;
pub mod gateway;

// Bootstrap
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use entity::{Account, Transfer};
pub use error::{AppError, ErrorKind};
pub use repository::{
    AccountRepository, Backend, PostgresBackend, Repositories, TransactionManager,
    TransferRepository, TxGuard,
};
