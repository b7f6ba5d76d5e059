//! Domain entities: accounts, transfers and CPF validation

pub mod account;
pub mod document;
pub mod transfer;

pub use account::Account;
pub use transfer::Transfer;

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
