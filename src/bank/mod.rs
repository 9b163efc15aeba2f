use std::collections::BTreeSet;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{account::AccountError, command::CommandError};

pub mod local;
pub mod remote;

#[derive(Debug, Error)]
pub enum BankError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Invalid parameters!")]
    InvalidParameters,
    #[error("Server does not know the command")]
    UnknownCommand,
    #[error("Unexpected reply `{0}`")]
    Protocol(String),
    #[error("Connection closed by server")]
    Disconnected,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Identity of an account: the parts that never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub number: String,
    pub owner: String,
}

/// Operations a bank offers, whether it runs in-process or behind a server.
///
/// Both implementations report business-rule violations as the same
/// [`AccountError`] kinds, so callers can't tell them apart.
#[async_trait]
pub trait Bank: Send + Sync {
    async fn create_account(&self, owner: &str) -> Result<String, BankError>;

    /// `false` when the account is unknown, already closed, or holds money.
    async fn close_account(&self, number: &str) -> Result<bool, BankError>;

    /// Numbers of all active accounts.
    async fn account_numbers(&self) -> Result<BTreeSet<String>, BankError>;

    async fn account(&self, number: &str) -> Result<Option<AccountInfo>, BankError>;

    /// `false` for unknown accounts.
    async fn is_active(&self, number: &str) -> Result<bool, BankError>;

    /// Zero for unknown accounts.
    async fn balance(&self, number: &str) -> Result<Decimal, BankError>;

    async fn deposit(&self, number: &str, amount: Decimal) -> Result<(), BankError>;

    async fn withdraw(&self, number: &str, amount: Decimal) -> Result<(), BankError>;

    async fn transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<(), BankError>;
}
