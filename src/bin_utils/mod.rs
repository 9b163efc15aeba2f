//! Bootstrapping shared by the `bank-server` and `bank-client` binaries: log
//! setup and the script runner that drives any [`Bank`].

use std::io::{Read, Write};

use anyhow::{Context, Result};
use csv_parser::{CsvOperationParser, Operation, OperationKind};
use csv_printer::{AccountSummary, print_accounts};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::bank::{Bank, BankError};

pub mod csv_parser;
pub mod csv_printer;

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG`
/// (default `info`). Logs go to stderr so stdout stays machine readable.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs an operation script against a bank and prints the resulting active
/// accounts as CSV.
pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, BankError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub async fn run(mut self, bank: &dyn Bank) -> Result<()> {
        let parser = CsvOperationParser::new(self.input);

        for (line, row) in parser {
            let op = row.with_context(|| format!("Malformed operation at line {line}"))?;
            if let Err(err) = apply(bank, op).await {
                if let BankError::Io(_) | BankError::Disconnected = err {
                    return Err(err).with_context(|| format!("Bank unavailable at line {line}"));
                }
                (self.error_printer)(line, err);
            }
        }

        let mut accounts = Vec::new();
        for number in bank.account_numbers().await? {
            let Some(info) = bank.account(&number).await? else {
                continue;
            };
            accounts.push(AccountSummary {
                balance: bank.balance(&number).await?,
                active: bank.is_active(&number).await?,
                number,
                owner: info.owner,
            });
        }
        print_accounts(self.output, accounts.into_iter())
    }
}

async fn apply(bank: &dyn Bank, op: Operation) -> Result<(), BankError> {
    let account = op.account.ok_or(BankError::InvalidParameters)?;
    match op.kind {
        OperationKind::Create => {
            let number = bank.create_account(&account).await?;
            debug!(%number, owner = %account, "created");
        }
        OperationKind::Close => {
            if !bank.close_account(&account).await? {
                info!(number = %account, "account left open");
            }
        }
        OperationKind::Deposit => {
            let amount = op.amount.ok_or(BankError::InvalidParameters)?;
            bank.deposit(&account, amount).await?;
        }
        OperationKind::Withdraw => {
            let amount = op.amount.ok_or(BankError::InvalidParameters)?;
            bank.withdraw(&account, amount).await?;
        }
        OperationKind::Transfer => {
            let target = op.target.ok_or(BankError::InvalidParameters)?;
            let amount = op.amount.ok_or(BankError::InvalidParameters)?;
            bank.transfer(&account, &target, amount).await?;
        }
    }
    Ok(())
}
