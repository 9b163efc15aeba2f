use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use tracing::debug;

use crate::account::{Account, AccountError, AccountEvent};

pub const DEFAULT_ACCOUNT_PREFIX: &str = "123-09-";

/// In-memory collection of accounts.
///
/// Accounts are never removed, closing one only deactivates it, so account
/// numbers are never handed out twice.
#[derive(Debug)]
pub struct Ledger {
    prefix: String,
    accounts: HashMap<String, Account>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT_PREFIX)
    }
}

impl Ledger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            accounts: HashMap::new(),
        }
    }

    pub fn create_account(&mut self, owner: &str) -> String {
        let sequence = self
            .accounts
            .values()
            .map(Account::sequence)
            .max()
            .map_or(0, |max| max + 1);
        let number = format!("{}{sequence:04}", self.prefix);
        self.accounts.insert(
            number.clone(),
            Account::open(number.clone(), owner.to_owned(), sequence),
        );
        debug!(%number, owner, "account created");
        number
    }

    /// Returns `false` when the account is unknown, already closed, or
    /// still holds money.
    pub fn close_account(&mut self, number: &str) -> bool {
        let Some(acc) = self.accounts.get_mut(number) else {
            return false;
        };
        match acc.handle_close() {
            Ok(evt) => {
                acc.apply(&evt);
                debug!(number, "account closed");
                true
            }
            Err(err) => {
                debug!(number, %err, "account not closed");
                false
            }
        }
    }

    pub fn active_account_numbers(&self) -> BTreeSet<String> {
        self.accounts
            .values()
            .filter(|acc| acc.is_active())
            .map(|acc| acc.number().to_owned())
            .collect()
    }

    pub fn account(&self, number: &str) -> Option<&Account> {
        self.accounts.get(number)
    }

    pub fn deposit(&mut self, number: &str, amount: Decimal) -> Result<(), AccountError> {
        let acc = self.account_mut(number)?;
        let evt = acc.handle_deposit(amount)?;
        acc.apply(&evt);
        Ok(())
    }

    pub fn withdraw(&mut self, number: &str, amount: Decimal) -> Result<(), AccountError> {
        let acc = self.account_mut(number)?;
        let evt = acc.handle_withdraw(amount)?;
        acc.apply(&evt);
        Ok(())
    }

    /// Moves `amount` from one account to another.
    ///
    /// The withdrawal is applied first. If the deposit is then rejected the
    /// withdrawal is undone before the deposit's error is returned, so either
    /// both balances change or neither does. This relies on the caller holding
    /// exclusive access to the ledger for the whole call.
    pub fn transfer(&mut self, from: &str, to: &str, amount: Decimal) -> Result<(), AccountError> {
        if let Some(missing) = [from, to]
            .into_iter()
            .find(|number| !self.accounts.contains_key(*number))
        {
            return Err(AccountError::NotFound(missing.to_owned()));
        }

        self.withdraw(from, amount)?;
        if let Err(err) = self.deposit(to, amount) {
            // `from` was found above and accounts are never removed
            if let Some(acc) = self.accounts.get_mut(from) {
                acc.apply(&AccountEvent::compensating_deposit(amount));
            }
            debug!(from, to, %amount, %err, "transfer rolled back");
            return Err(err);
        }
        Ok(())
    }

    fn account_mut(&mut self, number: &str) -> Result<&mut Account, AccountError> {
        self.accounts
            .get_mut(number)
            .ok_or_else(|| AccountError::NotFound(number.to_owned()))
    }
}
