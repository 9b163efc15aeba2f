use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::ledger::Ledger;

use super::{AccountInfo, Bank, BankError};

/// Ledger shared between tasks. The mutex is the single serialization point
/// for every operation on it.
pub type SharedLedger = Arc<Mutex<Ledger>>;

/// In-process bank backed by a [`Ledger`].
#[derive(Debug, Clone, Default)]
pub struct LocalBank {
    ledger: SharedLedger,
}

impl LocalBank {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Handle to the underlying ledger, e.g. to serve it with
    /// [`BankServer`](crate::server::BankServer).
    pub fn shared(&self) -> SharedLedger {
        Arc::clone(&self.ledger)
    }
}

#[async_trait]
impl Bank for LocalBank {
    async fn create_account(&self, owner: &str) -> Result<String, BankError> {
        Ok(self.ledger.lock().await.create_account(owner))
    }

    async fn close_account(&self, number: &str) -> Result<bool, BankError> {
        Ok(self.ledger.lock().await.close_account(number))
    }

    async fn account_numbers(&self) -> Result<BTreeSet<String>, BankError> {
        Ok(self.ledger.lock().await.active_account_numbers())
    }

    async fn account(&self, number: &str) -> Result<Option<AccountInfo>, BankError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.account(number).map(|acc| AccountInfo {
            number: acc.number().to_owned(),
            owner: acc.owner().to_owned(),
        }))
    }

    async fn is_active(&self, number: &str) -> Result<bool, BankError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.account(number).is_some_and(|acc| acc.is_active()))
    }

    async fn balance(&self, number: &str) -> Result<Decimal, BankError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .account(number)
            .map_or(Decimal::ZERO, |acc| acc.balance()))
    }

    async fn deposit(&self, number: &str, amount: Decimal) -> Result<(), BankError> {
        Ok(self.ledger.lock().await.deposit(number, amount)?)
    }

    async fn withdraw(&self, number: &str, amount: Decimal) -> Result<(), BankError> {
        Ok(self.ledger.lock().await.withdraw(number, amount)?)
    }

    async fn transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<(), BankError> {
        Ok(self.ledger.lock().await.transfer(from, to, amount)?)
    }
}
