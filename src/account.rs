use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
    Closed,
}

#[derive(Debug)]
pub struct AccountEvent {
    amount: Decimal,
    kind: AccountEventKind,
}

impl AccountEvent {
    /// Unvalidated deposit, used to undo a withdrawal that was already applied.
    pub(crate) fn compensating_deposit(amount: Decimal) -> Self {
        Self {
            amount,
            kind: AccountEventKind::Deposited,
        }
    }

    pub fn kind(&self) -> AccountEventKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Account '{0}' does not exist!")]
    NotFound(String),
    #[error("Account is inactive, no further operations are allowed")]
    InactiveAccount,
    #[error("Insufficient funds")]
    Overdraw,
    #[error("amount ({amount}) must be >= 0")]
    InvalidAmount { amount: Decimal },
    #[error("Account cannot be closed while holding a balance of {balance}")]
    OutstandingBalance { balance: Decimal },
    #[error("deposit of {amount} exceeds the largest representable balance")]
    BalanceOverflow { amount: Decimal },
}

#[derive(Debug, Clone)]
pub struct Account {
    number: String,
    owner: String,
    sequence: u32,
    balance: Decimal,
    active: bool,
}

impl Account {
    pub(crate) fn open(number: String, owner: String, sequence: u32) -> Self {
        Self {
            number,
            owner,
            sequence,
            balance: Decimal::ZERO,
            active: true,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn apply(&mut self, event: &AccountEvent) {
        match event.kind {
            AccountEventKind::Deposited => {
                self.balance += event.amount;
            }
            AccountEventKind::Withdrawn => {
                self.balance -= event.amount;
            }
            AccountEventKind::Closed => {
                self.active = false;
            }
        }
    }

    pub fn handle_deposit(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        if !self.active {
            return Err(AccountError::InactiveAccount);
        }
        if amount < Decimal::ZERO {
            return Err(AccountError::InvalidAmount { amount });
        }
        if self.balance.checked_add(amount).is_none() {
            return Err(AccountError::BalanceOverflow { amount });
        }
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::Deposited,
        })
    }

    /// Overdraw is checked before the sign of the amount, so a negative
    /// amount is only ever rejected as [`AccountError::InvalidAmount`] once
    /// it is known not to exceed the balance.
    pub fn handle_withdraw(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        if !self.active {
            return Err(AccountError::InactiveAccount);
        }
        if self.balance < amount {
            return Err(AccountError::Overdraw);
        }
        if amount < Decimal::ZERO {
            return Err(AccountError::InvalidAmount { amount });
        }
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::Withdrawn,
        })
    }

    pub fn handle_close(&self) -> Result<AccountEvent, AccountError> {
        if !self.active {
            return Err(AccountError::InactiveAccount);
        }
        if self.balance > Decimal::ZERO {
            return Err(AccountError::OutstandingBalance {
                balance: self.balance,
            });
        }
        Ok(AccountEvent {
            amount: Decimal::ZERO,
            kind: AccountEventKind::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::open("123-09-0000".to_string(), "Alice".to_string(), 0)
    }

    #[test]
    fn apply_events() {
        let mut acc = account();
        acc.apply(&AccountEvent {
            amount: Decimal::from(10),
            kind: AccountEventKind::Deposited,
        });
        assert_eq!(acc.balance, Decimal::from(10));
        acc.apply(&AccountEvent {
            amount: Decimal::from(3),
            kind: AccountEventKind::Withdrawn,
        });
        assert_eq!(acc.balance, Decimal::from(7));
        assert!(acc.active);

        // event is the source of truth, there's no more validation happening
        acc.apply(&AccountEvent::compensating_deposit(Decimal::new(25, 1)));
        assert_eq!(acc.balance, Decimal::new(95, 1));

        acc.apply(&AccountEvent {
            amount: Decimal::ZERO,
            kind: AccountEventKind::Closed,
        });
        assert!(!acc.active);
        assert_eq!(acc.balance, Decimal::new(95, 1));
    }

    #[test]
    fn handle_deposit() {
        let mut acc = account();

        let evt = acc.handle_deposit(Decimal::from(13)).unwrap();
        assert_eq!(evt.amount(), Decimal::from(13));
        assert_eq!(evt.kind(), AccountEventKind::Deposited);

        // zero is a valid amount
        let evt = acc.handle_deposit(Decimal::ZERO).unwrap();
        assert_eq!(evt.kind(), AccountEventKind::Deposited);

        let err = acc.handle_deposit(Decimal::from(-1)).unwrap_err();
        assert_eq!(
            err,
            AccountError::InvalidAmount {
                amount: Decimal::from(-1)
            }
        );
        assert_eq!(err.to_string(), "amount (-1) must be >= 0");

        acc.active = false;
        let err = acc.handle_deposit(Decimal::from(-1)).unwrap_err();
        assert_eq!(err, AccountError::InactiveAccount);
    }

    #[test]
    fn handle_deposit_overflow() {
        let mut acc = account();
        acc.apply(&acc.handle_deposit(Decimal::MAX).unwrap());

        let err = acc.handle_deposit(Decimal::ONE).unwrap_err();
        assert_eq!(
            err,
            AccountError::BalanceOverflow {
                amount: Decimal::ONE
            }
        );
        assert_eq!(acc.balance(), Decimal::MAX);

        // a zero deposit still fits
        assert!(acc.handle_deposit(Decimal::ZERO).is_ok());
    }

    #[test]
    fn handle_withdraw() {
        let mut acc = account();

        let err = acc.handle_withdraw(Decimal::from(5)).unwrap_err();
        assert_eq!(err, AccountError::Overdraw);

        acc.apply(&acc.handle_deposit(Decimal::from(5)).unwrap());
        let evt = acc.handle_withdraw(Decimal::from(5)).unwrap();
        assert_eq!(evt.amount(), Decimal::from(5));
        assert_eq!(evt.kind(), AccountEventKind::Withdrawn);

        // a negative amount never exceeds a non-negative balance
        let err = acc.handle_withdraw(Decimal::from(-2)).unwrap_err();
        assert_eq!(
            err,
            AccountError::InvalidAmount {
                amount: Decimal::from(-2)
            }
        );

        acc.active = false;
        let err = acc.handle_withdraw(Decimal::from(1)).unwrap_err();
        assert_eq!(err, AccountError::InactiveAccount);
    }

    #[test]
    fn handle_close() {
        let mut acc = account();
        acc.apply(&acc.handle_deposit(Decimal::from(1)).unwrap());

        let err = acc.handle_close().unwrap_err();
        assert_eq!(
            err,
            AccountError::OutstandingBalance {
                balance: Decimal::from(1)
            }
        );

        acc.apply(&acc.handle_withdraw(Decimal::from(1)).unwrap());
        let evt = acc.handle_close().unwrap();
        assert_eq!(evt.kind(), AccountEventKind::Closed);
        acc.apply(&evt);
        assert!(!acc.is_active());

        // closing twice is rejected
        let err = acc.handle_close().unwrap_err();
        assert_eq!(err, AccountError::InactiveAccount);
    }
}
