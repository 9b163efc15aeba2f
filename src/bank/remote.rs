//! Client side of the wire protocol.
//!
//! [`RemoteBank`] turns every [`Bank`] call into one request/reply round trip
//! and translates reply codes back into the errors [`LocalBank`] would return.
//!
//! [`LocalBank`]: super::local::LocalBank

use std::{collections::BTreeSet, str::FromStr};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::{
    io::BufReader,
    net::{
        TcpStream, ToSocketAddrs,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::Mutex,
};
use tracing::debug;

use crate::{
    account::AccountError,
    command::{
        BankCommand, FIELD_SEPARATOR, INVALID_PARAMETERS, NULL, Request, UNKNOWN_COMMAND,
        parse_not_found, split_reply,
    },
    framing::{read_frame, write_frame},
};

use super::{AccountInfo, Bank, BankError};

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// A [`Bank`] living in a `bank-server` process.
///
/// Calls are serialized over a single connection; concurrent callers wait for
/// each other's round trip.
///
/// A round trip that fails or is cancelled halfway leaves the stream at an
/// unknown position, so the connection is dropped and every later call fails
/// with [`BankError::Disconnected`].
pub struct RemoteBank {
    conn: Mutex<Option<Connection>>,
}

impl RemoteBank {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, BankError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            conn: Mutex::new(Some(Connection {
                reader: BufReader::new(reader),
                writer,
            })),
        }
    }

    async fn call<I, S>(&self, command: BankCommand, args: I) -> Result<String, BankError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let line = Request::new(command, args)?.encode();

        let reply = {
            let mut slot = self.conn.lock().await;
            // taken out for the round trip, put back only once it completed
            let mut conn = slot.take().ok_or(BankError::Disconnected)?;
            write_frame(&mut conn.writer, &line).await?;
            let reply = read_frame(&mut conn.reader)
                .await?
                .ok_or(BankError::Disconnected)?;
            *slot = Some(conn);
            reply
        };
        debug!(request = %line, reply = %reply, "round trip");

        if reply == UNKNOWN_COMMAND {
            return Err(BankError::UnknownCommand);
        }
        Ok(reply)
    }
}

#[async_trait]
impl Bank for RemoteBank {
    async fn create_account(&self, owner: &str) -> Result<String, BankError> {
        let reply = self.call(BankCommand::CreateAccount, [owner]).await?;
        match split_reply(&reply) {
            (NULL, Some(INVALID_PARAMETERS)) => Err(BankError::InvalidParameters),
            (_, None) => Ok(reply),
            _ => Err(BankError::Protocol(reply)),
        }
    }

    async fn close_account(&self, number: &str) -> Result<bool, BankError> {
        let reply = self.call(BankCommand::CloseAccount, [number]).await?;
        decode_bool(reply)
    }

    async fn account_numbers(&self) -> Result<BTreeSet<String>, BankError> {
        let reply = self
            .call(BankCommand::GetAccountNumbers, Vec::<String>::new())
            .await?;
        Ok(decode_account_numbers(&reply))
    }

    async fn account(&self, number: &str) -> Result<Option<AccountInfo>, BankError> {
        let reply = self.call(BankCommand::GetAccount, [number]).await?;
        decode_account(reply)
    }

    async fn is_active(&self, number: &str) -> Result<bool, BankError> {
        let reply = self.call(BankCommand::IsActive, [number]).await?;
        decode_bool(reply)
    }

    async fn balance(&self, number: &str) -> Result<Decimal, BankError> {
        let reply = self.call(BankCommand::GetBalance, [number]).await?;
        Decimal::from_str(&reply).map_err(|_| BankError::Protocol(reply))
    }

    async fn deposit(&self, number: &str, amount: Decimal) -> Result<(), BankError> {
        let reply = self
            .call(BankCommand::Deposit, [number.to_owned(), amount.to_string()])
            .await?;
        decode_deposit(reply, amount)
    }

    async fn withdraw(&self, number: &str, amount: Decimal) -> Result<(), BankError> {
        let reply = self
            .call(BankCommand::Withdraw, [number.to_owned(), amount.to_string()])
            .await?;
        decode_withdraw(reply, amount)
    }

    async fn transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<(), BankError> {
        let reply = self
            .call(
                BankCommand::Transfer,
                [from.to_owned(), to.to_owned(), amount.to_string()],
            )
            .await?;
        decode_transfer(reply, amount)
    }
}

fn decode_bool(reply: String) -> Result<bool, BankError> {
    bool::from_str(&reply).map_err(|_| BankError::Protocol(reply))
}

fn decode_account_numbers(reply: &str) -> BTreeSet<String> {
    reply
        .split(FIELD_SEPARATOR)
        .filter(|number| *number != NULL && !number.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn decode_account(reply: String) -> Result<Option<AccountInfo>, BankError> {
    match split_reply(&reply) {
        (NULL, _) => Ok(None),
        (number, Some(owner)) => Ok(Some(AccountInfo {
            number: number.to_owned(),
            owner: owner.to_owned(),
        })),
        (_, None) => Err(BankError::Protocol(reply)),
    }
}

/// Failure replies carrying a message share their code between "invalid
/// parameters", "unknown account", "balance overflow" and "invalid amount";
/// the message tells them apart.
fn decode_failure(message: &str, amount: Decimal) -> BankError {
    let overflow = AccountError::BalanceOverflow { amount };
    if message == INVALID_PARAMETERS {
        BankError::InvalidParameters
    } else if let Some(number) = parse_not_found(message) {
        AccountError::NotFound(number.to_owned()).into()
    } else if message == overflow.to_string() {
        overflow.into()
    } else {
        AccountError::InvalidAmount { amount }.into()
    }
}

fn decode_deposit(reply: String, amount: Decimal) -> Result<(), BankError> {
    match split_reply(&reply) {
        ("0", None) => Ok(()),
        ("1", None) => Err(AccountError::InactiveAccount.into()),
        ("2", Some(message)) => Err(decode_failure(message, amount)),
        _ => Err(BankError::Protocol(reply)),
    }
}

fn decode_withdraw(reply: String, amount: Decimal) -> Result<(), BankError> {
    match split_reply(&reply) {
        ("0", None) => Ok(()),
        ("1", None) => Err(AccountError::Overdraw.into()),
        ("2", None) => Err(AccountError::InactiveAccount.into()),
        ("2" | "3", Some(message)) => Err(decode_failure(message, amount)),
        _ => Err(BankError::Protocol(reply)),
    }
}

fn decode_transfer(reply: String, amount: Decimal) -> Result<(), BankError> {
    match split_reply(&reply) {
        ("0", None) => Ok(()),
        ("1", None) => Err(AccountError::Overdraw.into()),
        ("2", None) => Err(AccountError::InactiveAccount.into()),
        ("3", Some(message)) => Err(decode_failure(message, amount)),
        _ => Err(BankError::Protocol(reply)),
    }
}
