//! Maps decoded requests onto [`Ledger`] operations and ledger outcomes onto
//! reply lines.
//!
//! Reply codes are command specific and some of them are shared between
//! unrelated causes (`deposit` answers `2|...` both for an unknown account and
//! for an invalid amount). They are kept as they are for wire compatibility.
//!
//! A reply must fit in one frame, so `getAccountNumbers` stops working once
//! the active account numbers joined together exceed
//! [`MAX_FRAME_LEN`](crate::framing::MAX_FRAME_LEN) bytes. With the default
//! prefix that is about 5400 accounts. The server then fails to write
//! the reply and drops the connection.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    account::AccountError,
    command::{
        BankCommand, FIELD_SEPARATOR, INVALID_PARAMETERS, NULL, Request, UNKNOWN_COMMAND,
        not_found_message, reply,
    },
    ledger::Ledger,
};

pub const OK: &str = "0";

/// Decodes one request line, runs it against the ledger and encodes the reply.
///
/// Never fails: malformed requests are answered with the command's
/// "invalid parameters" reply or with [`UNKNOWN_COMMAND`].
pub fn dispatch(ledger: &mut Ledger, line: &str) -> String {
    let request = Request::parse(line);
    let response = execute(ledger, &request);
    debug!(command = %request.command, request = line, response = %response, "dispatched");
    response
}

pub fn execute(ledger: &mut Ledger, req: &Request) -> String {
    match req.command {
        BankCommand::CreateAccount => create_account(ledger, req),
        BankCommand::CloseAccount => req
            .arg(0)
            .is_some_and(|number| ledger.close_account(number))
            .to_string(),
        BankCommand::GetAccountNumbers => {
            let numbers = ledger.active_account_numbers();
            if numbers.is_empty() {
                NULL.to_owned()
            } else {
                numbers
                    .into_iter()
                    .collect::<Vec<_>>()
                    .join(FIELD_SEPARATOR.to_string().as_str())
            }
        }
        BankCommand::GetAccount => get_account(ledger, req),
        BankCommand::IsActive => req
            .arg(0)
            .and_then(|number| ledger.account(number))
            .is_some_and(|acc| acc.is_active())
            .to_string(),
        BankCommand::GetBalance => req
            .arg(0)
            .and_then(|number| ledger.account(number))
            .map_or(Decimal::ZERO, |acc| acc.balance())
            .to_string(),
        BankCommand::Deposit => deposit(ledger, req),
        BankCommand::Withdraw => withdraw(ledger, req),
        BankCommand::Transfer => transfer(ledger, req),
        BankCommand::Error => UNKNOWN_COMMAND.to_owned(),
    }
}

/// Reply of the commands that reject missing arguments as invalid parameters.
/// The remaining commands fold a missing argument into their "unknown
/// account" answer.
fn invalid_parameters_reply(command: BankCommand) -> String {
    let code = match command {
        BankCommand::Deposit => "2",
        BankCommand::Withdraw | BankCommand::Transfer => "3",
        _ => NULL,
    };
    reply(code, INVALID_PARAMETERS)
}

fn create_account(ledger: &mut Ledger, req: &Request) -> String {
    let Some(owner) = req.arg(0) else {
        return invalid_parameters_reply(req.command);
    };
    ledger.create_account(owner)
}

fn get_account(ledger: &Ledger, req: &Request) -> String {
    let Some(number) = req.arg(0) else {
        return invalid_parameters_reply(req.command);
    };
    match ledger.account(number) {
        Some(acc) => reply(acc.number(), acc.owner()),
        None => NULL.to_owned(),
    }
}

fn deposit(ledger: &mut Ledger, req: &Request) -> String {
    let (Some(number), Some(amount)) = (req.arg(0), req.arg(1)) else {
        return invalid_parameters_reply(req.command);
    };
    if ledger.account(number).is_none() {
        return reply("2", &not_found_message(number));
    }
    let amount = match parse_amount(amount) {
        Ok(amount) => amount,
        Err(msg) => return reply("2", &msg),
    };
    match ledger.deposit(number, amount) {
        Ok(()) => OK.to_owned(),
        Err(AccountError::InactiveAccount) => "1".to_owned(),
        Err(err) => reply("2", &err.to_string()),
    }
}

fn withdraw(ledger: &mut Ledger, req: &Request) -> String {
    let (Some(number), Some(amount)) = (req.arg(0), req.arg(1)) else {
        return invalid_parameters_reply(req.command);
    };
    if ledger.account(number).is_none() {
        return reply("2", &not_found_message(number));
    }
    let amount = match parse_amount(amount) {
        Ok(amount) => amount,
        Err(msg) => return reply("3", &msg),
    };
    match ledger.withdraw(number, amount) {
        Ok(()) => OK.to_owned(),
        Err(AccountError::Overdraw) => "1".to_owned(),
        Err(AccountError::InactiveAccount) => "2".to_owned(),
        Err(err) => reply("3", &err.to_string()),
    }
}

fn transfer(ledger: &mut Ledger, req: &Request) -> String {
    let (Some(from), Some(to), Some(amount)) = (req.arg(0), req.arg(1), req.arg(2)) else {
        return invalid_parameters_reply(req.command);
    };
    if let Some(missing) = [from, to].into_iter().find(|n| ledger.account(n).is_none()) {
        return reply("3", &not_found_message(missing));
    }
    let amount = match parse_amount(amount) {
        Ok(amount) => amount,
        Err(msg) => return reply("3", &msg),
    };
    match ledger.transfer(from, to, amount) {
        Ok(()) => OK.to_owned(),
        Err(AccountError::Overdraw) => "1".to_owned(),
        Err(AccountError::InactiveAccount) => "2".to_owned(),
        Err(err) => reply("3", &err.to_string()),
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|err| format!("Invalid amount '{raw}': {err}"))
}
