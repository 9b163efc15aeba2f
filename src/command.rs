use std::fmt;

use thiserror::Error;

/// Field separator of request and reply lines. Fields are not escaped.
pub const FIELD_SEPARATOR: char = '|';

pub const INVALID_PARAMETERS: &str = "Invalid parameters!";
pub const NULL: &str = "null";
pub const UNKNOWN_COMMAND: &str = "err";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankCommand {
    CreateAccount,
    CloseAccount,
    GetAccountNumbers,
    GetAccount,
    Transfer,
    IsActive,
    Deposit,
    Withdraw,
    GetBalance,
    Error,
}

impl BankCommand {
    const ALL: [BankCommand; 10] = [
        Self::CreateAccount,
        Self::CloseAccount,
        Self::GetAccountNumbers,
        Self::GetAccount,
        Self::Transfer,
        Self::IsActive,
        Self::Deposit,
        Self::Withdraw,
        Self::GetBalance,
        Self::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CreateAccount => "createAccount",
            Self::CloseAccount => "closeAccount",
            Self::GetAccountNumbers => "getAccountNumbers",
            Self::GetAccount => "getAccount",
            Self::Transfer => "transfer",
            Self::IsActive => "isActive",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::GetBalance => "getBalance",
            Self::Error => "error",
        }
    }

    /// Matches ignoring ASCII case and underscores, so `GET_BALANCE`,
    /// `getbalance` and `GetBalance` are the same command. Anything else is
    /// [`BankCommand::Error`].
    pub fn from_name(name: &str) -> Self {
        let search: String = name.chars().filter(|c| *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name().eq_ignore_ascii_case(&search))
            .unwrap_or(Self::Error)
    }
}

impl fmt::Display for BankCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Field `{field}` must not contain '|'")]
    DelimiterInField { field: String },
}

/// A decoded request line: the command and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: BankCommand,
    pub args: Vec<String>,
}

impl Request {
    pub fn new<I, S>(command: BankCommand, args: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = args
            .into_iter()
            .map(|arg| {
                let field: String = arg.into();
                if field.contains(FIELD_SEPARATOR) {
                    Err(CommandError::DelimiterInField { field })
                } else {
                    Ok(field)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { command, args })
    }

    /// Decodes a request line. Never fails: an unknown command name becomes
    /// [`BankCommand::Error`]. Trailing empty fields are dropped, so
    /// `createAccount|` carries no argument.
    pub fn parse(line: &str) -> Self {
        let mut fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
        let command = BankCommand::from_name(fields[0]);
        Self {
            command,
            args: fields[1..].iter().map(|f| (*f).to_owned()).collect(),
        }
    }

    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }

    pub fn encode(&self) -> String {
        let mut line = self.command.name().to_owned();
        for arg in &self.args {
            line.push(FIELD_SEPARATOR);
            line.push_str(arg);
        }
        line
    }
}

/// Joins a reply code with its message: `<code>|<message>`.
pub fn reply(code: &str, message: &str) -> String {
    format!("{code}{FIELD_SEPARATOR}{message}")
}

/// Splits a reply into its leading code and the optional remainder.
pub fn split_reply(line: &str) -> (&str, Option<&str>) {
    match line.split_once(FIELD_SEPARATOR) {
        Some((code, message)) => (code, Some(message)),
        None => (line, None),
    }
}

pub fn not_found_message(number: &str) -> String {
    format!("Account '{number}' does not exist!")
}

/// Extracts the account number from a message built by [`not_found_message`].
pub fn parse_not_found(message: &str) -> Option<&str> {
    message
        .strip_prefix("Account '")?
        .strip_suffix("' does not exist!")
}
