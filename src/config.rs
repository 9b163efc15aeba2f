use std::{env, path::PathBuf};

use anyhow::{Context, Result};

use crate::ledger::DEFAULT_ACCOUNT_PREFIX;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:12345";

pub const LISTEN_ADDR_VAR: &str = "BANK_LISTEN_ADDR";
pub const ACCOUNT_PREFIX_VAR: &str = "BANK_ACCOUNT_PREFIX";
pub const SERVER_ADDR_VAR: &str = "BANK_SERVER_ADDR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub account_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            account_prefix: DEFAULT_ACCOUNT_PREFIX.to_owned(),
        }
    }
}

impl ServerConfig {
    /// `bank-server [listen-addr]`, falling back to `BANK_LISTEN_ADDR` and
    /// then to [`DEFAULT_LISTEN_ADDR`]. The account prefix comes from
    /// `BANK_ACCOUNT_PREFIX`.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::resolve(args, |var| env::var(var).ok())
    }

    fn resolve<I, E>(args: I, env: E) -> Self
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            listen_addr: args
                .into_iter()
                .nth(1)
                .or_else(|| env(LISTEN_ADDR_VAR))
                .unwrap_or(defaults.listen_addr),
            account_prefix: env(ACCOUNT_PREFIX_VAR).unwrap_or(defaults.account_prefix),
        }
    }
}

/// Which [`Bank`](crate::bank::Bank) implementation a client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankMode {
    Local,
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub script: PathBuf,
    pub mode: BankMode,
}

impl ClientConfig {
    /// `bank-client <script.csv> [server-addr]`. Without an address (argument
    /// or `BANK_SERVER_ADDR`) the script runs against an in-process bank.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        Self::resolve(args, |var| env::var(var).ok())
    }

    fn resolve<I, E>(args: I, env: E) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter().skip(1);
        let script = args
            .next()
            .context("Expected a script file name as the first argument")?;
        let mode = match args.next().or_else(|| env(SERVER_ADDR_VAR)) {
            Some(addr) => BankMode::Remote(addr),
            None => BankMode::Local,
        };
        Ok(Self {
            script: PathBuf::from(script),
            mode,
        })
    }
}
