/// Single account state: balance and activity, changed through validated
/// events.
pub mod account;

/// Collection of accounts with sequential numbering and compensated
/// transfers.
pub mod ledger;

/// Request and reply lines of the wire protocol, independent of transport.
pub mod command;

/// Runs decoded requests against a ledger and encodes the replies.
pub mod dispatch;

/// Length-prefixed frames carrying one line each.
pub mod framing;

/// The bank interface plus its in-process and remote implementations.
///
/// Both implementations report domain failures identically.
pub mod bank;

/// TCP server exposing one shared ledger.
pub mod server;

/// Server and client settings from arguments, environment and defaults.
pub mod config;

/// Binary bootstrap kept in the library so integration tests can drive it.
pub mod bin_utils;
