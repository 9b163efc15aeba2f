use anyhow::{Context, Result};
use bank_ledger::{
    bank::local::LocalBank, bin_utils::init_tracing, config::ServerConfig, ledger::Ledger,
    server::BankServer,
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ServerConfig::from_args(std::env::args());

    let bank = LocalBank::new(Ledger::new(config.account_prefix));
    let server = BankServer::bind(config.listen_addr.as_str(), bank.shared())
        .await
        .with_context(|| format!("Failed to listen on `{}`", config.listen_addr))?;

    server
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(%err, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Server stopped accepting connections")
}
