use std::fs::File;

use anyhow::{Context, Result};
use bank_ledger::{
    bank::{Bank, BankError, local::LocalBank, remote::RemoteBank},
    bin_utils::{Service, init_tracing},
    config::{BankMode, ClientConfig},
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ClientConfig::from_args(std::env::args())?;
    let file = File::open(&config.script)
        .with_context(|| format!("Failed to open `{}`", config.script.display()))?;

    let bank: Box<dyn Bank> = match &config.mode {
        BankMode::Local => Box::new(LocalBank::default()),
        BankMode::Remote(addr) => Box::new(
            RemoteBank::connect(addr.as_str())
                .await
                .with_context(|| format!("Failed to connect to `{addr}`"))?,
        ),
    };

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line: u64, err: BankError| {
            // rejected operations are expected, the run carries on
            warn!(line, %err, "operation rejected");
        }),
    };
    service.run(bank.as_ref()).await
}
