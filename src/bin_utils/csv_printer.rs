use std::io::Write;

use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub number: String,
    pub owner: String,
    pub balance: Decimal,
    pub active: bool,
}

pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountSummary>,
) -> anyhow::Result<()>
where
    W: Write,
{
    // header is written by hand so it is there even without accounts
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);
    writer.write_record(["number", "owner", "balance", "active"])?;
    for acc in accounts {
        if let Err(err) = writer.serialize(acc) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
