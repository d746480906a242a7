//! Ledger export.
//!
//! Writes the ledger as a flat UTF-8 delimited table, one row per bet,
//! header row included. The output re-imports under the `simple` schema
//! (header matching on import is case-insensitive), which is how a
//! session's history is carried forward.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::types::Bet;

const HEADER: [&str; 12] = [
    "Amount",
    "Odds",
    "Result",
    "Date",
    "Status",
    "Payout",
    "Profit",
    "Player",
    "Team",
    "Position",
    "Line",
    "Transaction_Type",
];

/// Write the ledger to any writer. Currency cells are surfaced at 2 dp.
pub fn write_ledger<W: Write>(bets: &[Bet], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER).context("Failed to write export header")?;

    for bet in bets {
        let record = [
            money(bet.amount),
            bet.odds.value().to_string(),
            bet.result.to_string(),
            bet.date.format("%Y-%m-%d").to_string(),
            bet.status.to_string(),
            bet.payout.map(money).unwrap_or_default(),
            bet.profit.map(money).unwrap_or_default(),
            opt(&bet.details.player),
            opt(&bet.details.team),
            opt(&bet.details.position),
            opt(&bet.details.line),
            opt(&bet.details.transaction_type),
        ];
        out.write_record(&record)
            .with_context(|| format!("Failed to write bet {}", bet.id))?;
    }

    out.flush().context("Failed to flush export")?;
    Ok(())
}

/// Write the ledger to a file path.
pub fn export_to_path<P: AsRef<Path>>(bets: &[Bet], path: P) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    write_ledger(bets, file)?;
    info!(path = %path.display(), count = bets.len(), "Ledger exported");
    Ok(())
}

fn money(value: Decimal) -> String {
    // {:.2} both rounds and pads, so whole-dollar stakes export as "50.00".
    format!("{value:.2}")
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
