//! Schema B — sportsbook settlement export: `date, amount_usd, price,
//! outcome, outcome_amount` plus optional descriptive columns.
//!
//! The export encodes realized settlement, so a win's profit is taken
//! directly from `outcome_amount` instead of being recomputed from the
//! price — the intentional asymmetry from the manual-entry path. Rows
//! without a settled outcome never become ledger records: open bets can
//! only enter through manual entry.

use csv::StringRecord;

use super::{is_unsettled, is_win_token, parse_amount, parse_date, parse_odds, row_err, Columns};
use crate::types::{Bet, BetDetails, BetResult, LedgerError};

const DETAIL_COLUMNS: [&str; 5] = ["player", "team", "position", "line", "transaction_type"];

/// Parse one row. `Ok(None)` means the row is unsettled and skipped.
pub(super) fn parse_row(
    columns: &Columns,
    record: &StringRecord,
    line: usize,
) -> Result<Option<Bet>, LedgerError> {
    let outcome_raw = columns.get(record, "outcome").unwrap_or("");
    if is_unsettled(outcome_raw) {
        return Ok(None);
    }
    let result = if is_win_token(outcome_raw) {
        BetResult::Win
    } else {
        BetResult::Loss
    };

    let amount = parse_amount(columns.get(record, "amount_usd"), line, "amount_usd")?;
    let odds = parse_odds(columns.get(record, "price"), line, "price")?;
    let date = parse_date(columns.get(record, "date"), line)?;

    // Losses realize -amount regardless; only a win reads its settlement.
    let realized_profit = match result {
        BetResult::Win => parse_amount(
            columns.get(record, "outcome_amount").filter(|s| !s.trim().is_empty()),
            line,
            "outcome_amount",
        )?,
        _ => rust_decimal::Decimal::ZERO,
    };

    let bet = Bet::settled(amount, odds, result, date, realized_profit)
        .map_err(|e| row_err(line, e.to_string()))?
        .with_details(details(columns, record));
    Ok(Some(bet))
}

fn details(columns: &Columns, record: &StringRecord) -> BetDetails {
    let cell = |name: &str| {
        if !columns.has(name) {
            return None;
        }
        columns
            .get(record, name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let [player, team, position, line, transaction_type] = DETAIL_COLUMNS.map(cell);
    BetDetails {
        player,
        team,
        position,
        line,
        transaction_type,
    }
}
