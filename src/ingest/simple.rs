//! Schema A — manual-entry history: `amount, odds, result, date`.
//!
//! Every imported row is a settled bet priced from its odds; the payout
//! formula is the same one manual entry uses.

use csv::StringRecord;

use super::{is_unsettled, is_win_token, parse_amount, parse_date, parse_odds, row_err, Columns};
use crate::types::{Bet, BetResult, LedgerError};

/// Parse one row. `Ok(None)` means the row is unsettled and skipped.
pub(super) fn parse_row(
    columns: &Columns,
    record: &StringRecord,
    line: usize,
) -> Result<Option<Bet>, LedgerError> {
    let result_raw = columns.get(record, "result").unwrap_or("");
    if is_unsettled(result_raw) {
        return Ok(None);
    }
    let result = if is_win_token(result_raw) {
        BetResult::Win
    } else {
        BetResult::Loss
    };

    let amount = parse_amount(columns.get(record, "amount"), line, "amount")?;
    let odds = parse_odds(columns.get(record, "odds"), line, "odds")?;
    let date = parse_date(columns.get(record, "date"), line)?;

    Bet::closed(amount, odds, result, date)
        .map(Some)
        .map_err(|e| row_err(line, e.to_string()))
}
