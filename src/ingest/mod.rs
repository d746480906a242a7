//! Ingestion normalizer.
//!
//! Maps heterogeneous tabular sources onto canonical [`Bet`] records
//! behind a single `normalize(reader, schema)` entry point. The
//! recognized column layouts are a small closed set:
//! - `Simple` — manual-entry history: `amount, odds, result, date`
//! - `Settlement` — sportsbook settlement export: `date, amount_usd,
//!   price, outcome, outcome_amount` plus optional metadata columns
//!
//! Schema validation is batch-level (a missing required column rejects
//! the whole upload); row parsing degrades per-row (a bad row is
//! reported and skipped, the batch continues).

pub mod settlement;
pub mod simple;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use tracing::{info, warn};

use crate::types::{Bet, LedgerError};

// ---------------------------------------------------------------------------
// Schema tags
// ---------------------------------------------------------------------------

/// The recognized import column layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportSchema {
    Simple,
    Settlement,
}

impl ImportSchema {
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            ImportSchema::Simple => &["amount", "odds", "result", "date"],
            ImportSchema::Settlement => {
                &["date", "amount_usd", "price", "outcome", "outcome_amount"]
            }
        }
    }
}

impl fmt::Display for ImportSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSchema::Simple => write!(f, "simple"),
            ImportSchema::Settlement => write!(f, "settlement"),
        }
    }
}

/// Attempt to parse a string into an ImportSchema (case-insensitive).
impl std::str::FromStr for ImportSchema {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "manual" => Ok(ImportSchema::Simple),
            "settlement" | "settlement-export" | "export" => Ok(ImportSchema::Settlement),
            _ => Err(anyhow::anyhow!("Unknown import schema: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Import report
// ---------------------------------------------------------------------------

/// Outcome of normalizing one uploaded batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Canonical records ready for `Ledger::add_all`.
    pub bets: Vec<Bet>,
    /// Rows with a blank/NaN outcome — still open, excluded from import.
    pub skipped_unsettled: usize,
    /// Per-row failures (`LedgerError::RowParse`), reported but not fatal.
    pub row_errors: Vec<LedgerError>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.bets.len()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "imported {} bet(s), skipped {} unsettled row(s), {} row error(s)",
            self.bets.len(),
            self.skipped_unsettled,
            self.row_errors.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Normalize a delimited-text source into canonical bet records.
///
/// Header matching is case-insensitive and whitespace-trimmed, so the
/// crate's own export re-imports cleanly under the `Simple` schema.
pub fn normalize<R: Read>(reader: R, schema: ImportSchema) -> Result<ImportReport, LedgerError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| LedgerError::Validation(format!("unreadable header row: {e}")))?
        .clone();
    let columns = Columns::from_headers(&headers);

    let missing = columns.missing(schema.required_columns());
    if !missing.is_empty() {
        return Err(LedgerError::Schema {
            schema: schema.to_string(),
            missing,
        });
    }

    let mut report = ImportReport::default();
    for (i, record) in rdr.records().enumerate() {
        let line = i + 2; // line 1 is the header
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                report.row_errors.push(row_err(line, format!("malformed row: {e}")));
                continue;
            }
        };
        let parsed = match schema {
            ImportSchema::Simple => simple::parse_row(&columns, &record, line),
            ImportSchema::Settlement => settlement::parse_row(&columns, &record, line),
        };
        match parsed {
            Ok(Some(bet)) => report.bets.push(bet),
            Ok(None) => report.skipped_unsettled += 1,
            Err(e) => report.row_errors.push(e),
        }
    }

    if !report.row_errors.is_empty() {
        warn!(errors = report.row_errors.len(), %schema, "Import rows skipped");
    }
    info!(
        %schema,
        imported = report.imported(),
        skipped_unsettled = report.skipped_unsettled,
        row_errors = report.row_errors.len(),
        "Batch normalized"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Shared row helpers
// ---------------------------------------------------------------------------

/// Case-insensitive header-name → index lookup for one batch.
pub(crate) struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_lowercase(), i))
                .collect(),
        )
    }

    fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.0.contains_key(**name))
            .map(|name| name.to_string())
            .collect()
    }

    pub(crate) fn get<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.0.get(name).and_then(|&i| record.get(i))
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

pub(crate) fn row_err(line: usize, message: String) -> LedgerError {
    LedgerError::RowParse { line, message }
}

/// Accepted WIN tokens. Anything else non-empty settles as a loss.
pub(crate) fn is_win_token(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "win" | "w" | "1" | "true")
}

/// A blank, NaN, or pending outcome cell means the bet has not settled.
/// Pending covers re-imports of this crate's own export, where open bets
/// carry an explicit PENDING marker rather than an empty cell.
pub(crate) fn is_unsettled(raw: &str) -> bool {
    let t = raw.trim();
    t.is_empty() || t.eq_ignore_ascii_case("nan") || t.eq_ignore_ascii_case("pending")
}

pub(crate) fn parse_amount(
    cell: Option<&str>,
    line: usize,
    column: &str,
) -> Result<Decimal, LedgerError> {
    let raw = cell.ok_or_else(|| row_err(line, format!("missing {column} cell")))?;
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| row_err(line, format!("unparseable {column}: {raw:?}")))
}

/// Odds arrive as integers, but float-typed exports write "-110.0".
pub(crate) fn parse_odds(cell: Option<&str>, line: usize, column: &str) -> Result<i32, LedgerError> {
    let raw = cell.ok_or_else(|| row_err(line, format!("missing {column} cell")))?;
    let t = raw.trim();
    if let Ok(v) = t.parse::<i32>() {
        return Ok(v);
    }
    t.parse::<Decimal>()
        .ok()
        .filter(Decimal::is_integer)
        .and_then(|d| d.to_i32())
        .ok_or_else(|| row_err(line, format!("unparseable {column}: {raw:?}")))
}

pub(crate) fn parse_date(cell: Option<&str>, line: usize) -> Result<NaiveDate, LedgerError> {
    let raw = cell.ok_or_else(|| row_err(line, "missing date cell".to_string()))?;
    parse_flexible_date(raw).ok_or_else(|| row_err(line, format!("unparseable date: {raw:?}")))
}

/// Parse the date formats seen across sources: ISO date, ISO datetime,
/// RFC 3339, US slash date, and the verbose JS-style timestamp with a
/// timezone name ("Sat Nov 02 2024 21:15:00 GMT-0400 (Eastern Daylight
/// Time)"). Only the calendar day survives — time-of-day is discarded.
pub(crate) fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(t, "%m/%d/%Y") {
        return Some(d);
    }
    // Verbose timezone-named form: keep everything before " GMT".
    if let Some(prefix) = t.split(" GMT").next() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(prefix, "%a %b %d %Y %H:%M:%S") {
            return Some(dt.date());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BetResult;
    use rust_decimal_macros::dec;

    #[test]
    fn test_schema_from_str() {
        assert_eq!("simple".parse::<ImportSchema>().unwrap(), ImportSchema::Simple);
        assert_eq!("SETTLEMENT".parse::<ImportSchema>().unwrap(), ImportSchema::Settlement);
        assert_eq!("export".parse::<ImportSchema>().unwrap(), ImportSchema::Settlement);
        assert!("excel".parse::<ImportSchema>().is_err());
    }

    #[test]
    fn test_win_tokens() {
        for token in ["WIN", "win", "W", "1", "TRUE", "true", " w "] {
            assert!(is_win_token(token), "{token} should read as a win");
        }
        for token in ["LOSS", "L", "0", "false", "push"] {
            assert!(!is_win_token(token), "{token} should read as a loss");
        }
    }

    #[test]
    fn test_flexible_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
        for raw in [
            "2024-11-02",
            "2024-11-02 21:15:00",
            "2024-11-02T21:15:00Z",
            "2024-11-02T21:15:00-04:00",
            "11/02/2024",
            "Sat Nov 02 2024 21:15:00 GMT-0400 (Eastern Daylight Time)",
        ] {
            assert_eq!(parse_flexible_date(raw), Some(expected), "failed on {raw:?}");
        }
        assert_eq!(parse_flexible_date("the 2nd of November"), None);
    }

    #[test]
    fn test_simple_batch_happy_path() {
        let csv = "amount,odds,result,date\n\
                   50,-110,WIN,2024-11-02\n\
                   30,120,L,2024-11-02\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Simple).unwrap();
        assert_eq!(report.imported(), 2);
        assert_eq!(report.skipped_unsettled, 0);
        assert!(report.row_errors.is_empty());

        assert_eq!(report.bets[0].result, BetResult::Win);
        assert_eq!(report.bets[0].profit, Some(dec!(45.45)));
        assert_eq!(report.bets[1].result, BetResult::Loss);
        assert_eq!(report.bets[1].profit, Some(dec!(-30)));
    }

    #[test]
    fn test_missing_column_rejects_whole_batch() {
        let csv = "amount,result,date\n50,WIN,2024-11-02\n";
        let err = normalize(csv.as_bytes(), ImportSchema::Simple).unwrap_err();
        match err {
            LedgerError::Schema { schema, missing } => {
                assert_eq!(schema, "simple");
                assert_eq!(missing, vec!["odds".to_string()]);
            }
            other => panic!("expected Schema error, got {other}"),
        }
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let csv = "Amount, Odds, Result, Date\n50,-110,WIN,2024-11-02\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Simple).unwrap();
        assert_eq!(report.imported(), 1);
    }

    #[test]
    fn test_bad_row_degrades_per_row() {
        let csv = "amount,odds,result,date\n\
                   fifty,-110,WIN,2024-11-02\n\
                   50,-110,WIN,someday\n\
                   50,-110,WIN,2024-11-02\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Simple).unwrap();
        assert_eq!(report.imported(), 1);
        assert_eq!(report.row_errors.len(), 2);
        assert!(matches!(
            report.row_errors[0],
            LedgerError::RowParse { line: 2, .. }
        ));
        assert!(matches!(
            report.row_errors[1],
            LedgerError::RowParse { line: 3, .. }
        ));
    }

    #[test]
    fn test_blank_result_rows_are_skipped_not_errors() {
        let csv = "amount,odds,result,date\n\
                   50,-110,,2024-11-02\n\
                   20,150,NaN,2024-11-03\n\
                   10,200,PENDING,2024-11-03\n\
                   30,120,WIN,2024-11-04\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Simple).unwrap();
        assert_eq!(report.imported(), 1);
        assert_eq!(report.skipped_unsettled, 3);
        assert!(report.row_errors.is_empty());
    }

    #[test]
    fn test_forbidden_odds_is_a_row_error() {
        let csv = "amount,odds,result,date\n50,-50,WIN,2024-11-02\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Simple).unwrap();
        assert_eq!(report.imported(), 0);
        assert_eq!(report.row_errors.len(), 1);
    }

    #[test]
    fn test_empty_input_is_empty_report() {
        let csv = "amount,odds,result,date\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Simple).unwrap();
        assert_eq!(report.imported(), 0);
        assert_eq!(format!("{report}"), "imported 0 bet(s), skipped 0 unsettled row(s), 0 row error(s)");
    }

    #[test]
    fn test_settlement_batch() {
        let csv = "date,amount_usd,price,outcome,outcome_amount,player,team\n\
                   2024-11-02,50,-110.0,Win,45.00,J. Allen,BUF\n\
                   2024-11-03,20,140,Loss,,,\n\
                   2024-11-04,10,200,,,,\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Settlement).unwrap();
        assert_eq!(report.imported(), 2);
        assert_eq!(report.skipped_unsettled, 1);

        // Realized profit comes straight from outcome_amount, not the odds.
        let win = &report.bets[0];
        assert_eq!(win.profit, Some(dec!(45)));
        assert_eq!(win.payout, Some(dec!(95)));
        assert_eq!(win.odds.value(), -110);
        assert_eq!(win.details.player.as_deref(), Some("J. Allen"));
        assert_eq!(win.details.team.as_deref(), Some("BUF"));

        let loss = &report.bets[1];
        assert_eq!(loss.profit, Some(dec!(-20)));
        assert_eq!(loss.payout, Some(dec!(0)));
    }

    #[test]
    fn test_settlement_win_needs_outcome_amount() {
        let csv = "date,amount_usd,price,outcome,outcome_amount\n\
                   2024-11-02,50,-110,Win,\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Settlement).unwrap();
        assert_eq!(report.imported(), 0);
        assert_eq!(report.row_errors.len(), 1);
    }

    #[test]
    fn test_settlement_verbose_date() {
        let csv = "date,amount_usd,price,outcome,outcome_amount\n\
                   Sat Nov 02 2024 21:15:00 GMT-0400 (Eastern Daylight Time),50,-110,W,45.45\n";
        let report = normalize(csv.as_bytes(), ImportSchema::Settlement).unwrap();
        assert_eq!(report.imported(), 1);
        assert_eq!(
            report.bets[0].date,
            NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
        );
    }
}
