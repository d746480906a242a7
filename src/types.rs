//! Shared types for the WAGERBOOK ledger.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that ingestion, report,
//! and export modules can depend on them without circular references.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::odds::AmericanOdds;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle of a bet: open (unsettled) or closed (settled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetStatus {
    Open,
    Closed,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Open => write!(f, "OPEN"),
            BetStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Settled outcome of a bet. `Pending` is only valid while the bet is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetResult {
    Win,
    Loss,
    Pending,
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetResult::Win => write!(f, "WIN"),
            BetResult::Loss => write!(f, "LOSS"),
            BetResult::Pending => write!(f, "PENDING"),
        }
    }
}

/// Attempt to parse a string into a BetResult (case-insensitive).
impl std::str::FromStr for BetResult {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" | "won" => Ok(BetResult::Win),
            "loss" | "lost" | "lose" => Ok(BetResult::Loss),
            "pending" | "open" => Ok(BetResult::Pending),
            _ => Err(anyhow::anyhow!("Unknown bet result: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Bet
// ---------------------------------------------------------------------------

/// Descriptive pass-through attributes. Never used in calculations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetDetails {
    pub player: Option<String>,
    pub team: Option<String>,
    pub position: Option<String>,
    pub line: Option<String>,
    pub transaction_type: Option<String>,
}

impl BetDetails {
    pub fn is_empty(&self) -> bool {
        self.player.is_none()
            && self.team.is_none()
            && self.position.is_none()
            && self.line.is_none()
            && self.transaction_type.is_none()
    }
}

/// A single recorded wager.
///
/// Constructed only through [`Bet::open`], [`Bet::closed`], or
/// [`Bet::settled`], which enforce the invariants: a closed bet always
/// carries payout/profit consistent with its result, an open bet never
/// does, and `Pending` appears only on open bets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: Uuid,
    /// Stake, ≥ 0.
    pub amount: Decimal,
    pub odds: AmericanOdds,
    pub status: BetStatus,
    pub result: BetResult,
    /// Day-granularity only; entry order is tracked by the ledger, not here.
    pub date: NaiveDate,
    /// Total cash returned. `Some` iff closed; 0 for a loss.
    pub payout: Option<Decimal>,
    /// `payout − amount` for a win, `−amount` for a loss. `Some` iff closed.
    pub profit: Option<Decimal>,
    #[serde(default)]
    pub details: BetDetails,
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ${:.2} @ {}",
            self.date, self.result, self.amount, self.odds,
        )?;
        if let (Some(payout), Some(profit)) = (self.payout, self.profit) {
            write!(f, " → payout ${payout:.2} (profit ${profit:.2})")?;
        }
        Ok(())
    }
}

impl Bet {
    /// An unsettled bet. Contributes to potential metrics only.
    pub fn open(amount: Decimal, odds: i32, date: NaiveDate) -> Result<Self, LedgerError> {
        let odds = AmericanOdds::new(odds)?;
        check_amount(amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            odds,
            status: BetStatus::Open,
            result: BetResult::Pending,
            date,
            payout: None,
            profit: None,
            details: BetDetails::default(),
        })
    }

    /// A settled bet priced from its odds: a win pays `amount + win_profit`,
    /// a loss pays nothing and realizes `−amount`.
    ///
    /// Stored payout/profit are rounded to 2 dp here — the storage boundary.
    pub fn closed(
        amount: Decimal,
        odds: i32,
        result: BetResult,
        date: NaiveDate,
    ) -> Result<Self, LedgerError> {
        let odds = AmericanOdds::new(odds)?;
        check_amount(amount)?;
        let (payout, profit) = match result {
            BetResult::Win => {
                let payout = odds.win_payout(amount).round_dp(2);
                (payout, payout - amount)
            }
            BetResult::Loss => (Decimal::ZERO, -amount),
            BetResult::Pending => {
                return Err(LedgerError::Validation(
                    "a closed bet cannot be pending".to_string(),
                ));
            }
        };
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            odds,
            status: BetStatus::Closed,
            result,
            date,
            payout: Some(payout),
            profit: Some(profit),
            details: BetDetails::default(),
        })
    }

    /// A settled bet whose realized profit comes from a settlement export
    /// rather than being recomputed from its odds. Used by the
    /// settlement-export ingestion path; `realized_profit` is ignored for
    /// losses, which always realize `−amount`.
    pub fn settled(
        amount: Decimal,
        odds: i32,
        result: BetResult,
        date: NaiveDate,
        realized_profit: Decimal,
    ) -> Result<Self, LedgerError> {
        let odds = AmericanOdds::new(odds)?;
        check_amount(amount)?;
        let (payout, profit) = match result {
            BetResult::Win => {
                let profit = realized_profit.round_dp(2);
                (amount + profit, profit)
            }
            BetResult::Loss => (Decimal::ZERO, -amount),
            BetResult::Pending => {
                return Err(LedgerError::Validation(
                    "a settled bet cannot be pending".to_string(),
                ));
            }
        };
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            odds,
            status: BetStatus::Closed,
            result,
            date,
            payout: Some(payout),
            profit: Some(profit),
            details: BetDetails::default(),
        })
    }

    /// Attach pass-through metadata.
    pub fn with_details(mut self, details: BetDetails) -> Self {
        self.details = details;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.status == BetStatus::Closed
    }

    pub fn is_open(&self) -> bool {
        self.status == BetStatus::Open
    }

    pub fn is_win(&self) -> bool {
        self.result == BetResult::Win
    }

    /// Profit this bet would realize if it won, full precision.
    /// For a closed win this recomputes from odds and may differ from the
    /// stored (settlement-supplied) profit.
    pub fn potential_win(&self) -> Decimal {
        self.odds.win_profit(self.amount)
    }

    /// Re-check the record invariants. The constructors cannot produce a
    /// violating bet, but the ledger re-validates on `add` so that records
    /// built elsewhere (e.g. deserialized) are held to the same rules.
    pub fn validate(&self) -> Result<(), LedgerError> {
        check_amount(self.amount)?;
        match (self.status, self.result) {
            (BetStatus::Open, BetResult::Pending) => {
                if self.payout.is_some() || self.profit.is_some() {
                    return Err(LedgerError::Validation(
                        "an open bet cannot carry payout or profit".to_string(),
                    ));
                }
            }
            (BetStatus::Open, _) => {
                return Err(LedgerError::Validation(
                    "an open bet must be pending".to_string(),
                ));
            }
            (BetStatus::Closed, BetResult::Pending) => {
                return Err(LedgerError::Validation(
                    "a closed bet cannot be pending".to_string(),
                ));
            }
            (BetStatus::Closed, _) => {
                if self.payout.is_none() || self.profit.is_none() {
                    return Err(LedgerError::Validation(
                        "a closed bet must carry payout and profit".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn check_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "stake must be non-negative, got {amount}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the ledger engine.
///
/// Nothing here is fatal: every failure is local, reported to the caller,
/// and leaves prior state intact.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid American odds {0}: must be >= +100 or <= -100")]
    InvalidOdds(i32),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("import ({schema}) missing required column(s): {}", .missing.join(", "))]
    Schema { schema: String, missing: Vec<String> },

    #[error("row {line}: {message}")]
    RowParse { line: usize, message: String },

    #[error("bet not found: {0}")]
    NotFound(Uuid),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
