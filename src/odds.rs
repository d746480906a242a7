//! American odds math.
//!
//! Converts a signed American price and a stake into win profit and
//! payout. All arithmetic runs at full `Decimal` precision; rounding to
//! cents happens only where a value is stored or displayed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::LedgerError;

// ---------------------------------------------------------------------------
// AmericanOdds
// ---------------------------------------------------------------------------

/// A validated American odds price.
///
/// American odds are never in (-100, 100): positive values quote profit
/// per $100 staked on an underdog, negative values quote the stake
/// required per $100 of profit on a favorite. Constructing through
/// [`AmericanOdds::new`] makes the win-math methods infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct AmericanOdds(i32);

impl AmericanOdds {
    pub fn new(value: i32) -> Result<Self, LedgerError> {
        if value >= 100 || value <= -100 {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidOdds(value))
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// Whether this price quotes a favorite (negative odds).
    pub fn is_favorite(&self) -> bool {
        self.0 < 0
    }

    /// Profit on a winning bet of `stake`, full precision.
    pub fn win_profit(&self, stake: Decimal) -> Decimal {
        if self.0 > 0 {
            stake * Decimal::from(self.0) / dec!(100)
        } else {
            stake * dec!(100) / Decimal::from(self.0.abs())
        }
    }

    /// Total cash returned on a winning bet of `stake`: stake + profit.
    pub fn win_payout(&self, stake: Decimal) -> Decimal {
        stake + self.win_profit(stake)
    }
}

impl fmt::Display for AmericanOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl TryFrom<i32> for AmericanOdds {
    type Error = LedgerError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AmericanOdds> for i32 {
    fn from(odds: AmericanOdds) -> i32 {
        odds.0
    }
}

/// Parse "+150", "150", or "-110" (case of a leading sign is the only
/// variation American price feeds show).
impl std::str::FromStr for AmericanOdds {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i32 = trimmed
            .parse()
            .map_err(|_| LedgerError::Validation(format!("unparseable odds: {trimmed:?}")))?;
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Total cash returned on a win: `amount + profit_for_win(odds, amount)`.
pub fn payout(odds: i32, amount: Decimal) -> Result<Decimal, LedgerError> {
    Ok(AmericanOdds::new(odds)?.win_payout(amount))
}

/// Profit on a win: `amount * odds / 100` for positive odds,
/// `amount * 100 / |odds|` for negative odds.
pub fn profit_for_win(odds: i32, amount: Decimal) -> Result<Decimal, LedgerError> {
    Ok(AmericanOdds::new(odds)?.win_profit(amount))
}

/// What a still-open bet stands to gain. Same math as a winning profit.
pub fn potential_win(odds: i32, amount: Decimal) -> Result<Decimal, LedgerError> {
    profit_for_win(odds, amount)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
