//! Scalar summary metrics over a ledger snapshot.
//!
//! Pure functions, recomputed on demand. A deletion followed by an
//! equivalent re-add therefore restores every metric exactly — there is
//! no incremental state to drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Bet;

// ---------------------------------------------------------------------------
// Position basis
// ---------------------------------------------------------------------------

/// Which bets count toward `total_position`. The source material is
/// ambiguous here, so it is a fixed product decision surfaced in config
/// rather than something inferred per call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionBasis {
    /// Every recorded bet, open or closed.
    #[default]
    All,
    /// Settled bets only.
    Closed,
}

impl fmt::Display for PositionBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionBasis::All => write!(f, "all"),
            PositionBasis::Closed => write!(f, "closed"),
        }
    }
}

/// Attempt to parse a string into a PositionBasis (case-insensitive).
impl std::str::FromStr for PositionBasis {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "both" => Ok(PositionBasis::All),
            "closed" | "settled" => Ok(PositionBasis::Closed),
            _ => Err(anyhow::anyhow!("Unknown position basis: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Derived scalars over a ledger snapshot. Currency fields are surfaced
/// at 2 dp; the fold below runs at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Σ stake over the configured basis.
    pub total_position: Decimal,
    /// Σ realized profit over closed bets.
    pub total_returns: Decimal,
    /// Σ payout over closed wins − Σ stake over closed losses.
    pub available_credit: Decimal,
    /// 100 · wins / closed; 0.0 with no closed bets.
    pub win_percentage: f64,
    /// Σ potential win over ALL bets — the everything-wins upper bound.
    pub potential_win: Decimal,
    /// Σ stake over ALL bets — the everything-loses lower bound.
    pub potential_loss: Decimal,
    pub closed_count: usize,
    pub open_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
}

impl SummaryMetrics {
    pub fn compute(bets: &[Bet], basis: PositionBasis) -> Self {
        let mut total_position = Decimal::ZERO;
        let mut total_returns = Decimal::ZERO;
        let mut available_credit = Decimal::ZERO;
        let mut potential_win = Decimal::ZERO;
        let mut potential_loss = Decimal::ZERO;
        let mut closed_count = 0;
        let mut open_count = 0;
        let mut win_count = 0;
        let mut loss_count = 0;

        for bet in bets {
            if basis == PositionBasis::All || bet.is_closed() {
                total_position += bet.amount;
            }
            potential_win += bet.potential_win();
            potential_loss += bet.amount;

            if bet.is_closed() {
                closed_count += 1;
                total_returns += bet.profit.unwrap_or(Decimal::ZERO);
                if bet.is_win() {
                    win_count += 1;
                    available_credit += bet.payout.unwrap_or(Decimal::ZERO);
                } else {
                    loss_count += 1;
                    available_credit -= bet.amount;
                }
            } else {
                open_count += 1;
            }
        }

        let win_percentage = if closed_count == 0 {
            0.0
        } else {
            100.0 * win_count as f64 / closed_count as f64
        };

        Self {
            total_position: total_position.round_dp(2),
            total_returns: total_returns.round_dp(2),
            available_credit: available_credit.round_dp(2),
            win_percentage,
            potential_win: potential_win.round_dp(2),
            potential_loss: potential_loss.round_dp(2),
            closed_count,
            open_count,
            win_count,
            loss_count,
        }
    }
}

impl fmt::Display for SummaryMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "position=${:.2} | returns=${:.2} | credit=${:.2} | win_rate={:.1}% ({}W/{}L, {} open) | potential +${:.2}/-${:.2}",
            self.total_position,
            self.total_returns,
            self.available_credit,
            self.win_percentage,
            self.win_count,
            self.loss_count,
            self.open_count,
            self.potential_win,
            self.potential_loss,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
