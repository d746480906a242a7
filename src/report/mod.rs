//! Performance reporting over a ledger snapshot.
//!
//! Everything here is pure recomputation: the aggregator and summary
//! metrics take a snapshot and a caller-injected "today" and derive the
//! numbers fresh each time. No incremental state, nothing to drift.

pub mod daily;
pub mod summary;

pub use daily::{aggregate, performance, project};
pub use summary::{PositionBasis, SummaryMetrics};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Aggregation window
// ---------------------------------------------------------------------------

/// Which slice of the ledger a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregateMode {
    AllTime,
    MonthToDate,
}

impl fmt::Display for AggregateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateMode::AllTime => write!(f, "all-time"),
            AggregateMode::MonthToDate => write!(f, "month-to-date"),
        }
    }
}

/// Attempt to parse a string into an AggregateMode (case-insensitive).
impl std::str::FromStr for AggregateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all-time" | "all" | "alltime" => Ok(AggregateMode::AllTime),
            "month-to-date" | "mtd" | "month" => Ok(AggregateMode::MonthToDate),
            _ => Err(anyhow::anyhow!("Unknown aggregate mode: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// One day of realized performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// Σ profit over the day's closed bets.
    pub period_profit: Decimal,
    /// Running sum of `period_profit` in ascending date order.
    pub cumulative_profit: Decimal,
    pub bet_count: usize,
}

impl fmt::Display for DailyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:>2} bet(s) | day ${:.2} | cumulative ${:.2}",
            self.date, self.bet_count, self.period_profit, self.cumulative_profit,
        )
    }
}

/// One day of projected performance over still-open bets: an upper and a
/// lower bound, not an expected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedBucket {
    pub date: NaiveDate,
    /// Σ potential_win if every open bet that day wins.
    pub best_case: Decimal,
    /// −Σ stake if every open bet that day loses.
    pub worst_case: Decimal,
    /// Cumulative bounds, offset so the projected series continues from
    /// the end of the realized series.
    pub cumulative_best: Decimal,
    pub cumulative_worst: Decimal,
    pub bet_count: usize,
}

impl fmt::Display for ProjectedBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:>2} open | best ${:.2} / worst ${:.2} | cumulative ${:.2} / ${:.2}",
            self.date,
            self.bet_count,
            self.best_case,
            self.worst_case,
            self.cumulative_best,
            self.cumulative_worst,
        )
    }
}

/// Realized history plus the projected tail for still-open bets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSeries {
    pub realized: Vec<DailyBucket>,
    pub projected: Vec<ProjectedBucket>,
}

impl PerformanceSeries {
    pub fn is_empty(&self) -> bool {
        self.realized.is_empty() && self.projected.is_empty()
    }
}
