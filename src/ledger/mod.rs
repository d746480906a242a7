//! The bet ledger.
//!
//! An ordered, session-scoped collection of bet records: append via
//! `add`, delete by identity via `remove`, and hand read-only copies to
//! the aggregation code via `snapshot`. There are no incremental running
//! totals anywhere — every metric is recomputed from a snapshot, so a
//! deletion cannot leave totals drifted.

use tracing::{debug, info};
use uuid::Uuid;

use crate::types::{Bet, LedgerError};

/// Ordered sequence of bet records. Insertion order is entry order,
/// which is not necessarily sorted by bet date.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    bets: Vec<Bet>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a bet. Returns the bet's id.
    /// On failure the ledger is unchanged.
    pub fn add(&mut self, bet: Bet) -> Result<Uuid, LedgerError> {
        bet.validate()?;
        let id = bet.id;
        debug!(%id, bet = %bet, "Bet recorded");
        self.bets.push(bet);
        Ok(id)
    }

    /// Validate and append a whole batch, all-or-nothing: if any record
    /// fails validation, none are appended.
    pub fn add_all(&mut self, bets: Vec<Bet>) -> Result<Vec<Uuid>, LedgerError> {
        for bet in &bets {
            bet.validate()?;
        }
        let ids = bets.iter().map(|b| b.id).collect();
        info!(count = bets.len(), "Batch recorded");
        self.bets.extend(bets);
        Ok(ids)
    }

    /// Remove a bet by identity, returning it.
    pub fn remove(&mut self, id: Uuid) -> Result<Bet, LedgerError> {
        let index = self
            .bets
            .iter()
            .position(|b| b.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        let bet = self.bets.remove(index);
        debug!(%id, "Bet removed");
        Ok(bet)
    }

    /// An immutable copy of the current records for read-only use by the
    /// aggregator and summary metrics. Consumers never observe a ledger
    /// mutated mid-computation.
    pub fn snapshot(&self) -> Vec<Bet> {
        self.bets.clone()
    }

    /// Clear all records unconditionally. Idempotent.
    pub fn reset(&mut self) {
        info!(dropped = self.bets.len(), "Ledger reset");
        self.bets.clear();
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bet> {
        self.bets.iter()
    }

    /// Settled bets only.
    pub fn closed(&self) -> impl Iterator<Item = &Bet> {
        self.bets.iter().filter(|b| b.is_closed())
    }

    /// Unsettled bets only.
    pub fn open(&self) -> impl Iterator<Item = &Bet> {
        self.bets.iter().filter(|b| b.is_open())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
