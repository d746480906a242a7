//! Daily/monthly aggregation.
//!
//! Buckets a snapshot by calendar day and folds per-day profit into a
//! running cumulative series. `today` is always injected by the caller —
//! the wall clock is read only at the CLI boundary — so month-to-date
//! output is deterministic under test.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{AggregateMode, DailyBucket, PerformanceSeries, ProjectedBucket};
use crate::types::Bet;

/// Bucket CLOSED bets by date and compute the cumulative profit series.
///
/// Buckets are sorted ascending by date; ties within a date are summed.
/// Zero-profit days are emitted — dropping them is a presentation choice,
/// not an aggregation rule. Empty input yields an empty series.
pub fn aggregate(bets: &[Bet], mode: AggregateMode, today: NaiveDate) -> Vec<DailyBucket> {
    let mut by_date: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
    for bet in bets {
        if !bet.is_closed() || !in_window(bet.date, mode, today) {
            continue;
        }
        let entry = by_date.entry(bet.date).or_default();
        entry.0 += bet.profit.unwrap_or(Decimal::ZERO);
        entry.1 += 1;
    }

    let mut cumulative = Decimal::ZERO;
    by_date
        .into_iter()
        .map(|(date, (period_profit, bet_count))| {
            cumulative += period_profit;
            DailyBucket {
                date,
                period_profit,
                cumulative_profit: cumulative,
                bet_count,
            }
        })
        .collect()
}

/// Bucket OPEN bets by date into best/worst-case bounds, with cumulative
/// tracks starting from `baseline` (the realized series' final value).
pub fn project(
    bets: &[Bet],
    mode: AggregateMode,
    today: NaiveDate,
    baseline: Decimal,
) -> Vec<ProjectedBucket> {
    let mut by_date: BTreeMap<NaiveDate, (Decimal, Decimal, usize)> = BTreeMap::new();
    for bet in bets {
        if !bet.is_open() || !in_window(bet.date, mode, today) {
            continue;
        }
        let entry = by_date.entry(bet.date).or_default();
        entry.0 += bet.potential_win();
        entry.1 -= bet.amount;
        entry.2 += 1;
    }

    let mut cumulative_best = baseline;
    let mut cumulative_worst = baseline;
    by_date
        .into_iter()
        .map(|(date, (best, worst, bet_count))| {
            // Bound sums are surfaced per bucket — round here, then keep the
            // cumulative tracks consistent with the rounded values.
            let best_case = best.round_dp(2);
            let worst_case = worst.round_dp(2);
            cumulative_best += best_case;
            cumulative_worst += worst_case;
            ProjectedBucket {
                date,
                best_case,
                worst_case,
                cumulative_best,
                cumulative_worst,
                bet_count,
            }
        })
        .collect()
}

/// Full performance view: realized history plus the projected tail, with
/// the projected cumulative bounds continuing from where the realized
/// series ends (zero when there is no realized history).
pub fn performance(bets: &[Bet], mode: AggregateMode, today: NaiveDate) -> PerformanceSeries {
    let realized = aggregate(bets, mode, today);
    let baseline = realized
        .last()
        .map(|b| b.cumulative_profit)
        .unwrap_or(Decimal::ZERO);
    let projected = project(bets, mode, today, baseline);
    PerformanceSeries { realized, projected }
}

fn in_window(date: NaiveDate, mode: AggregateMode, today: NaiveDate) -> bool {
    match mode {
        AggregateMode::AllTime => true,
        AggregateMode::MonthToDate => date >= today.with_day(1).unwrap_or(today),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BetResult;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn win(amount: Decimal, odds: i32, on: NaiveDate) -> Bet {
        Bet::closed(amount, odds, BetResult::Win, on).unwrap()
    }

    fn loss(amount: Decimal, odds: i32, on: NaiveDate) -> Bet {
        Bet::closed(amount, odds, BetResult::Loss, on).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 11, 15)
    }

    #[test]
    fn test_empty_input_empty_series() {
        assert!(aggregate(&[], AggregateMode::AllTime, today()).is_empty());
        assert!(performance(&[], AggregateMode::AllTime, today()).is_empty());
    }

    #[test]
    fn test_same_day_profits_are_summed() {
        let d = date(2024, 11, 2);
        let bets = vec![win(dec!(50), -110, d), loss(dec!(30), 120, d)];
        let buckets = aggregate(&bets, AggregateMode::AllTime, today());
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].period_profit, dec!(15.45));
        assert_eq!(buckets[0].cumulative_profit, dec!(15.45));
        assert_eq!(buckets[0].bet_count, 2);
    }

    #[test]
    fn test_cumulative_is_prefix_sum_in_date_order() {
        let bets = vec![
            win(dec!(10), 100, date(2024, 11, 3)),   // +10
            loss(dec!(25), 150, date(2024, 11, 5)),  // -25
            win(dec!(20), 150, date(2024, 11, 1)),   // +30
        ];
        let buckets = aggregate(&bets, AggregateMode::AllTime, today());
        let dates: Vec<NaiveDate> = buckets.iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 11, 1), date(2024, 11, 3), date(2024, 11, 5)]
        );
        assert_eq!(buckets[0].cumulative_profit, dec!(30));
        assert_eq!(buckets[1].cumulative_profit, dec!(40));
        assert_eq!(buckets[2].cumulative_profit, dec!(15));

        let prefix: Decimal = buckets.iter().map(|b| b.period_profit).sum();
        assert_eq!(buckets.last().unwrap().cumulative_profit, prefix);
    }

    #[test]
    fn test_entry_order_is_irrelevant() {
        let mut bets = vec![
            win(dec!(10), 100, date(2024, 11, 3)),
            loss(dec!(25), 150, date(2024, 11, 5)),
            win(dec!(20), 150, date(2024, 11, 1)),
            loss(dec!(5), -200, date(2024, 11, 3)),
        ];
        let forward = aggregate(&bets, AggregateMode::AllTime, today());
        bets.reverse();
        let reversed = aggregate(&bets, AggregateMode::AllTime, today());
        bets.swap(0, 2);
        let shuffled = aggregate(&bets, AggregateMode::AllTime, today());
        assert_eq!(forward, reversed);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_zero_profit_day_is_emitted() {
        // +20 and -20 on the same day net to zero but the day still shows.
        let d = date(2024, 11, 2);
        let bets = vec![win(dec!(20), 100, d), loss(dec!(20), 100, d)];
        let buckets = aggregate(&bets, AggregateMode::AllTime, today());
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].period_profit, Decimal::ZERO);
    }

    #[test]
    fn test_open_bets_never_touch_realized_buckets() {
        let d = date(2024, 11, 2);
        let bets = vec![
            win(dec!(50), -110, d),
            Bet::open(dec!(100), 300, d).unwrap(),
        ];
        let buckets = aggregate(&bets, AggregateMode::AllTime, today());
        assert_eq!(buckets[0].period_profit, dec!(45.45));
        assert_eq!(buckets[0].bet_count, 1);
    }

    #[test]
    fn test_month_to_date_filters_on_injected_today() {
        let bets = vec![
            win(dec!(10), 100, date(2024, 10, 28)),
            win(dec!(20), 100, date(2024, 11, 1)),
            win(dec!(30), 100, date(2024, 11, 14)),
        ];
        let mtd = aggregate(&bets, AggregateMode::MonthToDate, today());
        assert_eq!(mtd.len(), 2);
        assert_eq!(mtd[0].date, date(2024, 11, 1));
        assert_eq!(mtd.last().unwrap().cumulative_profit, dec!(50));

        // Same ledger, different "today": the October bet is in window.
        let mtd_october = aggregate(&bets, AggregateMode::MonthToDate, date(2024, 10, 31));
        assert_eq!(mtd_october.len(), 3);
    }

    #[test]
    fn test_projection_continues_from_realized_tail() {
        let bets = vec![
            win(dec!(50), -110, date(2024, 11, 2)),   // realized +45.45
            Bet::open(dec!(10), 200, date(2024, 11, 10)).unwrap(), // +20 / -10
            Bet::open(dec!(5), 100, date(2024, 11, 10)).unwrap(),  // +5 / -5
        ];
        let series = performance(&bets, AggregateMode::AllTime, today());
        assert_eq!(series.realized.len(), 1);
        assert_eq!(series.projected.len(), 1);

        let p = &series.projected[0];
        assert_eq!(p.best_case, dec!(25));
        assert_eq!(p.worst_case, dec!(-15));
        assert_eq!(p.cumulative_best, dec!(70.45));
        assert_eq!(p.cumulative_worst, dec!(30.45));
        assert_eq!(p.bet_count, 2);
    }

    #[test]
    fn test_projection_without_history_starts_at_zero() {
        let bets = vec![Bet::open(dec!(10), 200, date(2024, 11, 10)).unwrap()];
        let series = performance(&bets, AggregateMode::AllTime, today());
        assert!(series.realized.is_empty());
        assert_eq!(series.projected[0].cumulative_best, dec!(20));
        assert_eq!(series.projected[0].cumulative_worst, dec!(-10));
    }

    #[test]
    fn test_projected_buckets_sorted_and_cumulative() {
        let bets = vec![
            Bet::open(dec!(10), 100, date(2024, 11, 12)).unwrap(),
            Bet::open(dec!(10), 100, date(2024, 11, 10)).unwrap(),
        ];
        let buckets = project(&bets, AggregateMode::AllTime, today(), dec!(5));
        assert_eq!(buckets[0].date, date(2024, 11, 10));
        assert_eq!(buckets[0].cumulative_best, dec!(15));
        assert_eq!(buckets[1].cumulative_best, dec!(25));
        assert_eq!(buckets[1].cumulative_worst, dec!(-15));
    }
}
