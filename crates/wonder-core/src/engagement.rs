//! Engagement bookkeeping: streaks and notification-hour learning.
//!
//! This module holds the pure rules; the store-backed application of them
//! lives on [`MorningRitual`](crate::ritual::MorningRitual):
//! - a bounded FIFO history of engagement timestamps (30 most recent)
//! - the consecutive-day streak transition
//! - a frequency histogram over engagement hours that recommends when to
//!   deliver the daily notification

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::model::EngagementRecord;

/// Engagement history is capped at the 30 most-recent entries.
pub const MAX_HISTORY: usize = 30;

/// Hour learning waits for at least a week of samples.
pub const MIN_SAMPLE: usize = 7;

/// Notifications are never recommended before 06:00.
pub const EARLIEST_HOUR: u32 = 6;

/// Append `record`, evicting the oldest entries past [`MAX_HISTORY`].
/// Strict FIFO: survivors keep their order.
pub fn push_capped(history: &mut Vec<EngagementRecord>, record: EngagementRecord) {
    history.push(record);
    if history.len() > MAX_HISTORY {
        let overflow = history.len() - MAX_HISTORY;
        history.drain(..overflow);
    }
}

/// What a day's first open does to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Opened yesterday (or never before): the streak grows.
    Extended(u32),
    /// A day was skipped: back to 1.
    Reset,
    /// Already counted today.
    Unchanged,
}

/// Compare the last-open calendar date against `today`.
///
/// No prior open and a yesterday open both extend; any older date resets;
/// a same-day open changes nothing, which is what makes repeated calls on
/// one day idempotent once the last-open date is written back.
pub fn streak_transition(
    last_open: Option<NaiveDate>,
    today: NaiveDate,
    current: u32,
) -> StreakChange {
    let yesterday = today - Duration::days(1);
    match last_open {
        None => StreakChange::Extended(current + 1),
        Some(date) if date == yesterday => StreakChange::Extended(current + 1),
        Some(date) if date == today => StreakChange::Unchanged,
        Some(_) => StreakChange::Reset,
    }
}

/// Recommend a notification hour from the engagement history.
///
/// Returns `None` below [`MIN_SAMPLE`] entries. Otherwise: histogram the
/// `hour` field, take the most frequent hour (ties go to the lowest hour),
/// and recommend one hour earlier, floored at [`EARLIEST_HOUR`].
pub fn optimal_hour(history: &[EngagementRecord]) -> Option<u32> {
    if history.len() < MIN_SAMPLE {
        return None;
    }
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for record in history {
        *counts.entry(record.hour).or_insert(0) += 1;
    }
    let mut best_hour = 0;
    let mut best_count = 0;
    for (&hour, &count) in &counts {
        if count > best_count {
            best_hour = hour;
            best_count = count;
        }
    }
    Some(best_hour.saturating_sub(1).max(EARLIEST_HOUR))
}

/// Hysteresis: only move the preferred hour when the recommendation differs
/// from the current one by more than an hour.
pub fn should_retune(current: u32, proposed: u32) -> bool {
    current.abs_diff(proposed) > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn record_at_hour(hour: u32) -> EngagementRecord {
        EngagementRecord {
            hour,
            minute: 0,
            day_of_week: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn history_cap_is_strict_fifo() {
        let mut history = Vec::new();
        for minute in 0..35u32 {
            push_capped(
                &mut history,
                EngagementRecord {
                    hour: 9,
                    minute,
                    day_of_week: 1,
                    timestamp: Utc::now(),
                },
            );
        }
        assert_eq!(history.len(), MAX_HISTORY);
        // Oldest five evicted; survivors keep insertion order.
        assert_eq!(history.first().map(|r| r.minute), Some(5));
        assert_eq!(history.last().map(|r| r.minute), Some(34));
    }

    proptest! {
        #[test]
        fn history_never_exceeds_cap(n in 0usize..120) {
            let mut history = Vec::new();
            for i in 0..n {
                push_capped(&mut history, record_at_hour((i % 24) as u32));
            }
            prop_assert!(history.len() <= MAX_HISTORY);
            prop_assert_eq!(history.len(), n.min(MAX_HISTORY));
        }
    }

    #[test]
    fn first_open_ever_starts_the_streak() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(streak_transition(None, today, 0), StreakChange::Extended(1));
    }

    #[test]
    fn yesterday_extends_and_gap_resets() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let yesterday = today - Duration::days(1);
        let three_days_ago = today - Duration::days(3);

        assert_eq!(
            streak_transition(Some(yesterday), today, 4),
            StreakChange::Extended(5)
        );
        assert_eq!(
            streak_transition(Some(three_days_ago), today, 4),
            StreakChange::Reset
        );
    }

    #[test]
    fn same_day_changes_nothing() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(
            streak_transition(Some(today), today, 4),
            StreakChange::Unchanged
        );
    }

    #[test]
    fn optimal_hour_needs_a_week_of_samples() {
        let history: Vec<_> = (0..6).map(|_| record_at_hour(9)).collect();
        assert_eq!(optimal_hour(&history), None);
    }

    #[test]
    fn optimal_hour_is_one_before_the_mode() {
        let mut history: Vec<_> = (0..5).map(|_| record_at_hour(9)).collect();
        history.extend((0..3).map(|_| record_at_hour(14)));
        assert_eq!(optimal_hour(&history), Some(8));
    }

    #[test]
    fn optimal_hour_tie_goes_to_the_lowest_hour() {
        let mut history: Vec<_> = (0..4).map(|_| record_at_hour(20)).collect();
        history.extend((0..4).map(|_| record_at_hour(9)));
        assert_eq!(optimal_hour(&history), Some(8));
    }

    #[test]
    fn optimal_hour_never_recommends_before_six() {
        let history: Vec<_> = (0..8).map(|_| record_at_hour(5)).collect();
        assert_eq!(optimal_hour(&history), Some(6));

        let midnight: Vec<_> = (0..8).map(|_| record_at_hour(0)).collect();
        assert_eq!(optimal_hour(&midnight), Some(6));
    }

    #[test]
    fn retune_requires_more_than_an_hour_of_drift() {
        assert!(!should_retune(6, 6));
        assert!(!should_retune(6, 7));
        assert!(!should_retune(6, 5));
        assert!(should_retune(6, 8));
        assert!(should_retune(9, 6));
    }
}
