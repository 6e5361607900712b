//! The 30-day daily question cycle.
//!
//! One question per calendar day, wrapping back to day 1 after day 30. The
//! day counter only moves on the first open of a new calendar day; repeated
//! opens on the same day keep showing the same question.

use chrono::NaiveDate;

use crate::store::DataStore;

/// Length of the question cycle in days.
pub const CYCLE_DAYS: u32 = 30;

/// Cyclic successor of a day counter: day 30 wraps to 1, never 31.
pub fn next_day(current: u32) -> u32 {
    (current % CYCLE_DAYS) + 1
}

/// Advance the stored day counter if `today` is a new calendar day, and
/// return the day to show.
///
/// A fresh install starts at day 1. This reads the last-open date but does
/// not write it; the streak update that follows in the open-today flow owns
/// that write.
pub async fn advance_day(store: &DataStore, today: NaiveDate) -> u32 {
    let saved = store.stored_day().await;
    if store.last_open_date().await == Some(today) {
        return saved.unwrap_or(1);
    }
    let day = match saved {
        Some(current) => next_day(current),
        None => 1,
    };
    store.set_current_day(day).await;
    day
}
