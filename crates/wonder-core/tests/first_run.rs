//! End-to-end first-run scenario over an in-memory store and a mock
//! notification gateway.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use wonder_core::notify::MockNotifier;
use wonder_core::storage::{KeyValueStore, MemoryStore};
use wonder_core::{daily, DataStore, MorningRitual, Notifier, Thought};

fn harness() -> (Arc<DataStore>, Arc<MockNotifier>, MorningRitual) {
    let store = Arc::new(DataStore::new(
        Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>
    ));
    let notifier = Arc::new(MockNotifier::new());
    let ritual = MorningRitual::new(
        Arc::clone(&store),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    (store, notifier, ritual)
}

#[tokio::test]
async fn fresh_install_through_first_journey() {
    let (store, _notifier, ritual) = harness();
    let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
    let noon = today.and_hms_opt(12, 0, 0).unwrap();

    // Fresh install.
    assert!(store.is_first_time_user().await);
    assert!(store.journey_progress().await.is_empty());

    // Complete onboarding; journey progress is untouched.
    assert!(store.complete_onboarding().await);
    assert!(!store.is_first_time_user().await);
    assert!(store.journey_progress().await.is_empty());

    // The ritual comes up and arms tomorrow's question.
    assert!(ritual.initialize(noon).await);

    // First open of the day: day 1, streak 1.
    assert_eq!(daily::advance_day(&store, today).await, 1);
    ritual.record_engagement(noon).await;
    assert_eq!(ritual.update_streak(today).await, 1);

    // Open the "time" journey at depth 1, then move to depth 2.
    store.update_journey_progress("time", 1, 1).await;
    store.update_journey_progress("time", 2, 2).await;

    let progress = store.journey_progress_for("time").await.unwrap();
    assert_eq!(progress.current_depth, 2);
    assert_eq!(progress.unlocked_levels, 2);
    let age = Utc::now() - progress.last_accessed;
    assert!(age.num_seconds() < 60);

    // Capture a thought on today's question.
    let question = wonder_core::content::question_for_day(1).unwrap();
    let thought = Thought::new("1", &question.question, "I wonder where the day went", Utc::now())
        .unwrap();
    let per_question = store.save_thought(thought).await;
    assert_eq!(per_question.len(), 1);
    assert_eq!(store.all_thoughts().await.len(), 1);

    // A second open the same day changes neither day nor streak.
    assert_eq!(daily::advance_day(&store, today).await, 1);
    assert_eq!(ritual.update_streak(today).await, 1);
}

#[tokio::test]
async fn next_morning_advances_day_and_streak() {
    let (store, _notifier, ritual) = harness();
    let day_one = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
    let day_two = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();

    assert_eq!(daily::advance_day(&store, day_one).await, 1);
    assert_eq!(ritual.update_streak(day_one).await, 1);

    assert_eq!(daily::advance_day(&store, day_two).await, 2);
    assert_eq!(ritual.update_streak(day_two).await, 2);
}
