//! The morning ritual: one daily notification, kept in tune with the user.
//!
//! Owns the single outstanding "tomorrow's question" notification. On top of
//! the plain scheduling it:
//! - learns the user's preferred hour from engagement history and retunes
//!   the schedule when the drift is large enough
//! - maintains the consecutive-day streak and celebrates milestones
//! - adds a weekly reflection on Saturdays for the coming Sunday evening
//!
//! Collaborators are injected: a [`DataStore`] for state and a [`Notifier`]
//! for delivery, so tests run against a mock of either.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::content;
use crate::daily;
use crate::engagement::{
    self, optimal_hour, push_capped, should_retune, streak_transition, StreakChange,
};
use crate::model::{EngagementRecord, RitualTime};
use crate::notify::{NotificationRequest, Notifier, Trigger};
use crate::store::DataStore;

/// Lifecycle of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RitualState {
    Uninitialized,
    PermissionPending,
    Scheduled,
    Rescheduling,
}

/// Notification behavior knobs.
#[derive(Debug, Clone)]
pub struct RitualConfig {
    /// Silent by design; opt in to sound explicitly.
    pub sound: bool,
    pub badge: bool,
    pub weekly_reflection: bool,
}

impl Default for RitualConfig {
    fn default() -> Self {
        Self {
            sound: false,
            badge: true,
            weekly_reflection: true,
        }
    }
}

/// Scheduler for the daily wonder notification.
pub struct MorningRitual {
    store: Arc<DataStore>,
    notifier: Arc<dyn Notifier>,
    config: RitualConfig,
    time: Mutex<RitualTime>,
    state: Mutex<RitualState>,
    initialized: AtomicBool,
}

impl MorningRitual {
    pub fn new(store: Arc<DataStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, RitualConfig::default())
    }

    pub fn with_config(
        store: Arc<DataStore>,
        notifier: Arc<dyn Notifier>,
        config: RitualConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            time: Mutex::new(RitualTime::default()),
            state: Mutex::new(RitualState::Uninitialized),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> RitualState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: RitualState) {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    fn preferred_time(&self) -> RitualTime {
        *self
            .time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remember_time(&self, time: RitualTime) {
        *self
            .time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = time;
    }

    /// Bring the ritual up: request permission, load the preferred time and
    /// arm tomorrow's notification. Idempotent; a denied permission leaves
    /// the scheduler uninitialized and returns `false`.
    pub async fn initialize(&self, now: NaiveDateTime) -> bool {
        if self.initialized.load(Ordering::SeqCst) {
            return true;
        }

        self.set_state(RitualState::PermissionPending);
        let granted = match self.notifier.request_permission().await {
            Ok(granted) => granted,
            Err(err) => {
                warn!(error = %err, "permission request failed");
                false
            }
        };
        if !granted {
            self.set_state(RitualState::Uninitialized);
            return false;
        }

        if self.store.push_token().await.is_none() {
            self.store
                .set_push_token(&uuid::Uuid::new_v4().to_string())
                .await;
        }

        self.remember_time(self.store.morning_ritual_time().await);
        self.schedule_tomorrows_wonder(now).await;
        self.set_state(RitualState::Scheduled);
        self.initialized.store(true, Ordering::SeqCst);
        true
    }

    /// Arm tomorrow's question at the preferred time. On Saturdays also arms
    /// the weekly reflection for Sunday evening.
    pub async fn schedule_tomorrows_wonder(&self, now: NaiveDateTime) -> bool {
        let next = match self.store.stored_day().await {
            Some(current) => daily::next_day(current),
            None => 1,
        };
        let Some(question) = content::question_for_day(next) else {
            warn!(day = next, "no question for day");
            return false;
        };

        let time = self.preferred_time();
        let tomorrow = now.date() + Duration::days(1);
        let Some(fire_at) = tomorrow.and_hms_opt(time.hour, time.minute, 0) else {
            warn!(hour = time.hour, minute = time.minute, "preferred time out of range");
            return false;
        };

        let request = NotificationRequest {
            title: question.question.clone(),
            body: "Take a moment to wonder...".to_string(),
            data: json!({ "questionId": question.id, "date": question.date }),
            sound: self.config.sound,
            badge: self.config.badge.then_some(1),
            trigger: Trigger::At(fire_at),
        };
        if let Err(err) = self.notifier.schedule(request).await {
            warn!(error = %err, "scheduling tomorrow's question failed");
        }

        if self.config.weekly_reflection && now.date().weekday() == chrono::Weekday::Sat {
            self.schedule_weekly_reflection(now).await;
        }
        true
    }

    /// Arm the weekly reflection for the upcoming Sunday at 19:00.
    async fn schedule_weekly_reflection(&self, now: NaiveDateTime) {
        let days_to_sunday = 7 - now.date().weekday().num_days_from_sunday();
        let sunday = now.date() + Duration::days(days_to_sunday as i64);
        let Some(fire_at) = sunday.and_hms_opt(19, 0, 0) else {
            return;
        };

        let request = NotificationRequest {
            title: "Your Week of Wonder".to_string(),
            body: "You pondered 7 profound questions this week. Ready to go deeper?"
                .to_string(),
            data: json!({ "type": "weekly_reflection" }),
            sound: self.config.sound,
            badge: None,
            trigger: Trigger::At(fire_at),
        };
        if let Err(err) = self.notifier.schedule(request).await {
            warn!(error = %err, "scheduling weekly reflection failed");
        }
    }

    /// Persist a new preferred time, drop every armed notification and arm
    /// a fresh one.
    pub async fn set_preferred_time(&self, now: NaiveDateTime, hour: u32, minute: u32) -> bool {
        let time = match RitualTime::new(hour, minute) {
            Ok(time) => time,
            Err(err) => {
                warn!(error = %err, "rejected preferred time");
                return false;
            }
        };

        self.set_state(RitualState::Rescheduling);
        self.remember_time(time);
        self.store.set_morning_ritual_time(time).await;

        if let Err(err) = self.notifier.cancel_all().await {
            warn!(error = %err, "cancelling notifications failed");
        }
        self.schedule_tomorrows_wonder(now).await;
        self.set_state(RitualState::Scheduled);
        true
    }

    /// Record one engagement and, with a week of history, tune the
    /// notification hour toward when the user actually shows up.
    pub async fn record_engagement(&self, now: NaiveDateTime) {
        let record = EngagementRecord::at(now, Utc::now());
        let mut history = self.store.engagement_history().await;
        push_capped(&mut history, record);
        self.store.set_engagement_history(&history).await;

        if history.len() >= engagement::MIN_SAMPLE {
            self.optimize_notification_time(now, &history).await;
        }
    }

    async fn optimize_notification_time(&self, now: NaiveDateTime, history: &[EngagementRecord]) {
        let Some(proposed) = optimal_hour(history) else {
            return;
        };
        let current = self.preferred_time();
        if !should_retune(current.hour, proposed) {
            debug!(current = current.hour, proposed, "hour drift within hysteresis");
            return;
        }

        self.set_preferred_time(now, proposed, 0).await;
        let request = NotificationRequest {
            title: "Wonder knows you better now".to_string(),
            body: format!("We'll send your daily question at {proposed}:00 AM"),
            data: serde_json::Value::Null,
            sound: self.config.sound,
            badge: None,
            trigger: Trigger::After(1),
        };
        if let Err(err) = self.notifier.schedule(request).await {
            warn!(error = %err, "scheduling retune notice failed");
        }
    }

    /// Apply a day's first open to the streak and write today as the last
    /// open date. Repeated calls on one day leave the streak unchanged.
    pub async fn update_streak(&self, today: NaiveDate) -> u32 {
        let last_open = self.store.last_open_date().await;
        let current = self.store.streak_count().await;

        match streak_transition(last_open, today, current) {
            StreakChange::Extended(streak) => {
                self.store.set_streak_count(streak).await;
                self.store.set_last_open_date(today).await;
                self.check_milestones().await;
                streak
            }
            StreakChange::Reset => {
                self.store.set_streak_count(1).await;
                self.store.set_last_open_date(today).await;
                1
            }
            StreakChange::Unchanged => current,
        }
    }

    /// Celebrate a milestone streak with a near-immediate notification.
    /// Returns whether one fired.
    pub async fn check_milestones(&self) -> bool {
        let streak = self.store.streak_count().await;
        let Some(message) = milestone_message(streak) else {
            return false;
        };

        let request = NotificationRequest {
            title: message.to_string(),
            body: "Your journey into wonder continues...".to_string(),
            data: json!({ "type": "milestone", "streak": streak }),
            sound: self.config.sound,
            badge: None,
            trigger: Trigger::After(2),
        };
        if let Err(err) = self.notifier.schedule(request).await {
            warn!(error = %err, "scheduling milestone failed");
            return false;
        }
        true
    }
}

/// The congratulation for a milestone streak, if this streak is one.
pub fn milestone_message(streak: u32) -> Option<&'static str> {
    match streak {
        7 => Some("A week of wonder! You are developing a beautiful habit."),
        30 => Some("A month of deep thinking. You are transforming your mind."),
        100 => Some("One hundred days of wonder. You are a philosopher now."),
        365 => Some("A year of profound questions. You have changed forever."),
        _ => None,
    }
}

/// The current local wall-clock time, the `now` the CLI hands to the
/// scheduler.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MockNotifier;
    use crate::storage::{KeyValueStore, MemoryStore};

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

    fn thursday_noon() -> NaiveDateTime {
        // 2026-08-06 is a Thursday.
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn saturday_noon() -> NaiveDateTime {
        // 2026-08-08 is a Saturday.
        NaiveDate::from_ymd_opt(2026, 8, 8)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn wonder_requests(notifier: &MockNotifier) -> Vec<NotificationRequest> {
        notifier
            .scheduled()
            .into_iter()
            .filter(|r| r.data.get("questionId").is_some())
            .collect()
    }

    #[tokio::test]
    async fn initialize_arms_tomorrow_at_six() {
        let (_, notifier, ritual) = harness();
        assert!(ritual.initialize(thursday_noon()).await);
        assert_eq!(ritual.state(), RitualState::Scheduled);

        let wonders = wonder_requests(&notifier);
        assert_eq!(wonders.len(), 1);
        let expected = NaiveDate::from_ymd_opt(2026, 8, 7)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert_eq!(wonders[0].trigger, Trigger::At(expected));
        assert_eq!(wonders[0].data["questionId"], 1);
        assert!(!wonders[0].sound);
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let (_, notifier, ritual) = harness();
        assert!(ritual.initialize(thursday_noon()).await);
        let armed = notifier.scheduled().len();
        assert!(ritual.initialize(thursday_noon()).await);
        assert_eq!(notifier.scheduled().len(), armed);
    }

    #[tokio::test]
    async fn denied_permission_halts_initialization() {
        let (store, notifier, ritual) = harness();
        notifier.deny();
        assert!(!ritual.initialize(thursday_noon()).await);
        assert_eq!(ritual.state(), RitualState::Uninitialized);
        assert!(notifier.scheduled().is_empty());
        assert!(store.push_token().await.is_none());
    }

    #[tokio::test]
    async fn day_thirty_wraps_to_question_one() {
        let (store, notifier, ritual) = harness();
        store.set_current_day(30).await;
        ritual.schedule_tomorrows_wonder(thursday_noon()).await;
        let wonders = wonder_requests(&notifier);
        assert_eq!(wonders[0].data["questionId"], 1);
    }

    #[tokio::test]
    async fn mid_cycle_schedules_the_next_question() {
        let (store, notifier, ritual) = harness();
        store.set_current_day(11).await;
        ritual.schedule_tomorrows_wonder(thursday_noon()).await;
        let wonders = wonder_requests(&notifier);
        assert_eq!(wonders[0].data["questionId"], 12);
    }

    #[tokio::test]
    async fn saturday_adds_the_weekly_reflection() {
        let (_, notifier, ritual) = harness();
        ritual.schedule_tomorrows_wonder(saturday_noon()).await;

        let all = notifier.scheduled();
        assert_eq!(all.len(), 2);
        let reflection = all
            .iter()
            .find(|r| r.data.get("type") == Some(&serde_json::json!("weekly_reflection")))
            .expect("weekly reflection armed");
        let sunday_evening = NaiveDate::from_ymd_opt(2026, 8, 9)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        assert_eq!(reflection.trigger, Trigger::At(sunday_evening));
    }

    #[tokio::test]
    async fn weekday_schedules_no_reflection() {
        let (_, notifier, ritual) = harness();
        ritual.schedule_tomorrows_wonder(thursday_noon()).await;
        assert_eq!(notifier.scheduled().len(), 1);
    }

    #[tokio::test]
    async fn set_preferred_time_cancels_then_rearms() {
        let (store, notifier, ritual) = harness();
        ritual.schedule_tomorrows_wonder(thursday_noon()).await;
        assert!(ritual.set_preferred_time(thursday_noon(), 8, 30).await);

        assert_eq!(notifier.cancel_count(), 1);
        assert_eq!(
            store.morning_ritual_time().await,
            RitualTime { hour: 8, minute: 30 }
        );
        let wonders = wonder_requests(&notifier);
        assert_eq!(wonders.len(), 1);
        let expected = NaiveDate::from_ymd_opt(2026, 8, 7)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(wonders[0].trigger, Trigger::At(expected));
        assert_eq!(ritual.state(), RitualState::Scheduled);
    }

    #[tokio::test]
    async fn out_of_range_time_is_rejected() {
        let (_, _, ritual) = harness();
        assert!(!ritual.set_preferred_time(thursday_noon(), 24, 0).await);
    }

    #[tokio::test]
    async fn streak_extends_resets_and_idempotent_same_day() {
        let (store, _, ritual) = harness();
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        store.set_streak_count(4).await;
        store.set_last_open_date(today - Duration::days(1)).await;
        assert_eq!(ritual.update_streak(today).await, 5);
        // Second call the same day changes nothing.
        assert_eq!(ritual.update_streak(today).await, 5);
        assert_eq!(store.streak_count().await, 5);

        store.set_last_open_date(today - Duration::days(3)).await;
        store.set_streak_count(5).await;
        assert_eq!(ritual.update_streak(today).await, 1);
    }

    #[tokio::test]
    async fn milestone_streaks_fire_exactly_once() {
        let (store, notifier, ritual) = harness();
        for streak in [7u32, 30, 100, 365] {
            store.set_streak_count(streak).await;
            assert!(ritual.check_milestones().await, "streak {streak}");
        }
        assert_eq!(notifier.scheduled().len(), 4);

        store.set_streak_count(8).await;
        assert!(!ritual.check_milestones().await);
        assert_eq!(notifier.scheduled().len(), 4);
    }

    #[tokio::test]
    async fn reaching_a_milestone_through_update_streak_fires() {
        let (store, notifier, ritual) = harness();
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        store.set_streak_count(6).await;
        store.set_last_open_date(today - Duration::days(1)).await;

        assert_eq!(ritual.update_streak(today).await, 7);
        let milestones: Vec<_> = notifier
            .scheduled()
            .into_iter()
            .filter(|r| r.data.get("type") == Some(&serde_json::json!("milestone")))
            .collect();
        assert_eq!(milestones.len(), 1);
        assert_eq!(milestones[0].trigger, Trigger::After(2));
    }

    #[tokio::test]
    async fn a_week_of_engagement_retunes_the_hour() {
        let (store, notifier, ritual) = harness();
        let base = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        for day in 0..7 {
            let at = (base + Duration::days(day)).and_hms_opt(9, 15, 0).unwrap();
            ritual.record_engagement(at).await;
        }

        // Mode hour 9 recommends 8; |6 - 8| > 1 so the ritual retunes.
        assert_eq!(
            store.morning_ritual_time().await,
            RitualTime { hour: 8, minute: 0 }
        );
        assert!(notifier
            .scheduled()
            .iter()
            .any(|r| r.title == "Wonder knows you better now"));
        assert_eq!(store.engagement_history().await.len(), 7);
    }

    #[tokio::test]
    async fn small_drift_keeps_the_current_hour() {
        let (store, notifier, ritual) = harness();
        let base = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        for day in 0..7 {
            // Mode hour 7 recommends 6, which matches the default.
            let at = (base + Duration::days(day)).and_hms_opt(7, 0, 0).unwrap();
            ritual.record_engagement(at).await;
        }

        assert_eq!(store.morning_ritual_time().await, RitualTime::default());
        assert_eq!(notifier.cancel_count(), 0);
    }

    #[tokio::test]
    async fn engagement_history_keeps_the_newest_thirty() {
        let (store, _, ritual) = harness();
        let base = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        for day in 0..35 {
            // Hour 6 keeps the recommendation at the default; no retune noise.
            let at = (base + Duration::days(day)).and_hms_opt(6, 30, 0).unwrap();
            ritual.record_engagement(at).await;
        }

        let history = store.engagement_history().await;
        assert_eq!(history.len(), 30);
        let first = history.first().unwrap().timestamp;
        let last = history.last().unwrap().timestamp;
        assert!(first < last);
    }
}
