//! Cached, typed, fail-soft facade over a [`KeyValueStore`].
//!
//! Single source of truth for every persisted value. Reads go through an
//! in-memory cache mirroring the durable store; writes go through to the
//! store first and update the cache only on success. Subscribers registered
//! per key are invoked with the new value after each successful write.
//!
//! Every operation is fail-soft: storage failures are logged and converted
//! into default-value returns or `false`, never propagated. A caller cannot
//! distinguish "read failed" from "key absent" -- tests that need to can
//! inject a failing [`MemoryStore`](crate::storage::MemoryStore).
//!
//! Known race: the cache protects map integrity, not read-modify-write
//! atomicity. Two interleaved append-to-list operations on the same key can
//! lose an update. Single-process, same-instance usage is the only
//! supported mode; an external writer bypassing this facade desynchronizes
//! the cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{EngagementRecord, JourneyProgress, RitualTime, Thought};
use crate::storage::KeyValueStore;

/// Keys for the persisted value space.
pub mod keys {
    pub const ONBOARDING_COMPLETED: &str = "onboardingCompleted";
    pub const JOURNEY_PROGRESS: &str = "journeyProgress";
    pub const CURRENT_DAY: &str = "currentDay";
    pub const LAST_OPEN_DATE: &str = "lastOpenDate";
    pub const STREAK_COUNT: &str = "streakCount";
    pub const THOUGHTS_PREFIX: &str = "thoughts_";
    pub const ALL_THOUGHTS: &str = "allThoughts";
    pub const ENGAGEMENT_HISTORY: &str = "engagementHistory";
    pub const LATEST_MILESTONE: &str = "latestMilestone";
    pub const MORNING_RITUAL_TIME: &str = "morningRitualTime";
    pub const PUSH_TOKEN: &str = "pushToken";
}

/// Milestone messages keyed by global thought count.
const THOUGHT_MILESTONES: [(usize, &str); 4] = [
    (1, "Your first thought captured!"),
    (10, "Ten moments of clarity"),
    (50, "Fifty philosophical insights"),
    (100, "A century of wonder"),
];

type Listener = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Handle returned by [`DataStore::subscribe`]; pass it back to
/// [`DataStore::unsubscribe`] to remove exactly that listener.
#[derive(Debug)]
pub struct Subscription {
    key: String,
    id: u64,
}

/// Cached, typed facade over the platform key-value store.
pub struct DataStore {
    backend: Arc<dyn KeyValueStore>,
    cache: Mutex<HashMap<String, Value>>,
    listeners: Mutex<HashMap<String, Vec<(u64, Listener)>>>,
    next_listener: AtomicU64,
}

impl DataStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            cache: Mutex::new(HashMap::new()),
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    fn cache_lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn listeners_lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, Vec<(u64, Listener)>>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stored strings decode as JSON when they can; anything else is a plain
    /// string value, not an error.
    fn decode(raw: String) -> Value {
        serde_json::from_str(&raw).unwrap_or(Value::String(raw))
    }

    /// Strings are written raw; every other value is JSON-encoded. One shape
    /// per key, stable across reads.
    fn encode(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn notify(&self, key: &str, value: Option<&Value>) {
        let callbacks: Vec<Listener> = self
            .listeners_lock()
            .get(key)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(value);
        }
    }

    /// Read the raw value under `key`: cache first, then the store.
    ///
    /// Returns `None` when the key is absent or the read fails (the failure
    /// is logged, not surfaced).
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        if let Some(hit) = self.cache_lock().get(key).cloned() {
            return Some(hit);
        }
        match self.backend.get_item(key).await {
            Ok(Some(raw)) => {
                let value = Self::decode(raw);
                self.cache_lock().insert(key.to_string(), value.clone());
                Some(value)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(key, error = %err, "read failed; treating key as absent");
                None
            }
        }
    }

    /// Read and deserialize the value under `key`, or return `default` when
    /// the key is absent, the read fails, or the stored shape doesn't fit.
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get_value(key).await {
            Some(value) => match serde_json::from_value(value) {
                Ok(typed) => typed,
                Err(err) => {
                    debug!(key, error = %err, "stored value has unexpected shape");
                    default
                }
            },
            None => default,
        }
    }

    /// Write `value` under `key`. The cache is updated and subscribers are
    /// notified only after the store accepts the write.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(err) => {
                warn!(key, error = %err, "value not serializable");
                return false;
            }
        };
        let raw = Self::encode(&value);
        match self.backend.set_item(key, &raw).await {
            Ok(()) => {
                self.cache_lock().insert(key.to_string(), value.clone());
                self.notify(key, Some(&value));
                true
            }
            Err(err) => {
                warn!(key, error = %err, "write failed");
                false
            }
        }
    }

    /// Remove the value under `key`; subscribers receive `None`.
    pub async fn remove(&self, key: &str) -> bool {
        match self.backend.remove_item(key).await {
            Ok(()) => {
                self.cache_lock().remove(key);
                self.notify(key, None);
                true
            }
            Err(err) => {
                warn!(key, error = %err, "remove failed");
                false
            }
        }
    }

    /// Remove every stored value and drop the cache.
    pub async fn clear(&self) -> bool {
        match self.backend.clear().await {
            Ok(()) => {
                self.cache_lock().clear();
                true
            }
            Err(err) => {
                warn!(error = %err, "clear failed");
                false
            }
        }
    }

    /// Sequential `get` per key; absent keys are left out of the result.
    pub async fn get_batch(&self, batch: &[&str]) -> HashMap<String, Value> {
        let mut results = HashMap::new();
        for key in batch {
            if let Some(value) = self.get_value(key).await {
                results.insert((*key).to_string(), value);
            }
        }
        results
    }

    /// Sequential `set` per pair; not atomic. A failure partway leaves the
    /// prior keys already applied and yields `false`.
    pub async fn set_batch(&self, pairs: &[(&str, Value)]) -> bool {
        let mut ok = true;
        for (key, value) in pairs {
            ok &= self.set(key, value).await;
        }
        ok
    }

    /// Every key currently in the durable store.
    pub async fn all_keys(&self) -> Vec<String> {
        match self.backend.all_keys().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "listing keys failed");
                Vec::new()
            }
        }
    }

    /// Snapshot of every stored key and its decoded value (debug aid).
    pub async fn dump(&self) -> HashMap<String, Value> {
        let mut data = HashMap::new();
        for key in self.all_keys().await {
            if let Some(value) = self.get_value(&key).await {
                data.insert(key, value);
            }
        }
        data
    }

    /// Register a listener for changes to `key`. Multiple listeners per key
    /// are allowed; each subscription is independent.
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners_lock()
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(callback)));
        Subscription {
            key: key.to_string(),
            id,
        }
    }

    /// Remove exactly the listener behind `subscription`.
    pub fn unsubscribe(&self, subscription: Subscription) {
        if let Some(subs) = self.listeners_lock().get_mut(&subscription.key) {
            subs.retain(|(id, _)| *id != subscription.id);
        }
    }

    // --- User & onboarding ---

    pub async fn is_first_time_user(&self) -> bool {
        !self.get_or(keys::ONBOARDING_COMPLETED, false).await
    }

    pub async fn complete_onboarding(&self) -> bool {
        self.set(keys::ONBOARDING_COMPLETED, &true).await
    }

    // --- Journey progress ---

    pub async fn journey_progress(&self) -> HashMap<String, JourneyProgress> {
        self.get_or(keys::JOURNEY_PROGRESS, HashMap::new()).await
    }

    pub async fn journey_progress_for(&self, journey_id: &str) -> Option<JourneyProgress> {
        self.journey_progress().await.remove(journey_id)
    }

    /// Record progress for one journey. Depth is clamped to the unlocked
    /// level count, so `current_depth <= unlocked_levels` always holds in
    /// the stored map.
    pub async fn update_journey_progress(
        &self,
        journey_id: &str,
        depth: u32,
        unlocked: u32,
    ) -> bool {
        let mut all = self.journey_progress().await;
        all.insert(
            journey_id.to_string(),
            JourneyProgress::new(depth, unlocked, Utc::now()),
        );
        self.set(keys::JOURNEY_PROGRESS, &all).await
    }

    // --- Daily questions ---

    pub async fn current_day(&self) -> u32 {
        self.get_or(keys::CURRENT_DAY, 1).await
    }

    /// The stored day counter, without the day-1 default.
    pub async fn stored_day(&self) -> Option<u32> {
        match self.get_value(keys::CURRENT_DAY).await {
            Some(value) => serde_json::from_value(value).ok(),
            None => None,
        }
    }

    pub async fn set_current_day(&self, day: u32) -> bool {
        self.set(keys::CURRENT_DAY, &day).await
    }

    pub async fn last_open_date(&self) -> Option<NaiveDate> {
        let value = self.get_value(keys::LAST_OPEN_DATE).await?;
        let raw = value.as_str()?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    pub async fn set_last_open_date(&self, date: NaiveDate) -> bool {
        self.set(keys::LAST_OPEN_DATE, &date.format("%Y-%m-%d").to_string())
            .await
    }

    // --- Streaks ---

    pub async fn streak_count(&self) -> u32 {
        self.get_or(keys::STREAK_COUNT, 0).await
    }

    pub async fn set_streak_count(&self, count: u32) -> bool {
        self.set(keys::STREAK_COUNT, &count).await
    }

    // --- Thoughts ---

    fn thoughts_key(question_id: &str) -> String {
        format!("{}{}", keys::THOUGHTS_PREFIX, question_id)
    }

    pub async fn thoughts_for_question(&self, question_id: &str) -> Vec<Thought> {
        self.get_or(&Self::thoughts_key(question_id), Vec::new())
            .await
    }

    pub async fn all_thoughts(&self) -> Vec<Thought> {
        self.get_or(keys::ALL_THOUGHTS, Vec::new()).await
    }

    /// Append a thought to its question's list and to the global journal,
    /// recording a milestone when the journal reaches a notable size.
    /// Returns the updated per-question list.
    pub async fn save_thought(&self, thought: Thought) -> Vec<Thought> {
        let mut thoughts = self.thoughts_for_question(&thought.question_id).await;
        thoughts.push(thought.clone());
        self.set(&Self::thoughts_key(&thought.question_id), &thoughts)
            .await;

        let mut journal = self.all_thoughts().await;
        journal.push(thought);
        self.set(keys::ALL_THOUGHTS, &journal).await;

        if let Some((_, message)) = THOUGHT_MILESTONES.iter().find(|(n, _)| *n == journal.len()) {
            self.set_milestone(message).await;
        }

        thoughts
    }

    // --- Engagement ---

    pub async fn engagement_history(&self) -> Vec<EngagementRecord> {
        self.get_or(keys::ENGAGEMENT_HISTORY, Vec::new()).await
    }

    pub async fn set_engagement_history(&self, history: &[EngagementRecord]) -> bool {
        self.set(keys::ENGAGEMENT_HISTORY, &history).await
    }

    // --- Milestones ---

    pub async fn latest_milestone(&self) -> Option<String> {
        self.get_value(keys::LATEST_MILESTONE)
            .await
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub async fn set_milestone(&self, milestone: &str) -> bool {
        self.set(keys::LATEST_MILESTONE, &milestone).await
    }

    // --- Morning ritual ---

    pub async fn morning_ritual_time(&self) -> RitualTime {
        self.get_or(keys::MORNING_RITUAL_TIME, RitualTime::default())
            .await
    }

    pub async fn set_morning_ritual_time(&self, time: RitualTime) -> bool {
        self.set(keys::MORNING_RITUAL_TIME, &time).await
    }

    // --- Push notifications ---

    pub async fn push_token(&self) -> Option<String> {
        self.get_value(keys::PUSH_TOKEN)
            .await
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub async fn set_push_token(&self, token: &str) -> bool {
        self.set(keys::PUSH_TOKEN, &token).await
    }
}
