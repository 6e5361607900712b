//! Bundled question and journey content.
//!
//! Read-only datasets shipped with the app: the 30-day daily question cycle
//! and the themed journeys. Parsed once from bundled JSON; never mutated at
//! runtime.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Unlocking the next journey depth requires this many seconds of
/// engagement with the current one.
pub const UNLOCK_SECONDS: u32 = 30;

/// One entry of the 30-day daily cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuestion {
    pub id: u32,
    pub date: String,
    pub question: String,
    pub story: String,
    pub thinker: String,
    pub follow_up: String,
}

/// A themed sequence of depth levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub id: String,
    pub title: String,
    pub theme: String,
    pub color: String,
    pub icon: String,
    pub levels: Vec<JourneyLevel>,
}

/// One depth level within a journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyLevel {
    pub title: String,
    pub questions: Vec<LevelQuestion>,
}

/// A question inside a depth level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelQuestion {
    pub main: String,
    pub context: String,
    pub follow_up: String,
}

static QUESTIONS: Lazy<Vec<DailyQuestion>> = Lazy::new(|| {
    serde_json::from_str(include_str!("content/questions.json"))
        .expect("bundled questions.json is valid")
});

static JOURNEYS: Lazy<Vec<Journey>> = Lazy::new(|| {
    serde_json::from_str(include_str!("content/journeys.json"))
        .expect("bundled journeys.json is valid")
});

/// The full 30-day question cycle, ordered by day.
pub fn questions() -> &'static [DailyQuestion] {
    &QUESTIONS
}

/// Look up the question for a day of the cycle (1..=30).
pub fn question_for_day(day: u32) -> Option<&'static DailyQuestion> {
    QUESTIONS.iter().find(|q| q.id == day)
}

/// Every bundled journey.
pub fn journeys() -> &'static [Journey] {
    &JOURNEYS
}

/// Look up a journey by identifier.
pub fn journey(id: &str) -> Option<&'static Journey> {
    JOURNEYS.iter().find(|j| j.id == id)
}

/// Whether the next depth level may be unlocked: enough pondering time, the
/// user is at their deepest unlocked level, and there is a deeper one.
pub fn can_unlock(
    engaged_secs: u32,
    current_depth: u32,
    unlocked_levels: u32,
    total_levels: u32,
) -> bool {
    engaged_secs >= UNLOCK_SECONDS
        && unlocked_levels == current_depth
        && current_depth < total_levels
}
