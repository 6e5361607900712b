//! Persisted value shapes.
//!
//! Every type here is serialized to JSON under a fixed key (or key prefix)
//! in the data store. Field names use the camelCase forms the app has always
//! written, so the on-disk shape is stable for a given key.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Progress through one journey: how deep the user currently is and how many
/// depth levels they have unlocked.
///
/// `current_depth` never exceeds `unlocked_levels`; the store clamps on
/// write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyProgress {
    pub current_depth: u32,
    pub unlocked_levels: u32,
    pub last_accessed: DateTime<Utc>,
}

impl JourneyProgress {
    pub fn new(current_depth: u32, unlocked_levels: u32, last_accessed: DateTime<Utc>) -> Self {
        let unlocked_levels = unlocked_levels.max(1);
        Self {
            current_depth: current_depth.clamp(1, unlocked_levels),
            unlocked_levels,
            last_accessed,
        }
    }
}

/// Maximum thought length, in characters.
pub const MAX_THOUGHT_CHARS: usize = 500;

/// One captured thought, attached to a question and duplicated into the
/// global journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    /// Millisecond timestamp at creation; unique and monotonic per device.
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub question_id: String,
    pub question_text: String,
}

impl Thought {
    /// Create a thought from user text, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns an error when the trimmed text is empty or longer than
    /// [`MAX_THOUGHT_CHARS`] characters.
    pub fn new(
        question_id: &str,
        question_text: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let text = text.trim();
        let len = text.chars().count();
        if len == 0 || len > MAX_THOUGHT_CHARS {
            return Err(ValidationError::TextLength {
                len,
                min: 1,
                max: MAX_THOUGHT_CHARS,
            });
        }
        Ok(Self {
            id: at.timestamp_millis().to_string(),
            text: text.to_string(),
            timestamp: at,
            question_id: question_id.to_string(),
            question_text: question_text.to_string(),
        })
    }
}

/// One timestamped marker of user activity, used to learn notification
/// timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRecord {
    pub hour: u32,
    pub minute: u32,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u32,
    pub timestamp: DateTime<Utc>,
}

impl EngagementRecord {
    /// Capture an engagement at the given local wall-clock time.
    pub fn at(now: NaiveDateTime, timestamp: DateTime<Utc>) -> Self {
        Self {
            hour: now.hour(),
            minute: now.minute(),
            day_of_week: now.date().weekday().num_days_from_sunday(),
            timestamp,
        }
    }
}

/// The preferred wall-clock time for the daily notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualTime {
    pub hour: u32,
    pub minute: u32,
}

impl Default for RitualTime {
    fn default() -> Self {
        Self { hour: 6, minute: 0 }
    }
}

impl RitualTime {
    /// # Errors
    /// Returns an error when hour or minute is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn thought_rejects_empty_and_overlong_text() {
        let now = Utc::now();
        assert!(Thought::new("1", "q", "   ", now).is_err());
        let long = "x".repeat(MAX_THOUGHT_CHARS + 1);
        assert!(Thought::new("1", "q", &long, now).is_err());
        let max = "x".repeat(MAX_THOUGHT_CHARS);
        assert!(Thought::new("1", "q", &max, now).is_ok());
    }

    #[test]
    fn thought_trims_and_stamps_id_from_creation_time() {
        let now = Utc::now();
        let thought = Thought::new("3", "What is time?", "  a fleeting idea  ", now).unwrap();
        assert_eq!(thought.text, "a fleeting idea");
        assert_eq!(thought.id, now.timestamp_millis().to_string());
    }

    #[test]
    fn journey_progress_clamps_depth_to_unlocked() {
        let now = Utc::now();
        let progress = JourneyProgress::new(5, 2, now);
        assert_eq!(progress.current_depth, 2);
        assert_eq!(progress.unlocked_levels, 2);

        let floor = JourneyProgress::new(0, 0, now);
        assert_eq!(floor.current_depth, 1);
        assert_eq!(floor.unlocked_levels, 1);
    }

    #[test]
    fn journey_progress_serializes_camel_case() {
        let now = Utc::now();
        let json = serde_json::to_value(JourneyProgress::new(2, 3, now)).unwrap();
        assert!(json.get("currentDepth").is_some());
        assert!(json.get("unlockedLevels").is_some());
        assert!(json.get("lastAccessed").is_some());
    }

    #[test]
    fn engagement_record_uses_sunday_zero_weekdays() {
        // 2026-08-02 is a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let rec = EngagementRecord::at(sunday, Utc::now());
        assert_eq!(rec.day_of_week, 0);
        assert_eq!(rec.hour, 9);
        assert_eq!(rec.minute, 30);
    }

    #[test]
    fn ritual_time_validates_range() {
        assert!(RitualTime::new(24, 0).is_err());
        assert!(RitualTime::new(6, 60).is_err());
        assert_eq!(RitualTime::new(6, 0).unwrap(), RitualTime::default());
    }
}
