//! Notification gateway.
//!
//! The platform notification API behind the ritual scheduler, as a trait so
//! the scheduler can be driven against a real delivery mechanism, the local
//! file-backed ledger, or a mock. Notifications are silent by default.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NotifyError;
use crate::storage::data_dir;

/// When a notification should fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trigger {
    /// At a wall-clock instant.
    At(NaiveDateTime),
    /// After a delay, in seconds.
    After(u64),
}

/// Content and timing of one local notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: serde_json::Value,
    /// Silent by design; opt in explicitly.
    #[serde(default)]
    pub sound: bool,
    #[serde(default)]
    pub badge: Option<u32>,
    pub trigger: Trigger,
}

/// Asynchronous local-notification API.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Ask the platform (or the user's configuration) for permission to
    /// deliver notifications. `Ok(false)` is denial, not an error.
    async fn request_permission(&self) -> Result<bool, NotifyError>;

    /// Arm one notification.
    async fn schedule(&self, request: NotificationRequest) -> Result<(), NotifyError>;

    /// Cancel every armed notification.
    async fn cancel_all(&self) -> Result<(), NotifyError>;
}

/// One armed notification in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub fire_at: NaiveDateTime,
    pub scheduled_at: DateTime<Utc>,
    pub request: NotificationRequest,
}

/// File-backed notifier: pending notifications persist as JSON under the
/// data directory, so a later invocation can list what is armed and what
/// has come due.
pub struct LedgerNotifier {
    ledger_file: PathBuf,
    enabled: bool,
    entries: Mutex<Vec<LedgerEntry>>,
}

impl LedgerNotifier {
    /// Open the ledger at `~/.config/wonder/notifications.json`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn new(enabled: bool) -> Result<Self, NotifyError> {
        let dir = data_dir().map_err(|e| NotifyError::LedgerUnavailable(e.to_string()))?;
        Ok(Self::with_path(dir.join("notifications.json"), enabled))
    }

    /// Open a ledger at a specific path (for tests).
    pub fn with_path(path: PathBuf, enabled: bool) -> Self {
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            ledger_file: path,
            enabled,
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LedgerEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, entries: &[LedgerEntry]) -> Result<(), NotifyError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| NotifyError::ScheduleFailed(e.to_string()))?;
        std::fs::write(&self.ledger_file, raw)
            .map_err(|e| NotifyError::LedgerUnavailable(e.to_string()))
    }

    /// Every armed notification, ordered by fire time.
    pub fn pending(&self) -> Vec<LedgerEntry> {
        self.lock().clone()
    }

    /// Remove and return the entries due at or before `now`.
    pub fn take_due(&self, now: NaiveDateTime) -> Vec<LedgerEntry> {
        let mut entries = self.lock();
        let (due, rest): (Vec<_>, Vec<_>) =
            entries.drain(..).partition(|entry| entry.fire_at <= now);
        *entries = rest;
        let snapshot = entries.clone();
        drop(entries);
        if let Err(err) = self.persist(&snapshot) {
            debug!(error = %err, "ledger persist after take_due failed");
        }
        due
    }
}

#[async_trait]
impl Notifier for LedgerNotifier {
    async fn request_permission(&self) -> Result<bool, NotifyError> {
        Ok(self.enabled)
    }

    async fn schedule(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        let fire_at = match request.trigger {
            Trigger::At(at) => at,
            Trigger::After(secs) => {
                Local::now().naive_local() + Duration::seconds(secs as i64)
            }
        };
        let entry = LedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            fire_at,
            scheduled_at: Utc::now(),
            request,
        };
        let mut entries = self.lock();
        entries.push(entry);
        entries.sort_by_key(|e| e.fire_at);
        let snapshot = entries.clone();
        drop(entries);
        self.persist(&snapshot)
    }

    async fn cancel_all(&self) -> Result<(), NotifyError> {
        self.lock().clear();
        self.persist(&[])
    }
}

/// Recording notifier for tests: permission is scriptable, every request is
/// kept, cancellations are counted.
pub struct MockNotifier {
    grant: AtomicBool,
    scheduled: Mutex<Vec<NotificationRequest>>,
    cancellations: AtomicUsize,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            grant: AtomicBool::new(true),
            scheduled: Mutex::new(Vec::new()),
            cancellations: AtomicUsize::new(0),
        }
    }

    /// Make `request_permission` answer `false`.
    pub fn deny(&self) {
        self.grant.store(false, Ordering::SeqCst);
    }

    /// Every request scheduled since construction or the last cancel.
    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn request_permission(&self) -> Result<bool, NotifyError> {
        Ok(self.grant.load(Ordering::SeqCst))
    }

    async fn schedule(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        self.scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotifyError> {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
        self.scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        Ok(())
    }
}
