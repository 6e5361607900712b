//! # Wonder Core Library
//!
//! This library provides the core state and scheduling logic for Wonder,
//! a daily-philosophy companion. All operations are available through the
//! standalone CLI binary; any richer front end is a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Storage**: an async key-value seam with SQLite and in-memory
//!   backends, fronted by a caching, fail-soft data facade
//! - **Engagement**: streak bookkeeping and notification-hour learning over
//!   a bounded history
//! - **Ritual**: the daily notification scheduler, injected with its store
//!   and notification gateway
//! - **Content**: the bundled 30-day question cycle and themed journeys
//!
//! ## Key Components
//!
//! - [`DataStore`]: cached, typed facade over the key-value store
//! - [`MorningRitual`]: owns the outstanding daily notification
//! - [`Notifier`]: the local-notification seam (ledger-backed or mocked)
//! - [`Config`]: application configuration management

pub mod content;
pub mod daily;
pub mod engagement;
pub mod error;
pub mod model;
pub mod notify;
pub mod ritual;
pub mod storage;
pub mod store;

pub use error::{ConfigError, CoreError, NotifyError, StorageError, ValidationError};
pub use model::{EngagementRecord, JourneyProgress, RitualTime, Thought};
pub use notify::{LedgerNotifier, MockNotifier, NotificationRequest, Notifier, Trigger};
pub use ritual::{MorningRitual, RitualConfig, RitualState};
pub use storage::{data_dir, Config, KeyValueStore, MemoryStore, SqliteStore};
pub use store::{DataStore, Subscription};
