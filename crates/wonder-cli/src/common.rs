//! Shared construction for CLI commands: store, notifier and ritual wiring.

use std::error::Error;
use std::sync::Arc;

use chrono::NaiveDateTime;
use wonder_core::storage::KeyValueStore;
use wonder_core::{
    Config, DataStore, LedgerNotifier, MorningRitual, Notifier, RitualConfig, SqliteStore,
};

/// Open the durable store and wrap it in the data facade.
pub fn open_store() -> Result<Arc<DataStore>, Box<dyn Error>> {
    let backend = SqliteStore::open()?;
    Ok(Arc::new(DataStore::new(
        Arc::new(backend) as Arc<dyn KeyValueStore>
    )))
}

/// Open the notification ledger, honoring the configured enable flag.
pub fn open_notifier() -> Result<Arc<LedgerNotifier>, Box<dyn Error>> {
    let config = Config::load()?;
    Ok(Arc::new(LedgerNotifier::new(config.notifications.enabled)?))
}

/// Build the ritual scheduler over the given store.
pub fn build_ritual(store: Arc<DataStore>) -> Result<MorningRitual, Box<dyn Error>> {
    let config = Config::load()?;
    let notifier = Arc::new(LedgerNotifier::new(config.notifications.enabled)?);
    let ritual_config = RitualConfig {
        sound: config.notifications.sound,
        badge: config.notifications.badge,
        weekly_reflection: config.ritual.weekly_reflection,
    };
    Ok(MorningRitual::with_config(
        store,
        notifier as Arc<dyn Notifier>,
        ritual_config,
    ))
}

/// The local wall-clock time handed to the scheduler.
pub fn now_local() -> NaiveDateTime {
    wonder_core::ritual::local_now()
}
