mod config;
pub mod kv;

pub use config::{Config, NotificationsConfig, RitualSection};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};

use std::path::PathBuf;

/// Returns `~/.config/wonder[-dev]/` based on WONDER_ENV.
///
/// Set WONDER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WONDER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wonder-dev")
    } else {
        base_dir.join("wonder")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
