mod config;
pub mod database;
pub mod state;

pub use config::{AlarmConfig, Config, NotificationsConfig, SoundConfig, StatsConfig};
pub use database::{Database, KvStore};
pub use state::{PersistedAlarm, SoundPreference, StateStore};

use std::path::PathBuf;

/// Returns `~/.config/rehat[-dev]/` based on REHAT_ENV.
///
/// Set REHAT_ENV=dev to use development data directory. REHAT_DATA_DIR
/// overrides both.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    if let Some(dir) = std::env::var_os("REHAT_DATA_DIR").filter(|d| !d.is_empty()) {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REHAT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("rehat-dev")
    } else {
        base_dir.join("rehat")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
