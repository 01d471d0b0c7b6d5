mod config;
mod store;

pub use config::{Config, NotificationsConfig};
pub use store::TimerStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding the config file and timer store.
///
/// `CLOCKTIMER_DATA_DIR` overrides the location entirely. Otherwise this is
/// `~/.config/clocktimer/`, or `~/.config/clocktimer-dev/` when
/// `CLOCKTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CLOCKTIMER_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CLOCKTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("clocktimer-dev")
            } else {
                base_dir.join("clocktimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
