//! Global configuration loader for LangChat.
//!
//! Reads `config.toml` from the data directory (`~/.langchat/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;
use std::time::Duration;

use langchat_core::relay::RelaySettings;
use langchat_types::config::GlobalConfig;

/// Smallest memory window accepted; a window of zero would drop every turn.
const MIN_MEMORY_MESSAGES: usize = 2;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`GlobalConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(mut config) => {
            config.memory_max_messages = config.memory_max_messages.max(MIN_MEMORY_MESSAGES);
            config
        }
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Derive relay settings from the global config.
///
/// `turn_timeout_secs = 0` disables the per-turn deadline. A zero channel
/// capacity is raised to one.
pub fn relay_settings(config: &GlobalConfig) -> RelaySettings {
    let turn_timeout = match config.turn_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    RelaySettings {
        turn_timeout,
        channel_capacity: config.stream_channel_capacity.max(1),
    }
}
