//! Global configuration types for LangChat.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! memory window size, per-turn deadlines, streaming, and server binding.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the LangChat service.
///
/// Loaded from `~/.langchat/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Maximum number of messages kept in a conversation's memory window.
    #[serde(default = "default_memory_max_messages")]
    pub memory_max_messages: usize,

    /// Deadline for one generation turn, in seconds. `0` disables the deadline.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,

    /// Buffered events between the relay worker and the SSE writer.
    #[serde(default = "default_stream_channel_capacity")]
    pub stream_channel_capacity: usize,

    /// Interval between SSE keep-alive comments.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Model id used when neither the request nor the app names one.
    #[serde(default)]
    pub default_model: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_memory_max_messages() -> usize {
    20
}

fn default_turn_timeout_secs() -> u64 {
    120
}

fn default_stream_channel_capacity() -> usize {
    64
}

fn default_keep_alive_secs() -> u64 {
    15
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            memory_max_messages: default_memory_max_messages(),
            turn_timeout_secs: default_turn_timeout_secs(),
            stream_channel_capacity: default_stream_channel_capacity(),
            keep_alive_secs: default_keep_alive_secs(),
            default_model: None,
            server: ServerConfig::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.memory_max_messages, 20);
        assert_eq!(config.turn_timeout_secs, 120);
        assert_eq!(config.server.port, 8100);
        assert!(config.default_model.is_none());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.memory_max_messages, 20);
        assert_eq!(config.stream_channel_capacity, 64);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
memory_max_messages = 6
turn_timeout_secs = 0
default_model = "gpt-4o"

[server]
port = 9000
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory_max_messages, 6);
        assert_eq!(config.turn_timeout_secs, 0);
        assert_eq!(config.default_model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
