//! Data directory layout for LangChat.
//!
//! Everything the service persists lives under one data directory:
//! `config.toml` and the `langchat.db` SQLite database.

use std::path::{Path, PathBuf};

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE: &str = "langchat.db";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `LANGCHAT_DATA_DIR` environment variable
/// 2. `~/.langchat`
/// 3. `./.langchat` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LANGCHAT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".langchat");
    }

    PathBuf::from(".langchat")
}

/// SQLite URL for the database inside `data_dir`, created if missing.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join(DATABASE_FILE).display())
}

/// Create the data directory if it does not exist yet.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(data_dir).await
}
