//! System status dashboard command.

use anyhow::Result;
use console::style;

use langchat_api::state::AppState;
use langchat_core::chat::repository::ConversationStore;
use langchat_core::repository::app::AppRepository;
use langchat_core::repository::principal::PrincipalRepository;

/// Display counts of stored messages, apps, keys and loaded models.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let messages = state.store.count().await?;
    let apps = state.apps.list().await?.len();
    let keys = state.principals.count_keys().await?;
    let mut chat_models = state.providers.chat_ids();
    chat_models.sort_unstable();
    let default_model = state.providers.chat(None).map(|m| m.id.clone());

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "messages": messages,
            "apps": apps,
            "api_keys": keys,
            "chat_models": chat_models,
            "default_model": default_model,
            "memory_max_messages": state.config.memory_max_messages,
            "turn_timeout_secs": state.config.turn_timeout_secs,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} LangChat v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Messages: {}", style(messages).bold());
    println!("  Apps:     {}", style(apps).bold());
    println!("  API keys: {}", style(keys).bold());
    println!();

    println!("  {}", style("── Models ──").dim());
    if chat_models.is_empty() {
        println!("  {}", style("No chat models loaded").yellow());
    } else {
        println!("  Chat:    {}", chat_models.join(", "));
        println!(
            "  Default: {}",
            style(default_model.as_deref().unwrap_or("-")).green()
        );
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!(
        "  Memory:   {} messages, turn timeout {}",
        state.config.memory_max_messages,
        match state.config.turn_timeout_secs {
            0 => "off".to_string(),
            secs => format!("{secs}s"),
        }
    );
    println!();

    Ok(())
}
