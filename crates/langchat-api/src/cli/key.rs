//! API key CLI commands.

use anyhow::Result;
use console::style;

use langchat_api::http::extractors::auth::create_api_key;
use langchat_api::state::AppState;
use langchat_types::principal::Principal;

/// Create an API key for a user and print it once.
///
/// # Examples
///
/// ```bash
/// langchat key create --user-id 1 --username admin -P '*'
/// langchat key create --user-id 42 --username alice -P chat:completions
/// ```
pub async fn create_key(
    state: &AppState,
    user_id: String,
    username: String,
    permissions: Vec<String>,
    json: bool,
) -> Result<()> {
    if user_id.trim().is_empty() {
        anyhow::bail!("--user-id must not be blank");
    }

    let principal = Principal {
        user_id,
        username,
        permissions: permissions.into_iter().collect(),
    };
    let key = create_api_key(state.principals.as_ref(), &principal).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "key": key,
                "user_id": principal.user_id,
                "username": principal.username,
                "permissions": principal.permissions,
            }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} API key for '{}' (save this -- it won't be shown again):",
        style("🔑").bold(),
        style(&principal.username).cyan()
    );
    println!();
    println!("  {}", style(&key).yellow().bold());
    println!();
    if principal.permissions.is_empty() {
        println!(
            "  {} No permissions granted; chat completions will be rejected.",
            style("!").yellow().bold()
        );
    } else {
        let granted: Vec<&str> = principal.permissions.iter().map(String::as_str).collect();
        println!("  Permissions: {}", style(granted.join(", ")).dim());
    }
    println!();

    Ok(())
}
