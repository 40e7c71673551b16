//! Chat app CLI commands: create, list.

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use langchat_api::state::AppState;
use langchat_core::repository::app::AppRepository;
use langchat_types::app::App;

/// Create a chat app.
pub async fn create_app(
    state: &AppState,
    name: String,
    id: Option<String>,
    description: Option<String>,
    prompt: Option<String>,
    model: Option<String>,
    json: bool,
) -> Result<()> {
    if let Some(model_id) = model.as_deref() {
        if state.providers.chat(Some(model_id)).is_none() {
            println!(
                "  {} Model '{}' is not loaded; requests will fail until it is added.",
                style("!").yellow().bold(),
                model_id
            );
        }
    }

    let app = App {
        id: id.unwrap_or_else(|| Uuid::now_v7().to_string()),
        name,
        description,
        prompt,
        model_id: model,
        created_at: Utc::now(),
    };
    let app = state.apps.create(&app).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&app)?);
        return Ok(());
    }

    println!(
        "  {} App '{}' created ({})",
        style("✓").green().bold(),
        style(&app.name).bold(),
        style(&app.id).dim()
    );
    Ok(())
}

/// List chat apps.
pub async fn list_apps(state: &AppState, json: bool) -> Result<()> {
    let apps = state.apps.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&apps)?);
        return Ok(());
    }

    if apps.is_empty() {
        println!();
        println!(
            "  {} No apps yet. Create one with: {}",
            style("i").blue().bold(),
            style("langchat app create --name Helper --prompt \"You are a helper\"").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Prompt").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for app in &apps {
        table.add_row(vec![
            Cell::new(&app.id).fg(Color::Cyan),
            Cell::new(&app.name),
            Cell::new(app.model_id.as_deref().unwrap_or("-")),
            Cell::new(if app.system_prompt().is_some() { "yes" } else { "no" }),
            Cell::new(app.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
