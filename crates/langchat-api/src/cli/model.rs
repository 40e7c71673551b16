//! Vendor model CLI commands: add, list.

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use langchat_api::state::AppState;
use langchat_core::repository::model::ModelRepository;
use langchat_infra::llm::{create_image_provider, create_provider};
use langchat_types::llm::ProviderType;
use langchat_types::model::{ModelConfig, ModelKind};

/// Options for `langchat model add`.
pub struct AddModel {
    pub id: String,
    pub name: Option<String>,
    pub kind: String,
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub image_size: Option<String>,
}

/// Register a vendor model. Takes effect the next time the server starts.
pub async fn add_model(state: &AppState, opts: AddModel, json: bool) -> Result<()> {
    let kind: ModelKind = opts.kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let provider: ProviderType = opts.provider.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let model = ModelConfig {
        name: opts.name.unwrap_or_else(|| opts.id.clone()),
        id: opts.id,
        kind,
        provider,
        model: opts.model,
        base_url: opts.base_url,
        api_key: opts.api_key,
        secret_key: opts.secret_key,
        temperature: opts.temperature,
        max_tokens: opts.max_tokens,
        image_size: opts.image_size,
        created_at: Utc::now(),
    };

    // Fail early on configs the registry would skip at startup.
    let usable = match model.kind {
        ModelKind::Chat => create_provider(&model).map(|_| ()),
        ModelKind::Image => create_image_provider(&model).map(|_| ()),
        ModelKind::Embedding => Ok(()),
    };
    if let Err(e) = usable {
        anyhow::bail!("model '{}' cannot be used: {e}", model.id);
    }

    let model = state.models.create(&model).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&model.redacted())?);
        return Ok(());
    }

    println!(
        "  {} {} model '{}' added ({} / {})",
        style("✓").green().bold(),
        model.kind,
        style(&model.id).bold(),
        model.provider,
        model.model
    );
    println!(
        "  {}",
        style("Restart `langchat serve` to load it.").dim()
    );
    Ok(())
}

/// List registered models without credentials.
pub async fn list_models(state: &AppState, json: bool) -> Result<()> {
    let models: Vec<ModelConfig> = state
        .models
        .list(None)
        .await?
        .into_iter()
        .map(ModelConfig::redacted)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!();
        println!(
            "  {} No models yet. Add one with: {}",
            style("i").blue().bold(),
            style("langchat model add --id gpt --provider openai --model gpt-4o-mini --api-key sk-...").yellow()
        );
        println!();
        return Ok(());
    }

    let default_id = state.providers.chat(None).map(|m| m.id.clone());

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Base URL").fg(Color::White),
    ]);

    for model in &models {
        let id = if default_id.as_deref() == Some(model.id.as_str()) {
            format!("{} (default)", model.id)
        } else {
            model.id.clone()
        };
        table.add_row(vec![
            Cell::new(id).fg(Color::Cyan),
            Cell::new(model.kind.to_string()),
            Cell::new(model.provider.to_string()),
            Cell::new(&model.model),
            Cell::new(model.base_url.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
