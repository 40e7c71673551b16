//! LangChat CLI and HTTP API entry point.
//!
//! Binary name: `langchat`
//!
//! Parses CLI arguments, initializes tracing, database and services, then
//! dispatches to the command handler or starts the HTTP server.

mod cli;

use clap::Parser;
use clap_complete::generate;

use cli::{AppCommand, Cli, Commands, KeyCommand, ModelCommand};
use langchat_api::{AppState, build_router};
use langchat_observe::{DEFAULT_FILTER, LogFormat, init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "langchat", &mut std::io::stdout());
        return Ok(());
    }

    // Verbosity picks the default filter; RUST_LOG still wins.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if matches!(cli.command, Commands::Serve { .. }) => DEFAULT_FILTER,
        0 => "warn",
        1 => "info,langchat_core=debug,langchat_infra=debug,langchat_api=debug",
        _ => "trace",
    };
    let log_format: LogFormat = cli.log_format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    init_tracing(log_format, filter, cli.otel).map_err(|e| anyhow::anyhow!("{e}"))?;

    let state = AppState::init().await?;

    let result = run(cli.command, state, cli.json).await;
    shutdown_tracing();
    result
}

async fn run(command: Commands, state: AppState, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Serve { port, host } => serve(state, host, port).await?,

        Commands::Key { action } => match action {
            KeyCommand::Create {
                user_id,
                username,
                permissions,
            } => cli::key::create_key(&state, user_id, username, permissions, json).await?,
        },

        Commands::App { action } => match action {
            AppCommand::Create {
                name,
                id,
                description,
                prompt,
                model,
            } => cli::app::create_app(&state, name, id, description, prompt, model, json).await?,
            AppCommand::List => cli::app::list_apps(&state, json).await?,
        },

        Commands::Model { action } => match action {
            ModelCommand::Add {
                id,
                name,
                kind,
                provider,
                model,
                base_url,
                api_key,
                secret_key,
                temperature,
                max_tokens,
                image_size,
            } => {
                let opts = cli::model::AddModel {
                    id,
                    name,
                    kind,
                    provider,
                    model,
                    base_url,
                    api_key,
                    secret_key,
                    temperature,
                    max_tokens,
                    image_size,
                };
                cli::model::add_model(&state, opts, json).await?;
            }
            ModelCommand::List => cli::model::list_models(&state, json).await?,
        },

        Commands::Status => cli::status::status(&state, json).await?,

        Commands::Completions { .. } => {}
    }

    Ok(())
}

async fn serve(state: AppState, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    use langchat_core::repository::principal::PrincipalRepository;

    if state.principals.count_keys().await? == 0 {
        println!();
        println!(
            "  {} No API keys exist. Create one with: {}",
            console::style("!").yellow().bold(),
            console::style("langchat key create --user-id 1 --username admin -P '*'").yellow()
        );
    }
    if state.providers.chat_ids().is_empty() {
        tracing::warn!("no chat models loaded; chat completions will be rejected");
    }

    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!();
    println!(
        "  {} LangChat API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
