//! CLI command definitions for the `langchat` binary.
//!
//! Uses clap derive macros. Commands follow a noun-verb pattern
//! (e.g., `langchat key create`, `langchat model add`).

pub mod app;
pub mod key;
pub mod model;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Streaming chat service over OpenAI-compatible model vendors.
#[derive(Parser)]
#[command(name = "langchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log format: pretty or json.
    #[arg(long, global = true, default_value = "pretty", env = "LANGCHAT_LOG_FORMAT")]
    pub log_format: String,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "LANGCHAT_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Port to listen on (defaults to `server.port` from config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` from config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage API keys.
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },

    /// Manage chat apps.
    App {
        #[command(subcommand)]
        action: AppCommand,
    },

    /// Manage vendor models.
    Model {
        #[command(subcommand)]
        action: ModelCommand,
    },

    /// System status dashboard.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Create an API key bound to a user (shown once).
    Create {
        /// User id recorded on messages sent with this key.
        #[arg(long)]
        user_id: String,

        /// Display name of the user.
        #[arg(long)]
        username: String,

        /// Permission grant (repeatable), e.g. chat:completions. `*` grants all.
        #[arg(long = "permission", short = 'P')]
        permissions: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum AppCommand {
    /// Create a chat app.
    Create {
        /// App name.
        #[arg(long)]
        name: String,

        /// Explicit app id (defaults to a generated UUID).
        #[arg(long)]
        id: Option<String>,

        /// Short description.
        #[arg(long)]
        description: Option<String>,

        /// System prompt used to seed conversations.
        #[arg(long)]
        prompt: Option<String>,

        /// Model id used for this app's conversations.
        #[arg(long)]
        model: Option<String>,
    },

    /// List chat apps.
    List,
}

#[derive(Subcommand)]
pub enum ModelCommand {
    /// Register a vendor model.
    Add {
        /// Model id used by requests and apps.
        #[arg(long)]
        id: String,

        /// Display name (defaults to the id).
        #[arg(long)]
        name: Option<String>,

        /// Model kind: chat, image or embedding.
        #[arg(long, default_value = "chat")]
        kind: String,

        /// Vendor: openai, deepseek, zhipu, qwen, ollama, gemini.
        #[arg(long)]
        provider: String,

        /// Vendor model name, e.g. gpt-4o-mini.
        #[arg(long)]
        model: String,

        /// Override the vendor's default base URL.
        #[arg(long)]
        base_url: Option<String>,

        /// Vendor API key.
        #[arg(long, env = "LANGCHAT_MODEL_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Vendor secret key, for vendors that issue one.
        #[arg(long, hide_env_values = true)]
        secret_key: Option<String>,

        #[arg(long)]
        temperature: Option<f64>,

        #[arg(long)]
        max_tokens: Option<u32>,

        /// Image size for image models, e.g. 1024x1024.
        #[arg(long)]
        image_size: Option<String>,
    },

    /// List vendor models (credentials hidden).
    List,
}
