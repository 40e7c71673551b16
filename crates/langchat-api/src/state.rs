//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and the
//! HTTP API. Core services are generic over repository traits; AppState pins
//! them to the SQLite implementations from langchat-infra.

use std::path::PathBuf;
use std::sync::Arc;

use langchat_core::chat::service::ChatService;
use langchat_core::llm::registry::ProviderRegistry;
use langchat_core::memory::MemoryCache;
use langchat_core::relay::ChatRelay;
use langchat_core::repository::model::ModelRepository;
use langchat_infra::config::{load_global_config, relay_settings};
use langchat_infra::filesystem::{database_url, ensure_data_dir, resolve_data_dir};
use langchat_infra::llm::build_registry;
use langchat_infra::sqlite::app::SqliteAppRepository;
use langchat_infra::sqlite::message::SqliteConversationStore;
use langchat_infra::sqlite::model::SqliteModelRepository;
use langchat_infra::sqlite::pool::DatabasePool;
use langchat_infra::sqlite::principal::SqlitePrincipalRepository;
use langchat_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService =
    ChatService<SqliteConversationStore, SqliteAppRepository, SqliteModelRepository>;

pub type ConcreteChatRelay = ChatRelay<SqliteConversationStore, SqliteAppRepository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub relay: ConcreteChatRelay,
    pub store: Arc<SqliteConversationStore>,
    pub apps: Arc<SqliteAppRepository>,
    pub models: Arc<SqliteModelRepository>,
    pub principals: Arc<SqlitePrincipalRepository>,
    pub memory: Arc<MemoryCache>,
    pub providers: Arc<ProviderRegistry>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: resolve the data dir, load config,
    /// connect to the database and build the provider registry from the
    /// stored models.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let models = SqliteModelRepository::new(db_pool.clone()).list(None).await?;
        let registry = build_registry(&models, config.default_model.as_deref());
        tracing::info!(
            chat_models = registry.chat_ids().len(),
            data_dir = %data_dir.display(),
            "provider registry built"
        );

        Ok(Self::from_parts(db_pool, config, registry, data_dir))
    }

    /// Wire services from already-initialized parts.
    pub fn from_parts(
        db_pool: DatabasePool,
        config: GlobalConfig,
        registry: ProviderRegistry,
        data_dir: PathBuf,
    ) -> Self {
        let store = Arc::new(SqliteConversationStore::new(db_pool.clone()));
        let apps = Arc::new(SqliteAppRepository::new(db_pool.clone()));
        let models = Arc::new(SqliteModelRepository::new(db_pool.clone()));
        let principals = Arc::new(SqlitePrincipalRepository::new(db_pool.clone()));
        let memory = Arc::new(MemoryCache::new(config.memory_max_messages));
        let providers = Arc::new(registry);

        let relay = ChatRelay::new(
            Arc::clone(&store),
            Arc::clone(&apps),
            Arc::clone(&memory),
            Arc::clone(&providers),
            relay_settings(&config),
        );

        let chat_service = ChatService::new(
            Arc::clone(&store),
            Arc::clone(&apps),
            Arc::clone(&models),
            Arc::clone(&memory),
            Arc::clone(&providers),
        );

        Self {
            chat_service: Arc::new(chat_service),
            relay,
            store,
            apps,
            models,
            principals,
            memory,
            providers,
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }
}
