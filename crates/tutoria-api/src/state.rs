//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the REST API.
//! Services are generic over repository and provider traits, but AppState
//! pins them to the concrete infra implementations.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use tutoria_core::chat::service::ChatService;
use tutoria_core::llm::generator::{GeneratorSettings, ResponseGenerator};
use tutoria_core::llm::provider::LlmProvider;
use tutoria_infra::config::resolve_api_key;
use tutoria_infra::llm::gemini::GeminiProvider;
use tutoria_infra::sqlite::chat::SqliteChatRepository;
use tutoria_infra::sqlite::pool::DatabasePool;
use tutoria_infra::sqlite::profile::SqliteProfileRepository;
use tutoria_infra::sqlite::stats::SqliteStatsRepository;
use tutoria_types::config::AppConfig;

/// Concrete type alias for the chat service pinned to infra implementations.
pub type ConcreteChatService =
    ChatService<SqliteChatRepository, SqliteProfileRepository, GeminiProvider>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub stats_repo: Arc<SqliteStatsRepository>,
    pub db_pool: DatabasePool,
    /// Root token cancelled on shutdown. Requests derive child tokens from it.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Initialize the application state: resolve the API key, connect to
    /// the database, wire services.
    ///
    /// Fails before opening the database if the API key is missing.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let generator = build_generator(config)?;

        let db_pool = DatabasePool::new(&config.database.url)
            .await
            .with_context(|| format!("Failed to open database '{}'", config.database.url))?;

        Ok(Self::from_parts(db_pool, generator))
    }

    /// Wire services over an open pool and a ready generator.
    pub fn from_parts(db_pool: DatabasePool, generator: ResponseGenerator<GeminiProvider>) -> Self {
        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteProfileRepository::new(db_pool.clone()),
            generator,
        );

        Self {
            chat_service: Arc::new(chat_service),
            stats_repo: Arc::new(SqliteStatsRepository::new(db_pool.clone())),
            db_pool,
            shutdown: CancellationToken::new(),
        }
    }
}

/// Build the Gemini-backed response generator from configuration.
pub fn build_generator(config: &AppConfig) -> anyhow::Result<ResponseGenerator<GeminiProvider>> {
    let settings = GeneratorSettings::from_config(&config.generator)?;
    let api_key = resolve_api_key(&config.provider)?;
    let provider = GeminiProvider::from_config(&config.provider, api_key)
        .context("Failed to create provider client")?;

    tracing::info!(
        provider = provider.name(),
        models = ?settings.models,
        deadline_secs = settings.deadline.as_secs(),
        "Response generator ready"
    );

    Ok(ResponseGenerator::new(provider, settings))
}
