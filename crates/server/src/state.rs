//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds all shared resources, such
//! as the configuration, the condition knowledge base and the analysis client,
//! making them accessible to all request handlers.

use crate::config::{AppConfig, ANALYSIS_TASK, IMAGE_LABELING_TASK};
use petcare::{
    knowledge::{StaticKnowledgeBase, DEFAULT_CONDITIONS},
    prompts::tasks::{ANALYSIS_SYSTEM_PROMPT, IMAGE_LABELING_PROMPT},
    providers::{
        ai::{AiProvider, ImageLabeler},
        db::{sqlite::SqliteProvider, storage::KnowledgeStore},
        factory::{create_provider, ConfiguredProvider},
    },
    AnalysisClient, AnalysisClientBuilder,
};
use std::sync::Arc;
use tracing::info;

/// The provider used by a task that does not name one.
const DEFAULT_PROVIDER: &str = "gemini_default";

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// Runs the analysis pipeline for `/analyze`.
    pub analysis_client: Arc<AnalysisClient>,
    /// The read-only snapshot of the condition table taken at startup.
    pub knowledge_base: StaticKnowledgeBase,
    /// The database the snapshot was taken from.
    pub sqlite_provider: Arc<SqliteProvider>,
}

fn resolve_provider(config: &AppConfig, task_name: &str) -> anyhow::Result<ConfiguredProvider> {
    let provider_name = config
        .tasks
        .get(task_name)
        .and_then(|t| t.provider.clone())
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
    let provider_config = config.providers.get(&provider_name).ok_or_else(|| {
        anyhow::anyhow!(
            "Provider '{provider_name}' for task '{task_name}' not found in providers map."
        )
    })?;
    Ok(create_provider(&provider_name, provider_config)?)
}

fn task_prompt(config: &AppConfig, task_name: &str, fallback: &str) -> String {
    config
        .tasks
        .get(task_name)
        .and_then(|t| t.system_prompt.clone())
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Builds the shared application state from the configuration.
///
/// This function initializes all necessary services:
/// - It instantiates the AI providers named by the `analysis` and
///   `image_labeling` tasks.
/// - It opens the SQLite database at `db_url`.
///
/// The rest is delegated to [`assemble_state`].
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let generator = resolve_provider(&config, ANALYSIS_TASK)?.generator();
    let labeler = resolve_provider(&config, IMAGE_LABELING_TASK)?.labeler();

    info!("Opening knowledge database at '{}'", config.db_url);
    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;

    assemble_state(config, sqlite_provider, generator, labeler).await
}

/// Finishes building the state from already constructed collaborators.
///
/// Creates the schema and seeds the default conditions when the table is
/// empty, takes the in-memory snapshot used by every request, and makes sure
/// the uploads directory exists.
pub async fn assemble_state(
    config: AppConfig,
    sqlite_provider: SqliteProvider,
    generator: Box<dyn AiProvider>,
    labeler: Box<dyn ImageLabeler>,
) -> anyhow::Result<AppState> {
    sqlite_provider.initialize_schema().await?;
    let outcome = sqlite_provider.ensure_seeded(DEFAULT_CONDITIONS).await?;
    info!("Knowledge base ready: {outcome:?}");

    let knowledge_base = StaticKnowledgeBase::snapshot_of(&sqlite_provider).await?;

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .map_err(|e| {
            anyhow::anyhow!("Failed to create uploads dir '{}': {e}", config.uploads_dir)
        })?;

    let analysis_client = AnalysisClientBuilder::new()
        .ai_provider(generator)
        .image_labeler(labeler)
        .knowledge_store(Box::new(knowledge_base.clone()))
        .retry_policy(config.retry)
        .system_prompt(task_prompt(&config, ANALYSIS_TASK, ANALYSIS_SYSTEM_PROMPT))
        .labeling_prompt(task_prompt(
            &config,
            IMAGE_LABELING_TASK,
            IMAGE_LABELING_PROMPT,
        ))
        .build()?;

    Ok(AppState {
        config: Arc::new(config),
        analysis_client: Arc::new(analysis_client),
        knowledge_base,
        sqlite_provider: Arc::new(sqlite_provider),
    })
}
