//! # Application State
//!
//! Defines the shared application state (`AppState`) and the logic for
//! building it at startup. The `AppState` holds all shared resources, such as
//! the configuration, database provider, the extraction-service client, and
//! instantiated AI provider clients, making them accessible to all request
//! handlers.

use crate::config::AppConfig;
use crate::errors::AppError;
use nexusone::{
    ingest::TextExtractor,
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider, ChatProvider},
        db::sqlite::SqliteProvider,
    },
};
use std::{collections::HashMap, sync::Arc, time::Duration};

/// A fully resolved task configuration with non-optional fields.
#[derive(Clone, Debug)]
pub struct ResolvedTask {
    pub provider: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// A map of fully resolved tasks, ready for use by handlers.
    pub tasks: Arc<HashMap<String, ResolvedTask>>,
    /// The primary database provider for tenant data and the blob store.
    pub sqlite_provider: Arc<SqliteProvider>,
    /// A map of instantiated AI providers, keyed by their name from the config.
    pub ai_providers: Arc<HashMap<String, Box<dyn ChatProvider>>>,
    /// The client for the external text-extraction service.
    pub extractor: Arc<TextExtractor>,
}

impl AppState {
    /// Looks up a resolved task and the provider instance it names.
    pub fn task_with_provider(
        &self,
        task_name: &str,
    ) -> Result<(&ResolvedTask, &dyn ChatProvider), AppError> {
        let task = self.tasks.get(task_name).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Task '{task_name}' is not configured"))
        })?;
        let provider = self.ai_providers.get(&task.provider).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Task '{task_name}' names unknown provider '{}'",
                task.provider
            ))
        })?;
        Ok((task, provider.as_ref()))
    }
}

/// Builds the shared application state from the configuration.
///
/// This instantiates an AI provider client for each entry in the `providers`
/// section, resolves every task, sets up the SQLite connection, and builds
/// the extraction-service client.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    // Create a map of AI provider instances from the configuration.
    let mut ai_providers = HashMap::new();
    for (name, provider_config) in &config.providers {
        let provider: Box<dyn ChatProvider> = match provider_config.provider.as_str() {
            "gemini" => {
                let api_key = provider_config.api_key.clone().ok_or_else(|| {
                    anyhow::anyhow!("api_key is required for gemini provider '{name}'")
                })?;
                // If api_url is not provided in config, construct it from the model name.
                let api_url = provider_config.api_url.clone().unwrap_or_else(|| {
                    format!(
                        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                        provider_config.model_name
                    )
                });
                Box::new(GeminiProvider::new(api_url, api_key)?)
            }
            "local" => {
                // For local providers, the URL is always required.
                let api_url = provider_config.api_url.clone().ok_or_else(|| {
                    anyhow::anyhow!(
                        "api_url is required for local provider '{name}'. Please set LOCAL_AI_API_URL in your .env file."
                    )
                })?;
                Box::new(LocalAiProvider::new(
                    api_url,
                    provider_config.api_key.clone(),
                    Some(provider_config.model_name.clone()),
                )?)
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported AI provider type '{}' for provider '{}'",
                    provider_config.provider,
                    name
                ));
            }
        };
        ai_providers.insert(name.clone(), provider);
    }

    // Validate and resolve all tasks from the configuration. The config
    // loading ensures that the default chat task has its fields populated, so
    // a failure here indicates a malformed config file.
    let mut resolved_tasks = HashMap::new();
    for (name, task_config) in &config.tasks {
        let provider = task_config.provider.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'provider' field")
        })?;
        let system_prompt = task_config.system_prompt.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'system_prompt' field")
        })?;
        let user_prompt = task_config.user_prompt.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'user_prompt' field")
        })?;

        resolved_tasks.insert(
            name.clone(),
            ResolvedTask {
                provider,
                system_prompt,
                user_prompt,
            },
        );
    }

    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    tracing::info!(db_path = %config.db_url, "Initialized local storage provider (SQLite).");
    // Ensure the database schema is up-to-date on startup.
    sqlite_provider.initialize_schema().await?;

    let extractor = TextExtractor::new(
        config.extraction.api_url.clone(),
        Duration::from_secs(config.extraction.timeout_secs),
    )?;

    Ok(AppState {
        config: Arc::new(config),
        tasks: Arc::new(resolved_tasks),
        sqlite_provider: Arc::new(sqlite_provider),
        ai_providers: Arc::new(ai_providers),
        extractor: Arc::new(extractor),
    })
}
