//! Shared application state.

use crate::config::{ServerConfig, SessionConfig};
use crate::error::StartupError;
use persona_chat_ai::backend::OPENAI_BASE_URL;
use persona_chat_ai::{LlmBackendConfig, OpenAiBackend};
use persona_chat_conversation::ChatService;
use persona_chat_core::Result;
use persona_chat_listing::HttpPageFetcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// One year.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Shared application state.
pub struct AppState {
    /// The chat pipeline.
    pub chat: ChatService,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(chat: ChatService, session_config: SessionConfig) -> Self {
        Self {
            chat,
            session_config,
        }
    }

    /// Wires the completion backend, listing fetcher and persona from
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a client cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let api_key = config.api_key().ok_or(StartupError::MissingApiKey)?;

        let base_url = config.openai.base_url.trim_end_matches('/');
        let backend_config = if base_url == OPENAI_BASE_URL {
            LlmBackendConfig::openai(api_key)
        } else {
            LlmBackendConfig::openai_compatible(base_url, api_key)
        };
        let backend = OpenAiBackend::new(&backend_config).map_err(|e| StartupError::Backend {
            reason: e.to_string(),
        })?;

        let fetcher = HttpPageFetcher::new(&config.listing).map_err(|report| {
            tracing::error!(error = ?report, "Failed to build listing fetcher");
            StartupError::ListingClient
        })?;

        let chat = ChatService::new(config.persona.resolve(), Arc::new(backend), Arc::new(fetcher));
        tracing::info!(
            persona = %chat.persona().name,
            model = %chat.persona().model,
            provider = %chat.provider(),
            "Chat service configured"
        );

        Ok(Self::new(chat, config.session.clone()))
    }

    /// Spawns the periodic idle-session eviction task. Returns `None` when
    /// eviction is disabled.
    pub fn spawn_session_eviction(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let ttl_minutes = self.session_config.idle_ttl_minutes;
        if ttl_minutes == 0 {
            return None;
        }

        let state = Arc::clone(self);
        let interval_secs = self.session_config.cleanup_interval_seconds.max(1);
        let ttl = chrono::Duration::minutes(
            i64::try_from(ttl_minutes).unwrap_or(i64::MAX).min(MAX_TTL_MINUTES),
        );

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                let cutoff = chrono::Utc::now() - ttl;
                let count = state.chat.store().evict_idle(cutoff).await;
                if count > 0 {
                    tracing::debug!(evicted_sessions = count, "Periodic session eviction");
                }
            }
        }))
    }
}
