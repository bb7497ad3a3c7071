//! Centralized server configuration.
//!
//! Loaded via the `config` crate from an optional `persona-chat.toml` file
//! and environment variables (`__` separates nesting levels, e.g.
//! `PERSONA__PRESET=car_sales`).

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use persona_chat_ai::WebSearchOptions;
use persona_chat_ai::backend::OPENAI_BASE_URL;
use persona_chat_conversation::{PersonaConfig, PersonaPreset, ShapingMode};
use persona_chat_listing::FetcherConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Completion API key, read from `OPENAI_API_KEY`.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Completion API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Persona selection and overrides.
    #[serde(default)]
    pub persona: PersonaSettings,

    /// Session store configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Listing page fetcher configuration.
    #[serde(default)]
    pub listing: FetcherConfig,
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

/// Completion API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key, read from `OPENAI__API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    OPENAI_BASE_URL.to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

/// Persona preset plus per-field overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaSettings {
    /// Built-in preset to start from.
    #[serde(default)]
    pub preset: PersonaPreset,
    /// Replaces the preset's system prompt.
    pub system_prompt: Option<String>,
    /// Model identifier for every completion call.
    pub model: Option<String>,
    /// Sampling temperature for replies.
    pub temperature: Option<f32>,
    /// Compaction threshold in user turns. Values below 1 become 1.
    pub summarize_after_turns: Option<usize>,
    /// Conversational messages sent once past the threshold. Values below 1
    /// become 1.
    pub recent_window: Option<usize>,
    /// How replies are presented.
    pub shaping: Option<ShapingMode>,
    /// Enables web search augmentation scoped to this country code.
    pub web_search_country: Option<String>,
}

impl PersonaSettings {
    /// Applies the overrides to the selected preset.
    #[must_use]
    pub fn resolve(&self) -> PersonaConfig {
        let mut persona = self.preset.config();

        if let Some(prompt) = &self.system_prompt {
            persona = persona.with_system_prompt(prompt.clone());
        }
        if let Some(model) = &self.model {
            persona.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            persona.temperature = temperature;
        }
        if let Some(turns) = self.summarize_after_turns {
            persona = persona.with_summarize_after_turns(turns);
        }
        if let Some(window) = self.recent_window {
            persona = persona.with_recent_window(window);
        }
        if let Some(shaping) = self.shaping {
            persona = persona.with_shaping(shaping);
        }
        if let Some(country) = self.web_search_country.as_deref().map(str::trim) {
            if !country.is_empty() {
                persona = persona.with_web_search(WebSearchOptions::for_country(country));
            }
        }

        persona
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Evict sessions idle for this many minutes. 0 keeps them for the
    /// lifetime of the process.
    #[serde(default)]
    pub idle_ttl_minutes: u64,

    /// Interval between eviction runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_minutes: 0,
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from `persona-chat.toml` (if present) and
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("persona-chat").required(false))
                .add_source(
                    Environment::default()
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    /// Builds configuration from arbitrary sources.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but invalid.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Returns the completion API key, if configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .or(self.openai.api_key.as_deref())
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
