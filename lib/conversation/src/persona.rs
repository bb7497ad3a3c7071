//! Persona configuration.
//!
//! A persona is data, not code: one injector implementation serves every
//! deployment variant. The built-in prompts are neutral placeholders meant to
//! be overridden per deployment.

use crate::shaping::ShapingMode;
use persona_chat_ai::WebSearchOptions;
use serde::{Deserialize, Serialize};

/// Built-in persona presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaPreset {
    /// Car salesperson.
    CarSales,
    /// Real-estate advisor.
    #[default]
    RealEstate,
}

impl PersonaPreset {
    /// Returns the preset's configuration.
    #[must_use]
    pub fn config(self) -> PersonaConfig {
        match self {
            Self::CarSales => PersonaConfig::car_sales(),
            Self::RealEstate => PersonaConfig::real_estate(),
        }
    }
}

/// Everything that distinguishes one deployment variant from another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Short name used in logs.
    pub name: String,
    /// The persona system prompt that opens every session.
    pub system_prompt: String,
    /// Model identifier for every completion call.
    pub model: String,
    /// Sampling temperature for replies.
    pub temperature: f32,
    /// Compaction fires each time the user turn count crosses a multiple of
    /// this value.
    pub summarize_after_turns: usize,
    /// Conversational messages sent upstream once past the threshold.
    pub recent_window: usize,
    /// Instruction for the summarization call.
    pub summary_instruction: String,
    /// Text placed between the persona prompt and the summary.
    pub summary_preamble: String,
    /// Token cap for the summarization call.
    pub summary_max_tokens: u32,
    /// Sampling temperature for the summarization call.
    pub summary_temperature: f32,
    /// How replies are presented.
    pub shaping: ShapingMode,
    /// Provider-side search augmentation for replies.
    pub web_search: Option<WebSearchOptions>,
    /// Whether the listing URL is appended to the user's message.
    pub annotate_listing_url: bool,
    /// Message returned when the completion call fails.
    pub failure_message: String,
}

impl PersonaConfig {
    /// Real-estate advisor preset.
    #[must_use]
    pub fn real_estate() -> Self {
        Self {
            name: "real_estate".to_string(),
            system_prompt: "You are a real-estate advisor. Answer questions about the listing \
                the visitor shares and about buying, financing and improving homes. \
                Keep answers short and concrete."
                .to_string(),
            summary_instruction: "Summarize this conversation in at most 5 bullet points, \
                focused on the home and the visitor's interests."
                .to_string(),
            shaping: ShapingMode::LineBreaks,
            ..Self::base("real_estate")
        }
    }

    /// Car salesperson preset.
    #[must_use]
    pub fn car_sales() -> Self {
        Self {
            name: "car_sales".to_string(),
            system_prompt: "You are a car salesperson. Help the visitor choose, finance and \
                test-drive a car. Keep answers short and concrete."
                .to_string(),
            summary_instruction: "Summarize this conversation in at most 5 bullet points, \
                focused on the cars and the visitor's preferences."
                .to_string(),
            shaping: ShapingMode::Markdown,
            ..Self::base("car_sales")
        }
    }

    fn base(name: &str) -> Self {
        Self {
            name: name.to_string(),
            system_prompt: String::new(),
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            summarize_after_turns: 15,
            recent_window: 5,
            summary_instruction: String::new(),
            summary_preamble: "Summary of the conversation so far:".to_string(),
            summary_max_tokens: 300,
            summary_temperature: 0.3,
            shaping: ShapingMode::Passthrough,
            web_search: None,
            annotate_listing_url: true,
            failure_message: "Something went wrong while generating a reply. Please try again later."
                .to_string(),
        }
    }

    /// Overrides the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Overrides the compaction threshold.
    #[must_use]
    pub fn with_summarize_after_turns(mut self, turns: usize) -> Self {
        self.summarize_after_turns = turns.max(1);
        self
    }

    /// Overrides the post-threshold window. At least the latest turn is
    /// always sent.
    #[must_use]
    pub fn with_recent_window(mut self, window: usize) -> Self {
        self.recent_window = window.max(1);
        self
    }

    /// Overrides the shaping mode.
    #[must_use]
    pub fn with_shaping(mut self, shaping: ShapingMode) -> Self {
        self.shaping = shaping;
        self
    }

    /// Enables web search augmentation.
    #[must_use]
    pub fn with_web_search(mut self, options: WebSearchOptions) -> Self {
        self.web_search = Some(options);
        self
    }

    /// Builds the head message text used after a compaction.
    #[must_use]
    pub fn summary_head(&self, summary: &str) -> String {
        format!(
            "{}\n\n{}\n\n{}",
            self.system_prompt,
            self.summary_preamble,
            summary.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_share_defaults() {
        for persona in [PersonaConfig::real_estate(), PersonaConfig::car_sales()] {
            assert_eq!(persona.model, "gpt-4o");
            assert_eq!(persona.summarize_after_turns, 15);
            assert_eq!(persona.recent_window, 5);
            assert_eq!(persona.summary_max_tokens, 300);
            assert!(!persona.system_prompt.is_empty());
            assert!(!persona.summary_instruction.is_empty());
        }
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(PersonaPreset::CarSales.config().name, "car_sales");
        assert_eq!(PersonaPreset::default().config().name, "real_estate");
    }

    #[test]
    fn threshold_is_at_least_one() {
        let persona = PersonaConfig::real_estate().with_summarize_after_turns(0);
        assert_eq!(persona.summarize_after_turns, 1);
    }

    #[test]
    fn window_is_at_least_one() {
        let persona = PersonaConfig::car_sales().with_recent_window(0);
        assert_eq!(persona.recent_window, 1);
    }

    #[test]
    fn summary_head_contains_prompt_and_summary() {
        let persona = PersonaConfig::real_estate().with_system_prompt("Je bent Ronald.");
        let head = persona.summary_head("  - wil een tuin\n");

        assert!(head.starts_with("Je bent Ronald."));
        assert!(head.contains("Summary of the conversation so far:"));
        assert!(head.ends_with("- wil een tuin"));
    }
}
