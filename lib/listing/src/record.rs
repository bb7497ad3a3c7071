//! Structured listing facts.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Facts extracted from a listing page. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// The page the facts were read from.
    pub url: String,
    /// Street address or listing title.
    pub address: Option<String>,
    /// Asking price as displayed.
    pub price: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Bullet features (rooms, surface, energy label, ...).
    pub features: Vec<String>,
    /// Listing agent's name.
    pub agent_name: Option<String>,
    /// Listing agent's phone number.
    pub agent_phone: Option<String>,
}

impl ListingRecord {
    /// Creates an empty record for a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the price.
    #[must_use]
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a feature.
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Sets the agent's name and phone.
    #[must_use]
    pub fn with_agent(mut self, name: Option<String>, phone: Option<String>) -> Self {
        self.agent_name = name;
        self.agent_phone = phone;
        self
    }

    /// Returns true if no fact was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.features.is_empty()
            && self.agent_name.is_none()
            && self.agent_phone.is_none()
    }

    /// Renders the record as context text for a system message.
    #[must_use]
    pub fn to_context(&self) -> String {
        let mut out = format!("Listing details from {}:", self.url);

        if let Some(address) = &self.address {
            let _ = write!(out, "\n- Address: {address}");
        }
        if let Some(price) = &self.price {
            let _ = write!(out, "\n- Price: {price}");
        }
        if !self.features.is_empty() {
            let _ = write!(out, "\n- Features: {}", self.features.join("; "));
        }
        match (&self.agent_name, &self.agent_phone) {
            (Some(name), Some(phone)) => {
                let _ = write!(out, "\n- Agent: {name} ({phone})");
            }
            (Some(name), None) => {
                let _ = write!(out, "\n- Agent: {name}");
            }
            (None, Some(phone)) => {
                let _ = write!(out, "\n- Agent phone: {phone}");
            }
            (None, None) => {}
        }
        if let Some(description) = &self.description {
            let _ = write!(out, "\n- Description: {description}");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record() {
        let record = ListingRecord::new("https://example.test/1");
        assert!(record.is_empty());
    }

    #[test]
    fn context_lists_present_fields_only() {
        let record = ListingRecord::new("https://example.test/1")
            .with_address("Iepstraat 3, Utrecht")
            .with_price("€ 450.000 k.k.")
            .with_feature("3 slaapkamers")
            .with_feature("Energielabel A")
            .with_agent(Some("Makelaar Jansen".to_string()), None);

        let context = record.to_context();

        assert!(context.starts_with("Listing details from https://example.test/1:"));
        assert!(context.contains("- Address: Iepstraat 3, Utrecht"));
        assert!(context.contains("- Price: € 450.000 k.k."));
        assert!(context.contains("- Features: 3 slaapkamers; Energielabel A"));
        assert!(context.contains("- Agent: Makelaar Jansen"));
        assert!(!context.contains("Description"));
        assert!(!record.is_empty());
    }

    #[test]
    fn description_is_rendered_last() {
        let record = ListingRecord::new("https://example.test/1")
            .with_price("€ 450.000 k.k.")
            .with_description("Ruime eengezinswoning met tuin.");

        let context = record.to_context();

        assert!(!record.is_empty());
        assert!(context.ends_with("\n- Description: Ruime eengezinswoning met tuin."));
    }

    #[test]
    fn agent_phone_without_name() {
        let record =
            ListingRecord::new("u").with_agent(None, Some("030-1234567".to_string()));
        assert!(record.to_context().contains("- Agent phone: 030-1234567"));
    }
}
