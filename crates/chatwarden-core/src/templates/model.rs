//! Message template models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Template name used when the requested one is missing.
pub const DEFAULT_TEMPLATE: &str = "default";

/// Prompt handed out for tiers without a configured prompt.
pub const FALLBACK_AI_PROMPT: &str = "You are a helpful assistant.";

/// Canned replies and AI system prompts, keyed by tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSet {
    /// Template name to text, per tier.
    #[serde(default)]
    pub templates: BTreeMap<Tier, BTreeMap<String, String>>,
    /// AI system prompt per tier.
    #[serde(default)]
    pub ai_prompts: BTreeMap<Tier, String>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        let templates = [
            (
                Tier::Main,
                &[
                    (
                        "default",
                        "I've received your message and will get back to you shortly with a proper response.",
                    ),
                    (
                        "greeting",
                        "Hi! Thanks for reaching out. I'm currently using an auto-assistant but I'll respond personally soon! 😊",
                    ),
                    (
                        "informative",
                        "I've received your message and will get back to you shortly with a proper response.",
                    ),
                    (
                        "busy",
                        "I'm currently busy, but I saw your message. Will respond as soon as I'm free! 🚀",
                    ),
                ][..],
            ),
            (
                Tier::Casual,
                &[
                    (
                        "default",
                        "Hey! Thanks for the message. I'll get back to you when I can! 👍",
                    ),
                    (
                        "greeting",
                        "Hello! Auto-reply here - I'll respond when I'm available!",
                    ),
                ][..],
            ),
            (Tier::NotImportant, &[("default", "")][..]),
        ];

        let ai_prompts = [
            (
                Tier::Main,
                "You are responding to a VIP contact. Be personal, informative, and helpful.",
            ),
            (
                Tier::Casual,
                "You are responding to a casual contact. Be friendly but brief.",
            ),
            (Tier::NotImportant, "No response needed."),
        ];

        Self {
            templates: templates
                .into_iter()
                .map(|(tier, entries)| {
                    let entries = entries
                        .iter()
                        .map(|(name, text)| ((*name).to_string(), (*text).to_string()))
                        .collect();
                    (tier, entries)
                })
                .collect(),
            ai_prompts: ai_prompts
                .into_iter()
                .map(|(tier, prompt)| (tier, prompt.to_string()))
                .collect(),
        }
    }
}

impl TemplateSet {
    /// Look up a template for a tier.
    ///
    /// Falls back to the tier's `"default"` template when the named one is
    /// missing or empty, and to an empty string when that is missing too.
    #[must_use]
    pub fn get_template(&self, tier: Tier, name: &str) -> &str {
        let Some(tier_templates) = self.templates.get(&tier) else {
            return "";
        };

        tier_templates
            .get(name)
            .filter(|text| !text.is_empty())
            .or_else(|| tier_templates.get(DEFAULT_TEMPLATE))
            .map_or("", String::as_str)
    }

    /// The AI system prompt for a tier, or a generic assistant prompt.
    #[must_use]
    pub fn get_ai_prompt(&self, tier: Tier) -> &str {
        self.ai_prompts
            .get(&tier)
            .map_or(FALLBACK_AI_PROMPT, String::as_str)
    }

    /// Names of the templates configured for a tier.
    pub fn template_names(&self, tier: Tier) -> impl Iterator<Item = &str> {
        self.templates
            .get(&tier)
            .into_iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
    }
}
