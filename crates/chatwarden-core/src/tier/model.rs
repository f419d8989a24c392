//! Contact tier data models.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, normalize_keyword, normalize_name, normalize_phone};
use crate::validation::ValidationError;

/// Priority class of a contact.
///
/// Variants are declared in precedence order, so the derived `Ord` sorts the
/// most important tier first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// VIP contacts: full attention with notifications.
    #[serde(rename = "main_contacts")]
    Main,
    /// Casual contacts: basic auto-replies.
    #[serde(rename = "time_pass_contacts")]
    Casual,
    /// Low priority: log only, no replies.
    #[serde(rename = "not_important")]
    NotImportant,
}

impl Tier {
    /// All tiers, highest precedence first. Resolution walks this order.
    pub const PRECEDENCE: [Self; 3] = [Self::Main, Self::Casual, Self::NotImportant];

    /// Parse from the file key. Unknown keys yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "main_contacts" => Some(Self::Main),
            "time_pass_contacts" => Some(Self::Casual),
            "not_important" => Some(Self::NotImportant),
            _ => None,
        }
    }

    /// Convert to the file key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main_contacts",
            Self::Casual => "time_pass_contacts",
            Self::NotImportant => "not_important",
        }
    }

    /// Human-readable display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Casual => "Time Pass",
            Self::NotImportant => "Not Important",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ValidationError::UnknownTier(s.to_string()))
    }
}

/// Reply strategy for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyMode {
    /// Generate an informative reply with the tier's AI prompt.
    #[serde(rename = "informative_ai", alias = "ai_informative")]
    AiInformative,
    /// Reply with a canned template.
    #[serde(rename = "template_basic")]
    TemplateBasic,
    /// Do not reply.
    #[serde(rename = "none")]
    None,
}

impl ReplyMode {
    /// Parse from the file representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "informative_ai" | "ai_informative" => Some(Self::AiInformative),
            "template_basic" => Some(Self::TemplateBasic),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Convert to the file representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AiInformative => "informative_ai",
            Self::TemplateBasic => "template_basic",
            Self::None => "none",
        }
    }

    /// Whether this mode sends any reply at all.
    #[must_use]
    pub const fn replies(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Handling priority attached to a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    /// Handle first.
    High,
    /// Handle when convenient.
    Medium,
    /// Handle last, if at all.
    Low,
}

impl PriorityLevel {
    /// Parse from the file representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Convert to the file representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Behavior bundle applied to every contact of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)] // Mirrors the on-disk settings object
pub struct TierSettings {
    /// Open the chat and read the message.
    pub open_and_read: bool,
    /// Play a notification sound.
    pub play_sound: bool,
    /// How to reply.
    pub reply_mode: ReplyMode,
    /// Mark the chat as read after handling.
    pub mark_as_read: bool,
    /// Handling priority.
    pub priority_level: PriorityLevel,
}

impl TierSettings {
    /// Stock settings written when the ruleset is bootstrapped.
    #[must_use]
    pub const fn stock(tier: Tier) -> Self {
        match tier {
            Tier::Main => Self {
                open_and_read: true,
                play_sound: true,
                reply_mode: ReplyMode::AiInformative,
                mark_as_read: true,
                priority_level: PriorityLevel::High,
            },
            Tier::Casual => Self {
                open_and_read: false,
                play_sound: false,
                reply_mode: ReplyMode::TemplateBasic,
                mark_as_read: true,
                priority_level: PriorityLevel::Medium,
            },
            Tier::NotImportant => Self {
                open_and_read: false,
                play_sound: false,
                reply_mode: ReplyMode::None,
                mark_as_read: false,
                priority_level: PriorityLevel::Low,
            },
        }
    }
}

/// Matching rules and settings for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
    /// Free-form documentation, not used for matching.
    #[serde(default)]
    pub description: String,
    /// Normalized contact names.
    #[serde(default)]
    pub by_name: BTreeSet<String>,
    /// Normalized phone numbers.
    #[serde(default)]
    pub by_phone: BTreeSet<String>,
    /// Lower-cased substrings matched against the normalized name.
    #[serde(default)]
    pub by_keywords: BTreeSet<String>,
    /// Behavior for contacts in this tier.
    pub settings: TierSettings,
}

impl TierRule {
    /// Stock rule written when the ruleset is bootstrapped.
    #[must_use]
    pub fn stock(tier: Tier) -> Self {
        let (description, keywords): (&str, &[&str]) = match tier {
            Tier::Main => ("VIP contacts - Full attention with notifications", &[]),
            Tier::Casual => ("Casual contacts - Basic auto-replies", &[]),
            Tier::NotImportant => (
                "Low priority - Log only, no replies",
                &["promotion", "spam", "offer"],
            ),
        };

        Self {
            description: description.to_string(),
            by_name: BTreeSet::new(),
            by_phone: BTreeSet::new(),
            by_keywords: keywords.iter().map(ToString::to_string).collect(),
            settings: TierSettings::stock(tier),
        }
    }

    /// Bring hand-edited entries into canonical form and drop empty ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            by_name: canonical(self.by_name.iter().map(|n| normalize_name(n))),
            by_phone: canonical(self.by_phone.iter().map(|p| normalize_phone(p))),
            by_keywords: canonical(self.by_keywords.iter().map(|k| normalize_keyword(k))),
            ..self
        }
    }

    /// Add an identity's name and phone. Returns `true` if anything changed.
    pub fn insert(&mut self, identity: &Identity) -> bool {
        let mut changed = false;
        if !identity.name().is_empty() {
            changed |= self.by_name.insert(identity.name().to_string());
        }
        if let Some(phone) = identity.phone() {
            changed |= self.by_phone.insert(phone.to_string());
        }
        changed
    }

    /// Remove an identity's name and phone. Returns `true` if anything changed.
    pub fn remove(&mut self, identity: &Identity) -> bool {
        let mut changed = self.by_name.remove(identity.name());
        if let Some(phone) = identity.phone() {
            changed |= self.by_phone.remove(phone);
        }
        changed
    }

    /// Entry counts for diagnostics.
    #[must_use]
    pub fn stats(&self) -> TierStats {
        TierStats {
            by_name: self.by_name.len(),
            by_phone: self.by_phone.len(),
            by_keyword: self.by_keywords.len(),
            total: self.by_name.len() + self.by_phone.len(),
        }
    }
}

fn canonical(values: impl Iterator<Item = String>) -> BTreeSet<String> {
    values.filter(|v| !v.is_empty()).collect()
}

/// One rule per tier. The struct shape guarantees no tier is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierRules {
    /// Rule for [`Tier::Main`].
    pub main_contacts: TierRule,
    /// Rule for [`Tier::Casual`].
    pub time_pass_contacts: TierRule,
    /// Rule for [`Tier::NotImportant`].
    pub not_important: TierRule,
}

/// What the chat agent should do with a contact that matches no rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewContactBehavior {
    /// Ask the user to classify the contact.
    #[default]
    AskUser,
    /// Silently apply the default tier.
    UseDefault,
}

impl NewContactBehavior {
    /// Parse from the file representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ask_user" => Some(Self::AskUser),
            "use_default" => Some(Self::UseDefault),
            _ => None,
        }
    }
}

const fn default_tier() -> Tier {
    Tier::NotImportant
}

/// Policy for contacts that match no rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPolicy {
    /// Tier assigned to unmatched contacts.
    #[serde(default = "default_tier")]
    pub uncategorized_contacts: Tier,
    /// Hint for the chat agent; resolution always falls back to the default tier.
    #[serde(default)]
    pub new_contact_behavior: NewContactBehavior,
    /// Reserved flag kept for file compatibility.
    #[serde(default)]
    pub auto_categorize: bool,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self {
            uncategorized_contacts: default_tier(),
            new_contact_behavior: NewContactBehavior::AskUser,
            auto_categorize: false,
        }
    }
}

/// The full persisted ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Per-tier rules.
    #[serde(rename = "contact_tiers")]
    pub tiers: TierRules,
    /// Fallback policy.
    #[serde(rename = "default_settings", default)]
    pub defaults: DefaultPolicy,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            tiers: TierRules {
                main_contacts: TierRule::stock(Tier::Main),
                time_pass_contacts: TierRule::stock(Tier::Casual),
                not_important: TierRule::stock(Tier::NotImportant),
            },
            defaults: DefaultPolicy::default(),
        }
    }
}

impl Ruleset {
    /// The rule for a tier.
    #[must_use]
    pub const fn rule(&self, tier: Tier) -> &TierRule {
        match tier {
            Tier::Main => &self.tiers.main_contacts,
            Tier::Casual => &self.tiers.time_pass_contacts,
            Tier::NotImportant => &self.tiers.not_important,
        }
    }

    /// Mutable access to the rule for a tier.
    pub const fn rule_mut(&mut self, tier: Tier) -> &mut TierRule {
        match tier {
            Tier::Main => &mut self.tiers.main_contacts,
            Tier::Casual => &mut self.tiers.time_pass_contacts,
            Tier::NotImportant => &mut self.tiers.not_important,
        }
    }

    /// Rules in precedence order.
    pub fn rules(&self) -> impl Iterator<Item = (Tier, &TierRule)> {
        Tier::PRECEDENCE.into_iter().map(|tier| (tier, self.rule(tier)))
    }

    /// Tier assigned to contacts that match no rule.
    #[must_use]
    pub const fn default_tier(&self) -> Tier {
        self.defaults.uncategorized_contacts
    }

    /// Canonicalize every rule.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            tiers: TierRules {
                main_contacts: self.tiers.main_contacts.normalized(),
                time_pass_contacts: self.tiers.time_pass_contacts.normalized(),
                not_important: self.tiers.not_important.normalized(),
            },
            defaults: self.defaults,
        }
    }

    /// Per-tier entry counts.
    #[must_use]
    pub fn statistics(&self) -> BTreeMap<Tier, TierStats> {
        self.rules().map(|(tier, rule)| (tier, rule.stats())).collect()
    }
}

/// Entry counts for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierStats {
    /// Names listed in the tier.
    pub by_name: usize,
    /// Phone numbers listed in the tier.
    pub by_phone: usize,
    /// Keywords listed in the tier.
    pub by_keyword: usize,
    /// Listed contacts: names plus phones.
    pub total: usize,
}
