//! Precedence-ordered tier resolution.

use std::fmt;

use super::model::{Ruleset, Tier, TierRule, TierSettings};
use crate::identity::Identity;

/// Which rule placed a contact in its tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    /// Exact normalized name.
    Name,
    /// Exact normalized phone.
    Phone,
    /// The name contains this keyword.
    Keyword(String),
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Phone => f.write_str("phone"),
            Self::Keyword(keyword) => write!(f, "keyword '{keyword}'"),
        }
    }
}

/// Outcome of resolving one identity against a ruleset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved tier.
    pub tier: Tier,
    /// Settings of the resolved tier.
    pub settings: TierSettings,
    /// The rule that matched, or `None` when the default tier was applied.
    pub matched_by: Option<MatchReason>,
}

impl Resolution {
    /// Whether no rule matched and the default tier was applied.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.matched_by.is_none()
    }
}

impl TierRule {
    /// Check one identity against this rule: name, then phone, then keywords.
    #[must_use]
    pub fn matches(&self, identity: &Identity) -> Option<MatchReason> {
        let name = identity.name();

        if !name.is_empty() && self.by_name.contains(name) {
            return Some(MatchReason::Name);
        }

        if identity
            .phone()
            .is_some_and(|phone| self.by_phone.contains(phone))
        {
            return Some(MatchReason::Phone);
        }

        self.by_keywords
            .iter()
            .find(|keyword| !keyword.is_empty() && name.contains(keyword.as_str()))
            .map(|keyword| MatchReason::Keyword(keyword.clone()))
    }
}

impl Ruleset {
    /// Resolve an identity to a tier.
    ///
    /// Tiers are tried in [`Tier::PRECEDENCE`] order and the first match wins,
    /// so a contact listed in several tiers always lands in the most important
    /// one. Contacts matching nothing get the default tier.
    #[must_use]
    pub fn resolve(&self, identity: &Identity) -> Resolution {
        self.rules()
            .find_map(|(tier, rule)| {
                rule.matches(identity).map(|reason| Resolution {
                    tier,
                    settings: rule.settings,
                    matched_by: Some(reason),
                })
            })
            .unwrap_or_else(|| {
                let tier = self.default_tier();
                Resolution {
                    tier,
                    settings: self.rule(tier).settings,
                    matched_by: None,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario_ruleset() -> Ruleset {
        let mut ruleset = Ruleset::default();
        ruleset.rule_mut(Tier::NotImportant).by_keywords = ["promo".to_string()].into();
        ruleset
            .rule_mut(Tier::Main)
            .insert(&Identity::new("alice", None));
        ruleset
    }

    fn resolve(ruleset: &Ruleset, name: &str, phone: Option<&str>) -> Resolution {
        ruleset.resolve(&Identity::new(name, phone))
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let resolution = resolve(&scenario_ruleset(), "Alice", None);
        assert_eq!(resolution.tier, Tier::Main);
        assert_eq!(resolution.matched_by, Some(MatchReason::Name));
        assert_eq!(resolution.settings, TierSettings::stock(Tier::Main));
    }

    #[test]
    fn test_keyword_match() {
        let resolution = resolve(&scenario_ruleset(), "Promo Team", None);
        assert_eq!(resolution.tier, Tier::NotImportant);
        assert_eq!(
            resolution.matched_by,
            Some(MatchReason::Keyword("promo".to_string()))
        );
    }

    #[test]
    fn test_padded_keyword_matches_whole_word_start() {
        let mut ruleset = Ruleset::default();
        ruleset.rule_mut(Tier::NotImportant).by_keywords.clear();
        ruleset.rule_mut(Tier::NotImportant).by_keywords.insert(" Bot".to_string());
        let ruleset = ruleset.normalized();

        let resolution = resolve(&ruleset, "The Bot", None);
        assert_eq!(
            resolution.matched_by,
            Some(MatchReason::Keyword(" bot".to_string()))
        );
        assert!(resolve(&ruleset, "Robot", None).is_default());
    }

    #[test]
    fn test_match_reason_display() {
        assert_eq!(MatchReason::Name.to_string(), "name");
        assert_eq!(
            MatchReason::Keyword("promo".to_string()).to_string(),
            "keyword 'promo'"
        );
    }

    #[test]
    fn test_unmatched_gets_default_tier() {
        let resolution = resolve(&scenario_ruleset(), "Bob", None);
        assert_eq!(resolution.tier, Tier::NotImportant);
        assert!(resolution.is_default());
    }

    #[test]
    fn test_configured_default_tier() {
        let mut ruleset = scenario_ruleset();
        ruleset.defaults.uncategorized_contacts = Tier::Casual;

        let resolution = resolve(&ruleset, "Bob", None);
        assert_eq!(resolution.tier, Tier::Casual);
        assert_eq!(resolution.settings, TierSettings::stock(Tier::Casual));
    }

    #[test]
    fn test_phone_match_after_normalization() {
        let mut ruleset = Ruleset::default();
        ruleset
            .rule_mut(Tier::Casual)
            .insert(&Identity::new("", Some("+1 555-0100")));

        let resolution = resolve(&ruleset, "Unknown Caller", Some("+1 (555) 0100"));
        assert_eq!(resolution.tier, Tier::Casual);
        assert_eq!(resolution.matched_by, Some(MatchReason::Phone));
    }

    #[test]
    fn test_empty_identity_falls_back() {
        let mut ruleset = Ruleset::default();
        ruleset.rule_mut(Tier::Main).by_name.insert(String::new());

        let resolution = resolve(&ruleset, "", Some(""));
        assert_eq!(resolution.tier, Tier::NotImportant);
        assert!(resolution.is_default());
    }

    #[test]
    fn test_higher_tier_wins_over_keyword() {
        let mut ruleset = Ruleset::default();
        ruleset
            .rule_mut(Tier::Casual)
            .insert(&Identity::new("Spam Lover", None));

        let resolution = resolve(&ruleset, "spam lover", None);
        assert_eq!(resolution.tier, Tier::Casual);
    }

    #[test]
    fn test_phone_match_in_lower_tier_loses_to_name_in_higher() {
        let mut ruleset = Ruleset::default();
        ruleset
            .rule_mut(Tier::NotImportant)
            .insert(&Identity::new("", Some("5550100")));
        ruleset
            .rule_mut(Tier::Main)
            .insert(&Identity::new("Dana", None));

        let resolution = resolve(&ruleset, "Dana", Some("5550100"));
        assert_eq!(resolution.tier, Tier::Main);
    }

    proptest! {
        #[test]
        fn prop_main_listing_always_wins(
            name in "[a-z]{1,12}",
            in_casual in any::<bool>(),
            in_not_important in any::<bool>(),
        ) {
            let identity = Identity::new(&name, None);
            let mut ruleset = Ruleset::default();
            ruleset.rule_mut(Tier::Main).insert(&identity);
            if in_casual {
                ruleset.rule_mut(Tier::Casual).insert(&identity);
            }
            if in_not_important {
                ruleset.rule_mut(Tier::NotImportant).insert(&identity);
            }

            prop_assert_eq!(ruleset.resolve(&identity).tier, Tier::Main);
        }

        #[test]
        fn prop_unlisted_contacts_get_default(
            name in "[0-9]{1,12}",
            default_index in 0usize..3,
        ) {
            let mut ruleset = Ruleset::default();
            ruleset.defaults.uncategorized_contacts = Tier::PRECEDENCE[default_index];

            let resolution = ruleset.resolve(&Identity::new(&name, Some(&name)));
            prop_assert_eq!(resolution.tier, Tier::PRECEDENCE[default_index]);
            prop_assert!(resolution.is_default());
        }
    }
}
