//! Skip list models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, normalize_keyword, normalize_name, normalize_phone};

/// Contacts that must never be auto-handled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipContacts {
    /// Normalized contact names.
    #[serde(default)]
    pub by_name: BTreeSet<String>,
    /// Normalized phone numbers.
    #[serde(default)]
    pub by_phone: BTreeSet<String>,
    /// Lower-cased substrings matched against the normalized name.
    #[serde(default)]
    pub by_keywords: BTreeSet<String>,
}

/// Message-level conditions, evaluated by the message handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipConditions {
    /// Leave messages containing any of these words to the user.
    #[serde(default)]
    pub skip_if_contains: Vec<String>,
    /// Do not auto-handle during business hours.
    #[serde(default)]
    pub skip_business_hours: bool,
    /// Do not auto-handle on weekends.
    #[serde(default)]
    pub skip_weekends: bool,
}

impl Default for SkipConditions {
    fn default() -> Self {
        Self {
            skip_if_contains: vec!["urgent".to_string(), "emergency".to_string()],
            skip_business_hours: false,
            skip_weekends: false,
        }
    }
}

/// The skip list document (`skip_list.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipList {
    /// Skipped contacts.
    pub skip_contacts: SkipContacts,
    /// Skipped group chats, by normalized name.
    #[serde(default)]
    pub skip_groups: BTreeSet<String>,
    /// Message-level conditions.
    #[serde(default)]
    pub skip_conditions: SkipConditions,
}

impl SkipList {
    /// Whether a contact is on the skip list by name, phone or keyword.
    #[must_use]
    pub fn is_contact_skipped(&self, identity: &Identity) -> bool {
        let contacts = &self.skip_contacts;
        let name = identity.name();

        (!name.is_empty() && contacts.by_name.contains(name))
            || identity
                .phone()
                .is_some_and(|phone| contacts.by_phone.contains(phone))
            || contacts
                .by_keywords
                .iter()
                .any(|keyword| !keyword.is_empty() && name.contains(keyword.as_str()))
    }

    /// Whether a group chat is skipped. Group names compare like contact names.
    #[must_use]
    pub fn is_group_skipped(&self, group: &str) -> bool {
        let group = normalize_name(group);
        !group.is_empty() && self.skip_groups.contains(&group)
    }

    /// Bring hand-edited entries into canonical form and drop empty ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        let canonical = |values: BTreeSet<String>, normalize: fn(&str) -> String| -> BTreeSet<String> {
            values
                .iter()
                .map(|v| normalize(v))
                .filter(|v| !v.is_empty())
                .collect()
        };

        Self {
            skip_contacts: SkipContacts {
                by_name: canonical(self.skip_contacts.by_name, normalize_name),
                by_phone: canonical(self.skip_contacts.by_phone, normalize_phone),
                by_keywords: canonical(self.skip_contacts.by_keywords, normalize_keyword),
            },
            skip_groups: canonical(self.skip_groups, normalize_name),
            skip_conditions: self.skip_conditions,
        }
    }
}
