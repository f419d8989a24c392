//! Ruleset file storage.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::model::Ruleset;
use crate::Result;
use crate::persist::{Document, JsonFile};
use crate::validation::{ValidationResult, validate_ruleset};

impl Document for Ruleset {
    const KIND: &'static str = "ruleset";

    fn bootstrap() -> Self {
        Self::default()
    }

    fn validate(doc: &Value) -> ValidationResult {
        validate_ruleset(doc)
    }

    fn normalized(self) -> Self {
        Self::normalized(self)
    }
}

/// Storage for the contact tier ruleset (`contact_categories.json`).
#[derive(Debug, Clone)]
pub struct RulesetStore {
    file: JsonFile,
}

impl RulesetStore {
    /// Create a store for the given file path. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Path of the ruleset file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Load the ruleset.
    ///
    /// Creates the file with the stock ruleset if it does not exist. Entries
    /// are normalized on the way in, so hand-edited files may use any casing
    /// or phone formatting.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or is not JSON,
    /// and a validation error listing every structural problem otherwise.
    pub async fn load(&self) -> Result<Ruleset> {
        self.file.load().await
    }

    /// Atomically replace the ruleset file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be written.
    pub async fn save(&self, ruleset: &Ruleset) -> Result<()> {
        self.file.save(ruleset).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::tier::{ReplyMode, Tier};
    use crate::validation::ValidationError;

    #[tokio::test]
    async fn test_load_creates_default_ruleset() {
        let dir = tempfile::tempdir().unwrap();
        let store = RulesetStore::new(dir.path().join("contact_categories.json"));

        let ruleset = store.load().await.unwrap();
        assert_eq!(ruleset, Ruleset::default());

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw["default_settings"]["uncategorized_contacts"],
            "not_important"
        );
        assert_eq!(raw["default_settings"]["new_contact_behavior"], "ask_user");
        assert_eq!(
            raw["contact_tiers"]["main_contacts"]["settings"]["reply_mode"],
            "informative_ai"
        );
    }

    #[tokio::test]
    async fn test_round_trip_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = RulesetStore::new(dir.path().join("contact_categories.json"));

        let mut ruleset = store.load().await.unwrap();
        ruleset
            .rule_mut(Tier::Main)
            .insert(&Identity::new("Alice", Some("+44 20 7946 0000")));
        ruleset.defaults.uncategorized_contacts = Tier::Casual;
        store.save(&ruleset).await.unwrap();

        let loaded = store.load().await.unwrap();
        store.save(&loaded).await.unwrap();
        assert_eq!(store.load().await.unwrap(), ruleset);
    }

    #[tokio::test]
    async fn test_load_accepts_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contact_categories.json");
        std::fs::write(
            &path,
            r#"{
              "contact_tiers": {
                "main_contacts": {
                  "by_name": ["  Alice "],
                  "by_phone": ["+1 (555) 123-4567"],
                  "settings": {"open_and_read": true, "play_sound": true,
                               "reply_mode": "ai_informative", "mark_as_read": true,
                               "priority_level": "high"}
                },
                "time_pass_contacts": {
                  "settings": {"open_and_read": false, "play_sound": false,
                               "reply_mode": "template_basic", "mark_as_read": true,
                               "priority_level": "medium"}
                },
                "not_important": {
                  "by_keywords": ["Promo"],
                  "settings": {"open_and_read": false, "play_sound": false,
                               "reply_mode": "none", "mark_as_read": false,
                               "priority_level": "low"}
                }
              }
            }"#,
        )
        .unwrap();

        let ruleset = RulesetStore::new(&path).load().await.unwrap();
        let main = ruleset.rule(Tier::Main);
        assert!(main.by_name.contains("alice"));
        assert!(main.by_phone.contains("+15551234567"));
        assert_eq!(main.settings.reply_mode, ReplyMode::AiInformative);
        assert!(ruleset.rule(Tier::NotImportant).by_keywords.contains("promo"));
        assert_eq!(ruleset.default_tier(), Tier::NotImportant);
    }

    #[tokio::test]
    async fn test_load_rejects_missing_tier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contact_categories.json");
        let mut doc = serde_json::to_value(Ruleset::default()).unwrap();
        doc["contact_tiers"]
            .as_object_mut()
            .unwrap()
            .remove("time_pass_contacts");
        std::fs::write(&path, doc.to_string()).unwrap();

        let err = RulesetStore::new(&path).load().await.unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap(),
            [ValidationError::MissingTier(Tier::Casual)]
        );
    }

    #[tokio::test]
    async fn test_load_does_not_overwrite_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contact_categories.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(RulesetStore::new(&path).load().await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
