//! Structural validation of configuration documents.
//!
//! Files are validated as raw JSON before they are deserialized, so a broken
//! file reports every problem at once instead of the first serde error.

use std::fmt;

use serde_json::{Map, Value};

use crate::identity::is_valid_phone;
use crate::tier::{NewContactBehavior, PriorityLevel, ReplyMode, Tier};

/// A structural problem in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A section that must be a JSON object is something else.
    NotAnObject(String),
    /// A required section is absent.
    MissingSection(String),
    /// A tier key is absent from the ruleset.
    MissingTier(Tier),
    /// A key that is not one of the three tier keys.
    UnknownTier(String),
    /// A required settings field is absent.
    MissingSetting {
        /// Tier whose settings are incomplete.
        tier: Tier,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A field holds a value of the wrong type or an unknown variant.
    InvalidValue {
        /// Dotted path of the field.
        path: String,
        /// What the field should contain.
        expected: &'static str,
    },
    /// A skip-list phone number is not a plausible phone number.
    InvalidPhone(String),
    /// A skip-list name is blank.
    BlankName,
}

impl ValidationError {
    /// Dotted path of the offending part of the document.
    #[must_use]
    pub fn field(&self) -> String {
        match self {
            Self::NotAnObject(path) | Self::MissingSection(path) => path.clone(),
            Self::MissingTier(tier) => format!("contact_tiers.{tier}"),
            Self::UnknownTier(key) => key.clone(),
            Self::MissingSetting { tier, field } => {
                format!("contact_tiers.{tier}.settings.{field}")
            }
            Self::InvalidValue { path, .. } => path.clone(),
            Self::InvalidPhone(_) => "skip_contacts.by_phone".to_string(),
            Self::BlankName => "skip_contacts.by_name".to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject(path) => write!(f, "'{path}' must be an object"),
            Self::MissingSection(path) => write!(f, "missing section '{path}'"),
            Self::MissingTier(tier) => write!(f, "missing tier '{tier}'"),
            Self::UnknownTier(key) => write!(f, "unknown tier '{key}'"),
            Self::MissingSetting { tier, field } => {
                write!(f, "tier '{tier}' is missing setting '{field}'")
            }
            Self::InvalidValue { path, expected } => {
                write!(f, "'{path}' must be {expected}")
            }
            Self::InvalidPhone(phone) => write!(f, "invalid phone number '{phone}'"),
            Self::BlankName => f.write_str("names must be non-empty strings"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a document.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

const BOOL_SETTINGS: [&str; 3] = ["open_and_read", "play_sound", "mark_as_read"];
const LIST_FIELDS: [&str; 3] = ["by_name", "by_phone", "by_keywords"];

/// Validate a ruleset document.
///
/// Checks that all three tiers are present (and no others), that every tier
/// has complete, well-typed settings, and that the default policy names a
/// real tier.
///
/// # Errors
///
/// Returns every problem found.
pub fn validate_ruleset(doc: &Value) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(root) = expect_object(Some(doc), "document", &mut errors) {
        match root.get("contact_tiers") {
            None => errors.push(ValidationError::MissingSection("contact_tiers".to_string())),
            Some(tiers) => validate_tiers(tiers, &mut errors),
        }

        if let Some(defaults) = root.get("default_settings") {
            validate_defaults(defaults, &mut errors);
        }
    }

    finish(errors)
}

fn validate_tiers(tiers: &Value, errors: &mut Vec<ValidationError>) {
    let Some(tiers) = expect_object(Some(tiers), "contact_tiers", errors) else {
        return;
    };

    errors.extend(
        tiers
            .keys()
            .filter(|key| Tier::parse(key).is_none())
            .map(|key| ValidationError::UnknownTier(key.clone())),
    );

    for tier in Tier::PRECEDENCE {
        match tiers.get(tier.as_str()) {
            None => errors.push(ValidationError::MissingTier(tier)),
            Some(rule) => validate_rule(tier, rule, errors),
        }
    }
}

fn validate_rule(tier: Tier, rule: &Value, errors: &mut Vec<ValidationError>) {
    let section = format!("contact_tiers.{tier}");
    let Some(rule) = expect_object(Some(rule), &section, errors) else {
        return;
    };

    for field in LIST_FIELDS {
        check_string_list(rule.get(field), &format!("{section}.{field}"), errors);
    }
    check_optional(
        rule.get("description"),
        &format!("{section}.description"),
        "a string",
        Value::is_string,
        errors,
    );

    let settings_path = format!("{section}.settings");
    let Some(settings) = rule.get("settings") else {
        errors.push(ValidationError::MissingSection(settings_path));
        return;
    };
    let Some(settings) = expect_object(Some(settings), &settings_path, errors) else {
        return;
    };

    for field in BOOL_SETTINGS {
        match settings.get(field) {
            None => errors.push(ValidationError::MissingSetting { tier, field }),
            Some(value) if !value.is_boolean() => errors.push(ValidationError::InvalidValue {
                path: format!("{settings_path}.{field}"),
                expected: "a boolean",
            }),
            Some(_) => {}
        }
    }

    check_enum_setting(
        tier,
        settings,
        "reply_mode",
        "one of informative_ai, template_basic, none",
        |s| ReplyMode::parse(s).is_some(),
        errors,
    );
    check_enum_setting(
        tier,
        settings,
        "priority_level",
        "one of high, medium, low",
        |s| PriorityLevel::parse(s).is_some(),
        errors,
    );
}

fn check_enum_setting(
    tier: Tier,
    settings: &Map<String, Value>,
    field: &'static str,
    expected: &'static str,
    known: impl Fn(&str) -> bool,
    errors: &mut Vec<ValidationError>,
) {
    match settings.get(field) {
        None => errors.push(ValidationError::MissingSetting { tier, field }),
        Some(value) if !value.as_str().is_some_and(&known) => {
            errors.push(ValidationError::InvalidValue {
                path: format!("contact_tiers.{tier}.settings.{field}"),
                expected,
            });
        }
        Some(_) => {}
    }
}

fn validate_defaults(defaults: &Value, errors: &mut Vec<ValidationError>) {
    let Some(defaults) = expect_object(Some(defaults), "default_settings", errors) else {
        return;
    };

    check_optional(
        defaults.get("uncategorized_contacts"),
        "default_settings.uncategorized_contacts",
        "one of main_contacts, time_pass_contacts, not_important",
        |v| v.as_str().and_then(Tier::parse).is_some(),
        errors,
    );
    check_optional(
        defaults.get("new_contact_behavior"),
        "default_settings.new_contact_behavior",
        "one of ask_user, use_default",
        |v| v.as_str().and_then(NewContactBehavior::parse).is_some(),
        errors,
    );
    check_optional(
        defaults.get("auto_categorize"),
        "default_settings.auto_categorize",
        "a boolean",
        Value::is_boolean,
        errors,
    );
}

/// Validate a template document.
///
/// Both sections are optional. Present sections must be keyed by tier and
/// hold only strings.
///
/// # Errors
///
/// Returns every problem found.
pub fn validate_templates(doc: &Value) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(root) = expect_object(Some(doc), "document", &mut errors) {
        if let Some(templates) = root.get("templates") {
            for_each_tier(templates, "templates", &mut errors, |tier, entries, errors| {
                let path = format!("templates.{tier}");
                let Some(entries) = expect_object(Some(entries), &path, errors) else {
                    return;
                };
                for (name, text) in entries {
                    check_optional(
                        Some(text),
                        &format!("{path}.{name}"),
                        "a string",
                        Value::is_string,
                        errors,
                    );
                }
            });
        }

        if let Some(prompts) = root.get("ai_prompts") {
            for_each_tier(prompts, "ai_prompts", &mut errors, |tier, prompt, errors| {
                check_optional(
                    Some(prompt),
                    &format!("ai_prompts.{tier}"),
                    "a string",
                    Value::is_string,
                    errors,
                );
            });
        }
    }

    finish(errors)
}

/// Validate a skip list document.
///
/// `skip_contacts` is required. Skipped phone numbers must be plausible phone
/// numbers and skipped names must not be blank.
///
/// # Errors
///
/// Returns every problem found.
pub fn validate_skip_list(doc: &Value) -> ValidationResult {
    let mut errors = Vec::new();

    let Some(root) = expect_object(Some(doc), "document", &mut errors) else {
        return finish(errors);
    };

    if let Some(contacts) = expect_object(root.get("skip_contacts"), "skip_contacts", &mut errors)
    {
        for field in LIST_FIELDS {
            check_string_list(
                contacts.get(field),
                &format!("skip_contacts.{field}"),
                &mut errors,
            );
        }

        let strings = |field: &str| {
            contacts
                .get(field)
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
        };
        errors.extend(
            strings("by_phone")
                .filter(|phone| !is_valid_phone(phone))
                .map(|phone| ValidationError::InvalidPhone(phone.to_string())),
        );
        if strings("by_name").any(|name| name.trim().is_empty()) {
            errors.push(ValidationError::BlankName);
        }
    }

    check_string_list(root.get("skip_groups"), "skip_groups", &mut errors);

    if let Some(conditions) = root.get("skip_conditions")
        && let Some(conditions) = expect_object(Some(conditions), "skip_conditions", &mut errors)
    {
        check_string_list(
            conditions.get("skip_if_contains"),
            "skip_conditions.skip_if_contains",
            &mut errors,
        );
        for field in ["skip_business_hours", "skip_weekends"] {
            check_optional(
                conditions.get(field),
                &format!("skip_conditions.{field}"),
                "a boolean",
                Value::is_boolean,
                &mut errors,
            );
        }
    }

    finish(errors)
}

/// Run `check` on every entry of a tier-keyed object, reporting unknown keys.
fn for_each_tier(
    section: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
    mut check: impl FnMut(Tier, &Value, &mut Vec<ValidationError>),
) {
    let Some(section) = expect_object(Some(section), path, errors) else {
        return;
    };

    for (key, value) in section {
        match Tier::parse(key) {
            Some(tier) => check(tier, value, errors),
            None => errors.push(ValidationError::UnknownTier(format!("{path}.{key}"))),
        }
    }
}

/// Require `value` to be an object, recording an error otherwise.
pub(crate) fn expect_object<'a>(
    value: Option<&'a Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a Map<String, Value>> {
    match value {
        None => {
            errors.push(ValidationError::MissingSection(path.to_string()));
            None
        }
        Some(value) => {
            let object = value.as_object();
            if object.is_none() {
                errors.push(ValidationError::NotAnObject(path.to_string()));
            }
            object
        }
    }
}

/// An absent list is fine; a present one must hold only strings.
pub(crate) fn check_string_list(
    value: Option<&Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    check_optional(
        value,
        path,
        "an array of strings",
        |v| v.as_array().is_some_and(|items| items.iter().all(Value::is_string)),
        errors,
    );
}

/// An absent value is fine; a present one must satisfy `valid`.
pub(crate) fn check_optional(
    value: Option<&Value>,
    path: &str,
    expected: &'static str,
    valid: impl Fn(&Value) -> bool,
    errors: &mut Vec<ValidationError>,
) {
    if value.is_some_and(|v| !valid(v)) {
        errors.push(ValidationError::InvalidValue {
            path: path.to_string(),
            expected,
        });
    }
}

pub(crate) fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tier::Ruleset;
    use serde_json::json;

    fn stock_document() -> Value {
        serde_json::to_value(Ruleset::default()).unwrap()
    }

    #[test]
    fn test_stock_ruleset_is_valid() {
        assert_eq!(validate_ruleset(&stock_document()), Ok(()));
    }

    #[test]
    fn test_minimal_ruleset_is_valid() {
        let settings = json!({
            "open_and_read": false,
            "play_sound": false,
            "reply_mode": "none",
            "mark_as_read": false,
            "priority_level": "low"
        });
        let doc = json!({
            "contact_tiers": {
                "main_contacts": { "settings": settings },
                "time_pass_contacts": { "settings": settings },
                "not_important": { "settings": settings }
            }
        });
        assert_eq!(validate_ruleset(&doc), Ok(()));
    }

    #[test]
    fn test_missing_contact_tiers() {
        let errors = validate_ruleset(&json!({})).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingSection("contact_tiers".to_string())]
        );
    }

    #[test]
    fn test_root_must_be_object() {
        let errors = validate_ruleset(&json!([1, 2])).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::NotAnObject("document".to_string())]
        );
    }

    #[test]
    fn test_reports_every_missing_tier() {
        let mut doc = stock_document();
        let tiers = doc["contact_tiers"].as_object_mut().unwrap();
        tiers.remove("main_contacts");
        tiers.remove("not_important");

        let errors = validate_ruleset(&doc).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingTier(Tier::Main)));
        assert!(errors.contains(&ValidationError::MissingTier(Tier::NotImportant)));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_unknown_tier_key() {
        let mut doc = stock_document();
        let main = doc["contact_tiers"]["main_contacts"].clone();
        doc["contact_tiers"]["vip"] = main;

        let errors = validate_ruleset(&doc).unwrap_err();
        assert_eq!(errors, vec![ValidationError::UnknownTier("vip".to_string())]);
    }

    #[test]
    fn test_non_boolean_setting() {
        let mut doc = stock_document();
        doc["contact_tiers"]["time_pass_contacts"]["settings"]["play_sound"] = json!("yes");

        let errors = validate_ruleset(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].field(),
            "contact_tiers.time_pass_contacts.settings.play_sound"
        );
    }

    #[test]
    fn test_missing_settings_fields() {
        let mut doc = stock_document();
        let settings = doc["contact_tiers"]["main_contacts"]["settings"]
            .as_object_mut()
            .unwrap();
        settings.remove("mark_as_read");
        settings.remove("reply_mode");

        let errors = validate_ruleset(&doc).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingSetting {
            tier: Tier::Main,
            field: "mark_as_read"
        }));
        assert!(errors.contains(&ValidationError::MissingSetting {
            tier: Tier::Main,
            field: "reply_mode"
        }));
    }

    #[test]
    fn test_missing_settings_object() {
        let mut doc = stock_document();
        doc["contact_tiers"]["main_contacts"]
            .as_object_mut()
            .unwrap()
            .remove("settings");

        let errors = validate_ruleset(&doc).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingSection(
                "contact_tiers.main_contacts.settings".to_string()
            )]
        );
    }

    #[test]
    fn test_unknown_reply_mode() {
        let mut doc = stock_document();
        doc["contact_tiers"]["main_contacts"]["settings"]["reply_mode"] = json!("shout");

        let errors = validate_ruleset(&doc).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "'contact_tiers.main_contacts.settings.reply_mode' must be one of informative_ai, template_basic, none"
        );
    }

    #[test]
    fn test_list_must_hold_strings() {
        let mut doc = stock_document();
        doc["contact_tiers"]["main_contacts"]["by_phone"] = json!([5_550_100]);

        let errors = validate_ruleset(&doc).unwrap_err();
        assert_eq!(errors[0].field(), "contact_tiers.main_contacts.by_phone");
    }

    #[test]
    fn test_invalid_default_tier() {
        let mut doc = stock_document();
        doc["default_settings"]["uncategorized_contacts"] = json!("strangers");

        let errors = validate_ruleset(&doc).unwrap_err();
        assert_eq!(
            errors[0].field(),
            "default_settings.uncategorized_contacts"
        );
    }

    #[test]
    fn test_templates_sections_are_optional() {
        assert_eq!(validate_templates(&json!({})), Ok(()));
        assert_eq!(
            validate_templates(&json!({
                "templates": {"main_contacts": {"default": "hi"}},
                "ai_prompts": {"not_important": ""}
            })),
            Ok(())
        );
    }

    #[test]
    fn test_templates_reject_unknown_tier_and_non_strings() {
        let errors = validate_templates(&json!({
            "templates": {"friends": {}, "main_contacts": {"default": 3}},
            "ai_prompts": {"time_pass_contacts": ["be brief"]}
        }))
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::UnknownTier("templates.friends".to_string())));
        assert!(errors.iter().any(|e| e.field() == "templates.main_contacts.default"));
        assert!(errors.iter().any(|e| e.field() == "ai_prompts.time_pass_contacts"));
    }

    #[test]
    fn test_skip_list_requires_contacts_section() {
        let errors = validate_skip_list(&json!({"skip_groups": []})).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingSection("skip_contacts".to_string())]
        );
    }

    #[test]
    fn test_skip_list_phone_and_name_checks() {
        let errors = validate_skip_list(&json!({
            "skip_contacts": {
                "by_name": ["Boss", "   "],
                "by_phone": ["+1 (555) 123-4567", "12", "call me"]
            }
        }))
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidPhone("12".to_string()),
                ValidationError::InvalidPhone("call me".to_string()),
                ValidationError::BlankName,
            ]
        );
    }

    #[test]
    fn test_skip_conditions_types() {
        let errors = validate_skip_list(&json!({
            "skip_contacts": {},
            "skip_conditions": {"skip_weekends": "sometimes"}
        }))
        .unwrap_err();
        assert_eq!(errors[0].field(), "skip_conditions.skip_weekends");
    }
}
