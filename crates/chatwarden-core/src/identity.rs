//! Contact identity normalization.
//!
//! Chat clients report the same contact with different casing, padding and
//! phone formatting. Everything that compares identities (rule matching, cache
//! keys, skip lists) goes through the functions here first.

use std::fmt;

/// Placeholder used in cache keys for contacts without a phone number.
pub const NO_PHONE: &str = "no_phone";

/// Canonicalize a contact name: trimmed and lower-cased.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Canonicalize a name keyword: lower-cased, padding kept.
///
/// Keywords match as substrings of a normalized name, so `" bot"` matches
/// `"the bot"` but not `"robot"`.
#[must_use]
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.to_lowercase()
}

/// Canonicalize a phone number.
///
/// Keeps ASCII digits only. If the input contained a `+` anywhere, the result
/// carries exactly one `+`, at the front. Input without any digit yields an
/// empty string (no phone).
///
/// ```
/// use chatwarden_core::identity::normalize_phone;
///
/// assert_eq!(normalize_phone("+1 (555) 123-4567"), "+15551234567");
/// assert_eq!(normalize_phone("555.123.4567"), "5551234567");
/// assert_eq!(normalize_phone("12+34"), "+1234");
/// ```
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    let mut has_plus = false;
    let digits: String = phone
        .chars()
        .filter(|c| {
            if *c == '+' {
                has_plus = true;
            }
            c.is_ascii_digit()
        })
        .collect();

    if digits.is_empty() {
        String::new()
    } else if has_plus {
        format!("+{digits}")
    } else {
        digits
    }
}

/// Check that a phone number looks like an international number.
///
/// Separators (whitespace, `-`, `(`, `)`, `.`) are ignored. The rest must be an
/// optional `+` followed by 7 to 15 digits, the first of which is not zero.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    (7..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0')
}

/// A normalized `(name, phone)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    name: String,
    phone: String,
}

impl Identity {
    /// Normalize a raw contact name and optional phone number.
    ///
    /// An empty phone is treated the same as no phone.
    #[must_use]
    pub fn new(name: &str, phone: Option<&str>) -> Self {
        Self {
            name: normalize_name(name),
            phone: phone.map(normalize_phone).unwrap_or_default(),
        }
    }

    /// The normalized name (may be empty).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized phone, or `None` when no usable phone was given.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        if self.phone.is_empty() {
            None
        } else {
            Some(&self.phone)
        }
    }

    /// Key under which resolutions of this identity are cached.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey(format!(
            "{}:{}",
            self.name,
            self.phone().unwrap_or(NO_PHONE)
        ))
    }
}

/// Cache key: `normalized_name:normalized_phone`, or `normalized_name:no_phone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
