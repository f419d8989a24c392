//! Cache data models.

use chrono::{DateTime, Utc};

use crate::identity::Identity;
use crate::tier::{MatchReason, Resolution, Tier, TierSettings};

/// A resolved contact, as handed out to message handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    /// Normalized contact name.
    pub name: String,
    /// Normalized phone number, if any.
    pub phone: Option<String>,
    /// Resolved tier.
    pub tier: Tier,
    /// Settings of the resolved tier.
    pub settings: TierSettings,
    /// The rule that matched, `None` when the default tier was applied.
    pub matched_by: Option<MatchReason>,
    /// When the contact was resolved.
    pub resolved_at: DateTime<Utc>,
}

impl ContactInfo {
    pub(crate) fn new(identity: &Identity, resolution: Resolution) -> Self {
        Self {
            name: identity.name().to_string(),
            phone: identity.phone().map(str::to_string),
            tier: resolution.tier,
            settings: resolution.settings,
            matched_by: resolution.matched_by,
            resolved_at: Utc::now(),
        }
    }

    /// Whether no rule matched and the default tier was applied.
    #[must_use]
    pub const fn is_uncategorized(&self) -> bool {
        self.matched_by.is_none()
    }
}
