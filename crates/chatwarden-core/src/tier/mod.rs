//! Contact tiers: the persisted ruleset and precedence resolution.
//!
//! This module provides:
//! - **Tiers**: three fixed priority classes, `Main` > `Casual` > `NotImportant`
//! - **Rules**: per-tier name, phone and keyword lists plus behavior settings
//! - **Resolution**: first-match-wins lookup in precedence order, with a
//!   configurable default tier for contacts nobody has classified
//! - **Storage**: a JSON ruleset file, bootstrapped on first run
//!
//! # Example
//!
//! ```ignore
//! use chatwarden_core::identity::Identity;
//! use chatwarden_core::tier::{RulesetStore, Tier};
//!
//! let ruleset = RulesetStore::new("data/contact_categories.json").load().await?;
//! let resolution = ruleset.resolve(&Identity::new("Alice", Some("+1 555 0100")));
//!
//! if resolution.tier == Tier::Main {
//!     // notify and answer with the informative prompt
//! }
//! ```

mod model;
mod resolver;
mod store;

pub use model::{
    DefaultPolicy, NewContactBehavior, PriorityLevel, ReplyMode, Ruleset, Tier, TierRule,
    TierRules, TierSettings, TierStats,
};
pub use resolver::{MatchReason, Resolution};
pub use store::RulesetStore;
