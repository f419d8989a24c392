//! # chatwarden-core
//!
//! Contact classification for the chat auto-responder.
//!
//! This crate provides:
//! - **Identity normalization** - comparable keys for names and phone numbers
//! - **Contact tiers** - a persisted, precedence-ordered ruleset that sorts
//!   contacts into `Main`, `Casual` and `NotImportant`
//! - **Templates** - per-tier canned replies and AI system prompts
//! - **Skip list** - contacts and groups that are never auto-handled
//! - **Resolution cache** - memoized lookups, retired on every ruleset change
//! - **Contact tier service** - the shared entry point for message handlers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
mod error;
pub mod identity;
mod persist;
pub mod service;
pub mod skip;
pub mod templates;
pub mod tier;
pub mod validation;

pub use cache::{ContactCache, ContactInfo};
pub use error::{Error, Result};
pub use identity::{CacheKey, Identity, normalize_keyword, normalize_name, normalize_phone};
pub use service::{ContactTierService, StorePaths};
pub use skip::{SkipList, SkipListStore};
pub use templates::{TemplateSet, TemplateStore};
pub use tier::{MatchReason, Resolution, Ruleset, RulesetStore, Tier, TierSettings, TierStats};
pub use validation::{ValidationError, ValidationResult};
