//! Contact resolution cache.
//!
//! Resolving a contact scans every tier rule. Message handlers ask about the
//! same handful of contacts over and over, so resolutions are memoized here
//! until the ruleset changes.

mod model;
mod store;

pub use model::ContactInfo;
pub use store::ContactCache;
