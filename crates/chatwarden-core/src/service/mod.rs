//! Contact tier service.
//!
//! [`ContactTierService`] ties the stores, the resolver and the cache together
//! behind the API message handlers use: classify a contact, ask what to do
//! with its messages, fetch a reply template, and curate the ruleset.

mod contacts;
mod paths;

pub use contacts::ContactTierService;
pub use paths::{RULESET_FILE, SKIP_LIST_FILE, StorePaths, TEMPLATES_FILE};
