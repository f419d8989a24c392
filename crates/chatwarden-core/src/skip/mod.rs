//! Contacts and groups that must never be auto-handled.
//!
//! The skip list is checked by the message handler before any tier behavior
//! applies. Contact and group membership is evaluated here; the message-level
//! [`SkipConditions`] are stored and handed out as-is.

mod model;
mod store;

pub use model::{SkipConditions, SkipContacts, SkipList};
pub use store::SkipListStore;
