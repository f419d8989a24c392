//! Per-tier message templates and AI prompts.
//!
//! Templates are curated by hand; the core only reads them. Lookups never
//! fail: a missing template falls back to the tier's `default` template and a
//! missing prompt to a generic one.

mod model;
mod store;

pub use model::{DEFAULT_TEMPLATE, FALLBACK_AI_PROMPT, TemplateSet};
pub use store::TemplateStore;
