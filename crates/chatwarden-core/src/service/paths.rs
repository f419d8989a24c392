//! Locations of the configuration files.

use std::path::{Path, PathBuf};

/// Default file name of the tier ruleset.
pub const RULESET_FILE: &str = "contact_categories.json";
/// Default file name of the message templates.
pub const TEMPLATES_FILE: &str = "message_templates.json";
/// Default file name of the skip list.
pub const SKIP_LIST_FILE: &str = "skip_list.json";

/// Where [`ContactTierService`](super::ContactTierService) keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Tier ruleset.
    pub ruleset: PathBuf,
    /// Message templates and AI prompts.
    pub templates: PathBuf,
    /// Skip list.
    pub skip_list: PathBuf,
}

impl StorePaths {
    /// All three files under one directory, with their default names.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            ruleset: dir.join(RULESET_FILE),
            templates: dir.join(TEMPLATES_FILE),
            skip_list: dir.join(SKIP_LIST_FILE),
        }
    }
}
