//! Template file storage.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::model::TemplateSet;
use crate::Result;
use crate::persist::{Document, JsonFile};
use crate::validation::{ValidationResult, validate_templates};

impl Document for TemplateSet {
    const KIND: &'static str = "templates";

    fn bootstrap() -> Self {
        Self::default()
    }

    fn validate(doc: &Value) -> ValidationResult {
        validate_templates(doc)
    }
}

/// Storage for message templates and AI prompts (`message_templates.json`).
#[derive(Debug, Clone)]
pub struct TemplateStore {
    file: JsonFile,
}

impl TemplateStore {
    /// Create a store for the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Path of the template file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Load the templates, writing the stock set if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or is not JSON,
    /// and a validation error if it is not shaped like a template document.
    pub async fn load(&self) -> Result<TemplateSet> {
        self.file.load().await
    }

    /// Atomically replace the template file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be written.
    pub async fn save(&self, templates: &TemplateSet) -> Result<()> {
        self.file.save(templates).await
    }
}
