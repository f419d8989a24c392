//! Skip list file storage.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::model::SkipList;
use crate::persist::{Document, JsonFile};
use crate::validation::{ValidationResult, validate_skip_list};
use crate::{Error, Result};

impl Document for SkipList {
    const KIND: &'static str = "skip list";

    fn bootstrap() -> Self {
        Self::default()
    }

    fn validate(doc: &Value) -> ValidationResult {
        validate_skip_list(doc)
    }

    fn normalized(self) -> Self {
        Self::normalized(self)
    }
}

/// Storage for the skip list (`skip_list.json`).
#[derive(Debug, Clone)]
pub struct SkipListStore {
    file: JsonFile,
}

impl SkipListStore {
    /// Create a store for the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Path of the skip list file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Load the skip list, writing an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or is not JSON,
    /// and a validation error for invalid phone numbers, blank names or a
    /// missing `skip_contacts` section.
    pub async fn load(&self) -> Result<SkipList> {
        self.file.load().await
    }

    /// Validate and atomically replace the skip list file.
    ///
    /// Runs the same checks as [`load`](Self::load), so a list that would not
    /// load again is never written.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the list is invalid, and a configuration
    /// error if the file cannot be written.
    pub async fn save(&self, skip_list: &SkipList) -> Result<()> {
        let doc = serde_json::to_value(skip_list).map_err(|e| Error::json(self.path(), e))?;
        validate_skip_list(&doc).map_err(|errors| Error::Validation {
            path: self.path().to_path_buf(),
            errors,
        })?;
        self.file.save(skip_list).await
    }
}
