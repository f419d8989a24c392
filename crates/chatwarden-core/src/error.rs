//! Error types for the core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration file could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File the operation was working on.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON, or could not be serialized.
    #[error("Serialization error in {}: {source}", .path.display())]
    Json {
        /// File the operation was working on.
        path: PathBuf,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },

    /// A configuration file is valid JSON but structurally invalid.
    #[error("Invalid {}: {}", .path.display(), join_errors(.errors))]
    Validation {
        /// File that failed validation.
        path: PathBuf,
        /// Every problem found in the document.
        errors: Vec<ValidationError>,
    },
}

impl Error {
    /// Returns `true` for malformed, missing or unwritable configuration.
    ///
    /// Structural validation failures are reported separately, see
    /// [`Error::validation_errors`].
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Io { .. } | Self::Json { .. })
    }

    /// Returns the validation problems if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
