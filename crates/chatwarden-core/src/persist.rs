//! JSON file persistence shared by the configuration stores.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::validation::ValidationResult;
use crate::{Error, Result};

/// Suffix of the temp files a save writes before renaming into place.
const TMP_SUFFIX: &str = ".tmp";

/// Temp files older than this belong to a save that died before its rename.
/// Younger ones may still be in flight in another process.
const STALE_TMP_AGE: Duration = Duration::from_secs(10 * 60);

/// A configuration document stored as one JSON file.
pub(crate) trait Document: Serialize + DeserializeOwned {
    /// Short name used in log lines.
    const KIND: &'static str;

    /// Content written when the file does not exist yet.
    fn bootstrap() -> Self;

    /// Structural checks on the raw JSON, run before deserializing.
    fn validate(doc: &Value) -> ValidationResult;

    /// Canonicalize hand-edited content after loading.
    #[must_use]
    fn normalized(self) -> Self {
        self
    }
}

/// Location of a JSON document plus the load/save protocol.
#[derive(Debug, Clone)]
pub(crate) struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Read, validate and deserialize the document.
    ///
    /// A missing file is created from [`Document::bootstrap`].
    pub(crate) async fn load<T: Document>(&self) -> Result<T> {
        self.recover_interrupted_writes().await;

        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let doc = T::bootstrap();
                self.save(&doc).await?;
                info!(kind = T::KIND, path = %self.path.display(), "Created default configuration");
                return Ok(doc);
            }
            Err(e) => return Err(Error::io(&self.path, e)),
        };

        let value: Value =
            serde_json::from_str(&contents).map_err(|e| Error::json(&self.path, e))?;
        T::validate(&value).map_err(|errors| Error::Validation {
            path: self.path.clone(),
            errors,
        })?;
        let doc: T = serde_json::from_value(value).map_err(|e| Error::json(&self.path, e))?;

        debug!(kind = T::KIND, path = %self.path.display(), "Configuration loaded");
        Ok(doc.normalized())
    }

    /// Serialize and atomically replace the file.
    pub(crate) async fn save<T: Document>(&self, doc: &T) -> Result<()> {
        let contents = serde_json::to_string_pretty(doc).map_err(|e| Error::json(&self.path, e))?;
        self.write_atomic(contents.into_bytes()).await?;

        debug!(kind = T::KIND, path = %self.path.display(), "Configuration saved");
        Ok(())
    }

    async fn write_atomic(&self, contents: Vec<u8>) -> Result<()> {
        let path = self.path.clone();
        let tmp_prefix = self.tmp_prefix()?;

        tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &tmp_prefix, &contents))
            .await
            .map_err(|e| Error::io(&self.path, std::io::Error::other(e)))?
    }

    /// Remove temp files left behind by saves that crashed before the rename.
    ///
    /// The real file still holds the last committed content. Only temp files
    /// older than [`STALE_TMP_AGE`] are touched, so a save running in another
    /// process keeps its temp file.
    async fn recover_interrupted_writes(&self) {
        let Ok(prefix) = self.tmp_prefix() else {
            return;
        };
        let Ok(mut entries) = fs::read_dir(self.parent()).await else {
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let is_ours = name
                .to_str()
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(TMP_SUFFIX));
            if !is_ours || !is_stale(&entry).await {
                continue;
            }

            let tmp_path = entry.path();
            warn!(path = %tmp_path.display(), "Removing interrupted write");
            if let Err(e) = fs::remove_file(&tmp_path).await {
                warn!(path = %tmp_path.display(), error = %e, "Failed to remove temp file");
            }
        }
    }

    fn parent(&self) -> &Path {
        parent_dir(&self.path)
    }

    /// Temp files are hidden siblings named `.<file name>.<random>.tmp`.
    fn tmp_prefix(&self) -> Result<String> {
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::Config(format!(
                    "'{}' is not a usable file path",
                    self.path.display()
                ))
            })?;
        Ok(format!(".{file_name}."))
    }
}

/// Write to a uniquely named temp file in the target directory, flush it to
/// disk, then rename it over the target. Concurrent writers never share a
/// temp file; the last rename wins.
fn write_atomic_blocking(path: &Path, tmp_prefix: &str, contents: &[u8]) -> Result<()> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

    // Dropping the temp file on an early return deletes it.
    let mut tmp = tempfile::Builder::new()
        .prefix(tmp_prefix)
        .suffix(TMP_SUFFIX)
        .tempfile_in(parent)
        .map_err(|e| Error::io(path, e))?;
    tmp.write_all(contents).map_err(|e| Error::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(path, e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

async fn is_stale(entry: &fs::DirEntry) -> bool {
    entry
        .metadata()
        .await
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age >= STALE_TMP_AGE)
}
