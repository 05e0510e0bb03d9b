use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tagmark_logging::{tagmark_debug, tagmark_warn};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Key under which the tag record is stored.
pub const STORAGE_KEY: &str = "taggedUsers";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage directory missing or not writable: {0}")]
    Directory(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed storage file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Value stored under [`STORAGE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTags {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub last_update: Option<i64>,
}

impl StoredTags {
    /// Record stamped with the current time.
    pub fn now(tags: Vec<String>) -> Self {
        Self {
            tags,
            last_update: Some(chrono::Utc::now().timestamp_millis()),
        }
    }
}

/// Key-value collaborator holding the persisted tag list.
pub trait TagStorage: Send + Sync {
    /// Missing record reads as empty.
    fn load(&self) -> Result<StoredTags, PersistenceError>;
    fn save(&self, record: &StoredTags) -> Result<(), PersistenceError>;
}

/// JSON object of keys on disk, rewritten atomically on every save.
/// Keys other than [`STORAGE_KEY`] are preserved.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, serde_json::Value>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn writer(&self) -> Result<(AtomicFileWriter, String), PersistenceError> {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PersistenceError::Directory("storage path has no file name".into()))?
            .to_string();
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((AtomicFileWriter::new(dir), file_name))
    }
}

impl TagStorage for JsonFileStorage {
    fn load(&self) -> Result<StoredTags, PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_map()?;
        match map.remove(STORAGE_KEY) {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => {
                tagmark_debug!("no {} record in {}", STORAGE_KEY, self.path.display());
                Ok(StoredTags::default())
            }
        }
    }

    fn save(&self, record: &StoredTags) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(PersistenceError::Format(e)) => {
                tagmark_warn!(
                    "overwriting unreadable storage file {}: {}",
                    self.path.display(),
                    e
                );
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(STORAGE_KEY.to_string(), serde_json::to_value(record)?);
        let content = serde_json::to_string_pretty(&map)?;
        let (writer, file_name) = self.writer()?;
        writer.write(&file_name, &content)?;
        tagmark_debug!(
            "saved {} tags to {}",
            record.tags.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-process storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<Option<StoredTags>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            record: Mutex::new(Some(StoredTags {
                tags: tags.into_iter().map(Into::into).collect(),
                last_update: None,
            })),
        }
    }
}

impl TagStorage for MemoryStorage {
    fn load(&self) -> Result<StoredTags, PersistenceError> {
        let record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        Ok(record.clone().unwrap_or_default())
    }

    fn save(&self, record: &StoredTags) -> Result<(), PersistenceError> {
        let mut slot = self.record.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(record.clone());
        Ok(())
    }
}

/// Ensure a directory exists; create if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistenceError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistenceError::Directory(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistenceError::Directory("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistenceError::Directory(e.to_string()))?;
    }
    Ok(())
}

/// Writes `{dir}/{filename}` through a temp file and a rename.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistenceError> {
        ensure_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistenceError::Io(e.error))?;
        Ok(target)
    }
}
