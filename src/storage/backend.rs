//! Persistence backends
//!
//! The store never touches a filesystem directly; it talks to a
//! `DocumentStore`, which owns exactly one key-value slot holding the
//! JSON-encoded `PersistedDocument`.
//!
//! - `FileStore`: the slot is `<data_dir>/<storage_key>.json`
//! - `MemoryStore`: the slot is a string in memory (tests, embedding)

use crate::config::StorageConfig;
use crate::storage::error::StorageResult;
use crate::storage::types::PersistedDocument;
use std::path::{Path, PathBuf};

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "dosage-converter-storage";

/// A single durable slot for the persisted document
pub trait DocumentStore {
    /// Read the document
    ///
    /// Returns `Ok(None)` when nothing has been saved yet and
    /// `Err(StorageError::Corruption)` when the slot holds something that
    /// does not decode.
    fn load(&self) -> StorageResult<Option<PersistedDocument>>;

    /// Overwrite the slot with `doc`
    fn save(&mut self, doc: &PersistedDocument) -> StorageResult<()>;
}

/// File-backed slot
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Path to the document file
    path: PathBuf,
}

impl FileStore {
    /// Slot for `storage_key` inside `data_dir`
    pub fn new(data_dir: impl AsRef<Path>, storage_key: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.json", storage_key)),
        }
    }

    /// Slot described by the storage section of the config
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::at_path(config.document_path())
    }

    /// Slot at an explicit file path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the document file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> StorageResult<Option<PersistedDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let doc = PersistedDocument::from_json(&content)?;
        tracing::debug!(
            "Loaded document from {:?} ({} history entries)",
            self.path,
            doc.history.len()
        );
        Ok(Some(doc))
    }

    fn save(&mut self, doc: &PersistedDocument) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash leaves either the old or the new file
        let content = doc.to_json()?;
        let temp = self.temp_path();
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;

        tracing::debug!("Saved document to {:?}", self.path);
        Ok(())
    }
}

/// In-memory slot holding the raw JSON text
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Option<String>,
    save_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw text already in the slot (may be malformed)
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Some(payload.into()),
            save_count: 0,
        }
    }

    /// Start with an encoded document in the slot
    pub fn with_document(doc: &PersistedDocument) -> StorageResult<Self> {
        Ok(Self::with_payload(doc.to_json()?))
    }

    /// Raw slot contents
    pub fn payload(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> StorageResult<Option<PersistedDocument>> {
        self.slot
            .as_deref()
            .map(PersistedDocument::from_json)
            .transpose()
    }

    fn save(&mut self, doc: &PersistedDocument) -> StorageResult<()> {
        self.slot = Some(doc.to_json()?);
        self.save_count += 1;
        Ok(())
    }
}
