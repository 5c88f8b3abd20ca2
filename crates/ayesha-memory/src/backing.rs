//! Backing media for the state store.
//!
//! A backing stores whole documents by name. The store always hands it the
//! complete serialized map, never a delta.

use ayesha_core::error::AyeshaError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Durable storage for named JSON documents.
pub trait Backing: Send + Sync {
    /// Read a document. `Ok(None)` when it has never been written.
    fn load(&self, name: &str) -> Result<Option<String>, AyeshaError>;

    /// Replace a document with `contents`.
    fn save(&self, name: &str, contents: &str) -> Result<(), AyeshaError>;
}

/// One `<name>.json` file per document inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileBacking {
    dir: PathBuf,
}

impl JsonFileBacking {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl Backing for JsonFileBacking {
    fn load(&self, name: &str) -> Result<Option<String>, AyeshaError> {
        let path = self.path_for(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AyeshaError::Memory(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn save(&self, name: &str, contents: &str) -> Result<(), AyeshaError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| AyeshaError::Memory(format!("failed to create data dir: {e}")))?;

        // Readers see either the old document or the new one, never a partial write.
        let path = self.path_for(name);
        let tmp = self.dir.join(format!("{name}.json.tmp"));
        std::fs::write(&tmp, contents)
            .map_err(|e| AyeshaError::Memory(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            AyeshaError::Memory(format!("failed to replace {}: {e}", path.display()))
        })?;
        Ok(())
    }
}

/// Process-local backing, for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryBacking {
    docs: Mutex<HashMap<String, String>>,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document before the store opens it.
    pub fn with_document(self, name: &str, contents: &str) -> Self {
        self.docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), contents.to_string());
        self
    }

    /// Last saved contents of `name`.
    pub fn document(&self, name: &str) -> Option<String> {
        self.docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl Backing for MemoryBacking {
    fn load(&self, name: &str) -> Result<Option<String>, AyeshaError> {
        Ok(self.document(name))
    }

    fn save(&self, name: &str, contents: &str) -> Result<(), AyeshaError> {
        self.docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), contents.to_string());
        Ok(())
    }
}
