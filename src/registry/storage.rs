//! Registry persistence.
//!
//! The durable form is a single JSON document: top-level keys are active
//! entries, with the archive and settings tucked under the reserved
//! `_archive` and `_settings` keys. The whole document is read once at
//! startup and rewritten in full on every mutation — last writer wins.

use crate::entry::{ArchivedEntry, Settings, WindowEntry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

/// The persisted document. `BTreeMap`s keep the on-disk key order stable
/// across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDoc {
    /// Forgotten entries, keyed by the name they had when active.
    #[serde(
        rename = "_archive",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub archive: BTreeMap<String, ArchivedEntry>,

    /// Global flags, omitted while everything is default.
    #[serde(
        rename = "_settings",
        default,
        skip_serializing_if = "Settings::is_default"
    )]
    pub settings: Settings,

    /// Active entries. Flattened so each canonical name is a top-level key.
    #[serde(flatten)]
    pub active: BTreeMap<String, WindowEntry>,
}

/// Persistence collaborator for the registry.
///
/// `load` distinguishes "nothing stored yet" (`Ok(None)`) from a real
/// failure; the registry treats both a failure and a malformed document as
/// an empty starting state rather than refusing to start.
pub trait StateStore {
    /// Read the stored document, if any.
    fn load(&self) -> Result<Option<RegistryDoc>>;
    /// Replace the stored document.
    fn save(&self, doc: &RegistryDoc) -> Result<()>;
}

/// File-backed store writing pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<RegistryDoc>> {
        if !self.path.exists() {
            log::info!("No registry file at {:?}, starting empty", self.path);
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read registry from {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let doc: RegistryDoc = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse registry from {:?}", self.path))?;
        log::info!(
            "Loaded {} active and {} archived entries from {:?}",
            doc.active.len(),
            doc.archive.len(),
            self.path
        );
        Ok(Some(doc))
    }

    fn save(&self, doc: &RegistryDoc) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let contents =
            serde_json::to_string_pretty(doc).context("Failed to serialize registry")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write registry to {:?}", self.path))?;
        log::debug!(
            "Saved {} active and {} archived entries to {:?}",
            doc.active.len(),
            doc.archive.len(),
            self.path
        );
        Ok(())
    }
}

/// In-memory store for embedding and tests. Clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    doc: Option<RegistryDoc>,
    saves: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a document.
    pub fn seeded(doc: RegistryDoc) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().doc = Some(doc);
        store
    }

    /// The last saved document, if any.
    pub fn saved_doc(&self) -> Option<RegistryDoc> {
        self.inner.borrow().doc.clone()
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.inner.borrow().saves
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<RegistryDoc>> {
        Ok(self.inner.borrow().doc.clone())
    }

    fn save(&self, doc: &RegistryDoc) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.doc = Some(doc.clone());
        inner.saves += 1;
        Ok(())
    }
}
