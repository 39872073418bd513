//! The named-window registry.
//!
//! [`Registry`] owns the in-memory maps of active and archived entries plus
//! the persisted settings, and pushes every mutation through the injected
//! [`StateStore`] before returning to the caller. Identity operations
//! (save, forget, combine, promote, …) live in [`ops`].
//!
//! A persistence failure is logged and otherwise swallowed: in-memory state
//! is never rolled back, so memory and disk may diverge until the next
//! successful write.

pub mod ops;
pub mod storage;

pub use ops::SaveOutcome;
pub use storage::{JsonFileStore, MemoryStore, RegistryDoc, StateStore};

use crate::entry::{ArchivedEntry, Settings, WindowEntry};
use crate::host::{HostWindow, WindowId};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Where a spoken form lives in the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpokenOwner {
    /// The spoken form is an entry's canonical name.
    Canonical,
    /// The spoken form is one of an entry's aliases.
    Alias,
}

/// Owned registry of active and archived window entries.
pub struct Registry {
    active: BTreeMap<String, WindowEntry>,
    archive: BTreeMap<String, ArchivedEntry>,
    settings: Settings,
    store: Box<dyn StateStore>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("active", &self.active)
            .field("archive", &self.archive)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Load the registry from a store. A missing, empty, or malformed
    /// document degrades to an empty registry instead of failing startup.
    pub fn load(store: Box<dyn StateStore>) -> Self {
        let doc = match store.load() {
            Ok(Some(doc)) => doc,
            Ok(None) => RegistryDoc::default(),
            Err(e) => {
                log::error!("Error loading saved windows: {e:#}");
                RegistryDoc::default()
            }
        };
        Self {
            active: doc.active,
            archive: doc.archive,
            settings: doc.settings,
            store,
        }
    }

    /// Write the current state through the store, logging any failure.
    pub(crate) fn persist(&self) {
        let doc = RegistryDoc {
            active: self.active.clone(),
            archive: self.archive.clone(),
            settings: self.settings,
        };
        if let Err(e) = self.store.save(&doc) {
            log::error!("Error saving registry: {e:#}");
        }
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Active entries, keyed by canonical name.
    pub fn active(&self) -> &BTreeMap<String, WindowEntry> {
        &self.active
    }

    /// Archived entries, keyed by the name they had when active.
    pub fn archived(&self) -> &BTreeMap<String, ArchivedEntry> {
        &self.archive
    }

    /// Current global flags.
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// One active entry by canonical name.
    pub fn get(&self, name: &str) -> Option<&WindowEntry> {
        self.active.get(name)
    }

    /// Canonical name of the entry currently bound to this window id.
    pub fn name_for_window(&self, id: WindowId) -> Option<&str> {
        self.active
            .iter()
            .find(|(_, entry)| entry.id == Some(id))
            .map(|(name, _)| name.as_str())
    }

    /// Which entry owns a spoken form, canonical names and aliases both
    /// checked case-insensitively.
    pub fn owner_of_spoken(&self, spoken: &str) -> Option<(&str, SpokenOwner)> {
        let lowered = spoken.to_lowercase();
        for (name, entry) in &self.active {
            if name.to_lowercase() == lowered {
                return Some((name.as_str(), SpokenOwner::Canonical));
            }
            if entry.aliases.iter().any(|a| a.to_lowercase() == lowered) {
                return Some((name.as_str(), SpokenOwner::Alias));
            }
        }
        None
    }

    /// Build the spoken-form map `{spoken → canonical}` covering every
    /// canonical name and alias, for grammar regeneration.
    pub fn spoken_name_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for (name, entry) in &self.active {
            map.insert(name.clone(), name.clone());
            for alias in &entry.aliases {
                map.insert(alias.clone(), name.clone());
            }
        }
        map
    }

    // -----------------------------------------------------------------------
    // Targeted mutations (window lifecycle, not identity)
    // -----------------------------------------------------------------------

    /// Bind an entry to a live window, refreshing id and title.
    pub fn rebind(&mut self, name: &str, window: &HostWindow) {
        if let Some(entry) = self.active.get_mut(name) {
            entry.id = Some(window.id);
            entry.title = window.title.clone();
            self.persist();
        }
    }

    /// Record a freshly detected working directory, optionally together
    /// with the title it was parsed from.
    pub fn capture_path(&mut self, name: &str, path: PathBuf, title: Option<String>) {
        if let Some(entry) = self.active.get_mut(name) {
            let changed = entry.path.as_deref() != Some(path.as_path());
            if changed {
                entry.path = Some(path);
                if let Some(title) = title {
                    entry.title = title;
                }
                self.persist();
            }
        }
    }

    /// Clear the id of whichever entry is bound to a closed window.
    /// Returns the affected entry's name.
    pub fn clear_window(&mut self, id: WindowId) -> Option<String> {
        let name = self.name_for_window(id)?.to_string();
        if let Some(entry) = self.active.get_mut(&name) {
            entry.id = None;
        }
        self.persist();
        Some(name)
    }

    /// Flip the persistent-highlight flag, persisting the new state.
    pub fn toggle_persistent_highlight(&mut self) -> bool {
        self.settings.persistent_highlight = !self.settings.persistent_highlight;
        self.persist();
        self.settings.persistent_highlight
    }
}
