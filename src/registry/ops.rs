//! Identity operations over the registry.
//!
//! Every operation is total and idempotent on repeated identical input, and
//! persists synchronously on success. The name+alias namespace is enforced
//! globally: any mutation that would hand the same spoken form to two
//! different entries is rejected with [`RecallError::NameTaken`] before any
//! state changes.
//!
//! Forbidden-word screening happens at the engine boundary; these methods
//! assume names have already passed it.

use super::{Registry, SpokenOwner};
use crate::entry::{ArchivedEntry, WindowEntry};
use crate::error::RecallError;
use crate::host::HostWindow;
use std::path::PathBuf;

/// What `save` actually did with the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A fresh or overwritten entry now exists under the name.
    Saved,
    /// The window was already registered; the name was folded in as an
    /// alias of the existing entry (its canonical name is carried here).
    AliasedTo(String),
}

/// Leading underscores are reserved for the document's own keys
/// (`_archive`, `_settings`); no spoken form may shadow them.
fn is_reserved(name: &str) -> bool {
    name.starts_with('_')
}

impl Registry {
    /// Save a live window under `name`.
    ///
    /// If the window is already registered under a different canonical name,
    /// `name` becomes an alias of that entry instead of a duplicate.
    /// Otherwise the entry is created or overwritten, preserving any aliases
    /// the name already had. A same-named archived entry is purged so the
    /// two namespaces never hold the same key.
    pub fn save(
        &mut self,
        name: &str,
        window: &HostWindow,
        path: Option<PathBuf>,
    ) -> Result<SaveOutcome, RecallError> {
        if is_reserved(name) {
            return Err(RecallError::ReservedName(name.to_string()));
        }
        let existing = self.name_for_window(window.id).map(str::to_string);

        if let Some(existing) = existing.filter(|existing| existing != name) {
            // Window already saved under another name: fold in as alias.
            if let Some((owner, _)) = self.owner_of_spoken(name)
                && owner != existing
            {
                return Err(RecallError::NameTaken {
                    spoken: name.to_string(),
                    owner: owner.to_string(),
                });
            }
            self.archive.remove(name);
            let entry = self.active.get_mut(&existing).expect("entry exists");
            if !entry.aliases.iter().any(|a| a == name) {
                entry.aliases.push(name.to_string());
                self.persist();
            }
            return Ok(SaveOutcome::AliasedTo(existing));
        }

        if let Some((owner, _)) = self.owner_of_spoken(name)
            && owner != name
        {
            return Err(RecallError::NameTaken {
                spoken: name.to_string(),
                owner: owner.to_string(),
            });
        }

        self.archive.remove(name);
        let aliases = self
            .active
            .get(name)
            .map(|e| e.aliases.clone())
            .unwrap_or_default();

        let mut entry = WindowEntry::new(window.id, window.app.clone(), window.title.clone());
        entry.path = path;
        entry.aliases = aliases;
        self.active.insert(name.to_string(), entry);
        self.persist();
        Ok(SaveOutcome::Saved)
    }

    /// Move an entry from active to archive, stamping the archival time.
    pub fn forget(&mut self, name: &str) -> Result<(), RecallError> {
        let entry = self
            .active
            .remove(name)
            .ok_or_else(|| RecallError::NotFound(name.to_string()))?;
        self.archive
            .insert(name.to_string(), ArchivedEntry::forget(entry));
        self.persist();
        Ok(())
    }

    /// Archive every active entry. Returns how many were archived.
    pub fn forget_all(&mut self) -> usize {
        let count = self.active.len();
        let drained = std::mem::take(&mut self.active);
        for (name, entry) in drained {
            self.archive.insert(name, ArchivedEntry::forget(entry));
        }
        self.persist();
        count
    }

    /// Permanently delete an archived entry.
    pub fn purge(&mut self, name: &str) -> Result<(), RecallError> {
        self.archive
            .remove(name)
            .ok_or_else(|| RecallError::NotArchived(name.to_string()))?;
        self.persist();
        Ok(())
    }

    /// Re-key an entry under a new canonical name.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<(), RecallError> {
        if is_reserved(new_name) {
            return Err(RecallError::ReservedName(new_name.to_string()));
        }
        if !self.active.contains_key(name) {
            return Err(RecallError::NotFound(name.to_string()));
        }
        if name == new_name {
            return Ok(());
        }
        if let Some((owner, _)) = self.owner_of_spoken(new_name)
            && owner != name
        {
            return Err(RecallError::NameTaken {
                spoken: new_name.to_string(),
                owner: owner.to_string(),
            });
        }
        let mut entry = self.active.remove(name).expect("checked above");
        // Renaming to one of the entry's own aliases: the spoken form moves
        // to the canonical slot, so drop it from the alias list.
        let lowered = new_name.to_lowercase();
        entry.aliases.retain(|a| a.to_lowercase() != lowered);
        self.active.insert(new_name.to_string(), entry);
        self.persist();
        Ok(())
    }

    /// Merge `secondary` into `primary`: the secondary name and its aliases
    /// become aliases of primary, primary inherits secondary's path when it
    /// had none, and the secondary entry is deleted.
    pub fn combine(&mut self, primary: &str, secondary: &str) -> Result<(), RecallError> {
        if primary == secondary {
            return Ok(());
        }
        if !self.active.contains_key(primary) {
            return Err(RecallError::NotFound(primary.to_string()));
        }
        let secondary_entry = self
            .active
            .remove(secondary)
            .ok_or_else(|| RecallError::NotFound(secondary.to_string()))?;

        let primary_entry = self.active.get_mut(primary).expect("checked above");
        if !primary_entry.aliases.iter().any(|a| a == secondary) {
            primary_entry.aliases.push(secondary.to_string());
        }
        for alias in secondary_entry.aliases {
            if alias != primary && !primary_entry.aliases.iter().any(|a| *a == alias) {
                primary_entry.aliases.push(alias);
            }
        }
        if primary_entry.path.is_none() && secondary_entry.path.is_some() {
            primary_entry.path = secondary_entry.path;
        }
        self.persist();
        log::info!("Combined: \"{secondary}\" is now an alias of \"{primary}\"");
        Ok(())
    }

    /// Promote an alias to canonical, demoting the old canonical name to an
    /// alias. Returns the previous canonical name, or `None` when the spoken
    /// form was already canonical (a no-op).
    pub fn promote(&mut self, spoken: &str) -> Result<Option<String>, RecallError> {
        let spoken = spoken.trim();
        let lowered = spoken.to_lowercase();

        let canonical = match self.owner_of_spoken(&lowered) {
            Some((_, SpokenOwner::Canonical)) => return Ok(None),
            Some((name, SpokenOwner::Alias)) => name.to_string(),
            None => return Err(RecallError::NotAnAlias(spoken.to_string())),
        };

        let mut entry = self.active.remove(&canonical).expect("owner exists");
        entry.aliases.retain(|a| a.to_lowercase() != lowered);
        entry.aliases.push(canonical.clone());
        // Case-preserved: the entry is re-keyed under the spoken form as given.
        self.active.insert(spoken.to_string(), entry);
        self.persist();
        log::info!("Promoted: \"{spoken}\" is now canonical (was alias of \"{canonical}\")");
        Ok(Some(canonical))
    }

    /// Add an alias to an entry. Returns `false` when the alias was already
    /// present on that entry.
    pub fn add_alias(&mut self, name: &str, alias: &str) -> Result<bool, RecallError> {
        if is_reserved(alias) {
            return Err(RecallError::ReservedName(alias.to_string()));
        }
        if !self.active.contains_key(name) {
            return Err(RecallError::NotFound(name.to_string()));
        }
        if let Some((owner, _)) = self.owner_of_spoken(alias) {
            if owner == name {
                return Ok(false);
            }
            return Err(RecallError::NameTaken {
                spoken: alias.to_string(),
                owner: owner.to_string(),
            });
        }
        let entry = self.active.get_mut(name).expect("checked above");
        entry.aliases.push(alias.to_string());
        self.persist();
        Ok(true)
    }

    /// Remove an alias from whichever entry owns it (case-insensitive).
    /// Returns the owning entry's canonical name.
    pub fn remove_alias(&mut self, alias: &str) -> Result<String, RecallError> {
        let lowered = alias.trim().to_lowercase();
        let owner = self
            .active
            .iter()
            .find(|(_, entry)| entry.aliases.iter().any(|a| a.to_lowercase() == lowered))
            .map(|(name, _)| name.clone())
            .ok_or_else(|| RecallError::NotAnAlias(alias.to_string()))?;
        let entry = self.active.get_mut(&owner).expect("found above");
        entry.aliases.retain(|a| a.to_lowercase() != lowered);
        self.persist();
        Ok(owner)
    }

    /// Detach an entry from its live window without forgetting it: the id is
    /// cleared, everything else stays.
    pub fn detach(&mut self, name: &str) -> Result<(), RecallError> {
        let entry = self
            .active
            .get_mut(name)
            .ok_or_else(|| RecallError::NotFound(name.to_string()))?;
        entry.id = None;
        self.persist();
        Ok(())
    }

    /// Flip the auto-assign flag. Returns the new state.
    pub fn toggle_auto_assign(&mut self, name: &str) -> Result<bool, RecallError> {
        let entry = self
            .active
            .get_mut(name)
            .ok_or_else(|| RecallError::NotFound(name.to_string()))?;
        entry.auto_assign = !entry.auto_assign;
        let enabled = entry.auto_assign;
        self.persist();
        Ok(enabled)
    }

    /// Attach a named startup command (stored by spoken name, resolved at
    /// use-time).
    pub fn set_command(&mut self, name: &str, command: &str) -> Result<(), RecallError> {
        let entry = self
            .active
            .get_mut(name)
            .ok_or_else(|| RecallError::NotFound(name.to_string()))?;
        entry.command = Some(command.to_string());
        self.persist();
        Ok(())
    }

    /// Remove the startup command from an entry.
    pub fn clear_command(&mut self, name: &str) -> Result<(), RecallError> {
        let entry = self
            .active
            .get_mut(name)
            .ok_or_else(|| RecallError::NotFound(name.to_string()))?;
        entry.command = None;
        self.persist();
        Ok(())
    }

    /// Move an archived entry back to active, bound to a freshly adopted
    /// window.
    pub fn adopt_archived(&mut self, name: &str, window: &HostWindow) -> Result<(), RecallError> {
        let archived = self
            .archive
            .remove(name)
            .ok_or_else(|| RecallError::NotArchived(name.to_string()))?;
        let mut entry = archived.entry;
        entry.id = Some(window.id);
        entry.title = window.title.clone();
        self.active.insert(name.to_string(), entry);
        self.persist();
        Ok(())
    }
}
