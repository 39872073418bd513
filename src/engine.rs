//! Command dispatch and event wiring.
//!
//! [`RecallEngine`] is the single entry point the voice layer talks to. It
//! owns the registry, the pending-command state, and the host/launcher
//! capabilities, and drives the two external collaborators — the overlay
//! (labels, highlights, prompts) and the spoken-form generator — through
//! narrow traits so the whole engine runs against fakes in tests.
//!
//! Mutations and event hooks all execute on the caller's thread and run to
//! completion before the next command is dispatched; only window adoption
//! during revive/restore waits on a background poll task.

use crate::config::RecallConfig;
use crate::entry::WindowEntry;
use crate::error::RecallError;
use crate::host::{HostWindow, WindowHost, WindowId};
use crate::launch::{launch_command, ProcessLauncher};
use crate::pending::{AliasStart, PendingAction, PendingCommand, PendingState};
use crate::registry::{Registry, SaveOutcome, StateStore};
use crate::session::{run_when_ready, snapshot_window_ids, WindowWaiter};
use crate::{commands, resolver, title_path};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Visual layer consumed by the engine. All methods default to no-ops so
/// headless embedders implement only what they render.
pub trait Overlay {
    /// Show a brief status message.
    fn flash(&self, message: &str) {
        let _ = message;
    }
    /// Show a brief status message with a secondary line.
    fn flash_detail(&self, message: &str, subtitle: &str) {
        let _ = subtitle;
        self.flash(message);
    }
    /// Briefly highlight a window with its name label.
    fn highlight(&self, window: &HostWindow, name: &str) {
        let _ = (window, name);
    }
    /// Move the persistent border to a window.
    fn show_persistent_highlight(&self, window: &HostWindow, name: &str) {
        let _ = (window, name);
    }
    /// Drop the persistent border from whatever it was tracking.
    fn clear_persistent_highlight(&self) {}
    /// Turn the persistent border off entirely.
    fn hide_persistent_highlight(&self) {}
    /// Show name labels over all saved windows.
    fn show_overlay(&self) {}
    /// Show a two-step command prompt.
    fn show_prompt(&self, title: &str, subtitle: &str) {
        let _ = (title, subtitle);
    }
    /// Dismiss the two-step command prompt.
    fn hide_prompt(&self) {}
    /// Dismiss whichever overlay is currently visible.
    fn hide_any(&self) {}
    /// Rebuild overlay surfaces after a monitor change.
    fn rebuild_canvas(&self) {}
}

/// Spoken-form grammar regeneration, invoked after every successful
/// mutation so recognition stays in sync with the registry.
pub trait SpokenForms {
    /// Rebuild the recognizable grammar from `{spoken → canonical}`.
    fn rebuild(&self, name_map: &BTreeMap<String, String>, generate_subsequences: bool);
}

/// Overlay that renders nothing.
#[derive(Debug, Default)]
pub struct NullOverlay;
impl Overlay for NullOverlay {}

/// Spoken-form sink that ignores rebuilds.
#[derive(Debug, Default)]
pub struct NullSpokenForms;
impl SpokenForms for NullSpokenForms {
    fn rebuild(&self, _name_map: &BTreeMap<String, String>, _generate_subsequences: bool) {}
}

/// The named-window registry and resolution engine.
pub struct RecallEngine {
    config: RecallConfig,
    registry: Registry,
    pending: PendingState,
    host: Arc<dyn WindowHost>,
    launcher: Box<dyn ProcessLauncher>,
    overlay: Box<dyn Overlay>,
    spoken: Box<dyn SpokenForms>,
}

impl RecallEngine {
    /// Load the registry and wire up the collaborators. The spoken-form
    /// grammar is rebuilt immediately, and the persistent highlight is
    /// re-activated if it was enabled before the last shutdown.
    pub fn new(
        config: RecallConfig,
        store: Box<dyn StateStore>,
        host: Arc<dyn WindowHost>,
        launcher: Box<dyn ProcessLauncher>,
        overlay: Box<dyn Overlay>,
        spoken: Box<dyn SpokenForms>,
    ) -> Self {
        let registry = Registry::load(store);
        let engine = Self {
            config,
            registry,
            pending: PendingState::new(),
            host,
            launcher,
            overlay,
            spoken,
        };
        engine.refresh_spoken_forms();
        if engine.registry.settings().persistent_highlight
            && let Some(window) = engine.host.focused_window()
            && let Some(name) = engine.registry.name_for_window(window.id)
        {
            engine.overlay.show_persistent_highlight(&window, name);
        }
        engine
    }

    /// Read-only registry access for the overlay layer.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Exact-id window lookup, exposed so the overlay can render labels
    /// without duplicating matching logic.
    pub fn find_window(&self, id: Option<WindowId>) -> Option<HostWindow> {
        resolver::find_by_id(self.host.as_ref(), id)
    }

    fn refresh_spoken_forms(&self) {
        self.spoken.rebuild(&self.registry.spoken_name_map(), true);
    }

    // -----------------------------------------------------------------------
    // Save / recall
    // -----------------------------------------------------------------------

    /// Save the currently focused window under `name`. If that window is
    /// already registered, the name is folded in as an alias instead.
    pub fn save_window(&mut self, name: &str) -> Result<(), RecallError> {
        if self.config.is_forbidden(name) {
            let err = RecallError::ReservedName(name.to_string());
            self.overlay.flash(&err.to_string());
            return Err(err);
        }
        let Some(window) = self.host.focused_window() else {
            log::warn!("Save requested with no focused window");
            return Ok(());
        };

        let path = self
            .config
            .is_terminal(&window.app)
            .then(|| title_path::resolve_path(&window.title))
            .flatten();

        match self.registry.save(name, &window, path) {
            Ok(SaveOutcome::Saved) => {
                self.refresh_spoken_forms();
                if self.registry.settings().persistent_highlight {
                    self.overlay.show_persistent_highlight(&window, name);
                } else {
                    self.overlay.highlight(&window, name);
                }
                Ok(())
            }
            Ok(SaveOutcome::AliasedTo(owner)) => {
                self.refresh_spoken_forms();
                self.overlay.flash(&format!("alias: {name} -> {owner}"));
                Ok(())
            }
            Err(err) => {
                self.overlay.flash(&err.to_string());
                Err(err)
            }
        }
    }

    /// Focus the saved window, re-matching and re-persisting its id when
    /// the stored one has gone stale.
    pub fn recall_window(&mut self, name: &str) -> Result<(), RecallError> {
        self.overlay.hide_any();
        let Some(entry) = self.registry.get(name).cloned() else {
            return Err(RecallError::NotFound(name.to_string()));
        };

        let Some((window, rematched)) = resolver::resolve(self.host.as_ref(), &entry) else {
            self.overlay.show_overlay();
            return Err(RecallError::WindowMissing(name.to_string()));
        };
        if rematched {
            self.registry.rebind(name, &window);
        }

        // Re-capture the terminal path while the title still shows one;
        // long-running programs often overwrite the title later.
        if self.config.is_terminal(&entry.app)
            && let Some(path) = title_path::resolve_path(&window.title)
        {
            self.registry.capture_path(name, path, None);
        }

        self.host.focus(window.id);
        if !self.registry.settings().persistent_highlight {
            self.overlay.highlight(&window, name);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Identity operations
    // -----------------------------------------------------------------------

    /// Clear an entry's window id without forgetting it.
    pub fn detach(&mut self, name: &str) -> Result<(), RecallError> {
        self.registry.detach(name)?;
        self.overlay.flash(&format!("{name}: detached"));
        Ok(())
    }

    /// Archive a saved window.
    pub fn forget(&mut self, name: &str) -> Result<(), RecallError> {
        self.registry.forget(name)?;
        self.refresh_spoken_forms();
        self.overlay.flash(&format!("forgot \"{name}\" (archived)"));
        if self.registry.settings().persistent_highlight {
            self.overlay.clear_persistent_highlight();
        }
        Ok(())
    }

    /// Archive every saved window.
    pub fn forget_all(&mut self) {
        let count = self.registry.forget_all();
        self.refresh_spoken_forms();
        self.overlay
            .flash(&format!("forgot all ({count} windows, archived)"));
    }

    /// Permanently delete an archived window.
    pub fn purge(&mut self, name: &str) -> Result<(), RecallError> {
        match self.registry.purge(name) {
            Ok(()) => {
                self.overlay.flash(&format!("purged \"{name}\" permanently"));
                Ok(())
            }
            Err(err) => {
                self.overlay.flash(&err.to_string());
                Err(err)
            }
        }
    }

    /// Rename a saved window.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<(), RecallError> {
        if self.config.is_forbidden(new_name) {
            let err = RecallError::ReservedName(new_name.to_string());
            self.overlay.flash(&err.to_string());
            return Err(err);
        }
        match self.registry.rename(name, new_name) {
            Ok(()) => {
                self.refresh_spoken_forms();
                self.overlay.flash(&format!("renamed: {name} -> {new_name}"));
                Ok(())
            }
            Err(err @ RecallError::NameTaken { .. }) => {
                self.overlay.flash(&err.to_string());
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Merge `secondary` into `primary` as an alias.
    pub fn combine(&mut self, primary: &str, secondary: &str) -> Result<(), RecallError> {
        if primary == secondary {
            return Ok(());
        }
        self.registry.combine(primary, secondary)?;
        self.refresh_spoken_forms();
        self.overlay.flash(&format!("combined: {secondary} -> {primary}"));
        Ok(())
    }

    /// Promote an alias to canonical, demoting the old name to an alias.
    pub fn promote(&mut self, spoken: &str) -> Result<(), RecallError> {
        if self.config.is_forbidden(spoken) {
            let err = RecallError::ReservedName(spoken.to_string());
            self.overlay.flash(&err.to_string());
            return Err(err);
        }
        match self.registry.promote(spoken) {
            Ok(Some(previous)) => {
                self.refresh_spoken_forms();
                self.overlay
                    .flash(&format!("promoted: {spoken} (was {previous})"));
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                log::info!("Promote: {err}");
                Err(err)
            }
        }
    }

    /// Add an alias spoken form to a saved window.
    pub fn add_alias(&mut self, name: &str, alias: &str) -> Result<(), RecallError> {
        if self.config.is_forbidden(alias) {
            let err = RecallError::ReservedName(alias.to_string());
            self.overlay.flash(&err.to_string());
            return Err(err);
        }
        match self.registry.add_alias(name, alias) {
            Ok(true) => {
                self.refresh_spoken_forms();
                self.overlay.flash(&format!("alias: {alias} -> {name}"));
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err @ RecallError::NameTaken { .. }) => {
                self.overlay.flash(&err.to_string());
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Remove an alias from whichever window owns it.
    pub fn remove_alias(&mut self, alias: &str) -> Result<(), RecallError> {
        match self.registry.remove_alias(alias) {
            Ok(owner) => {
                self.refresh_spoken_forms();
                self.overlay
                    .flash(&format!("removed alias: {alias} (was {owner})"));
                Ok(())
            }
            Err(err) => {
                self.overlay.flash(&err.to_string());
                Err(err)
            }
        }
    }

    /// Store the spoken name of the command to run when restoring.
    pub fn set_command(&mut self, name: &str, command_name: &str) -> Result<(), RecallError> {
        self.registry.set_command(name, command_name)?;
        let shell_cmd = commands::resolve_command(&self.config.commands, command_name);
        let path = self
            .registry
            .get(name)
            .and_then(WindowEntry::path_str)
            .unwrap_or("~")
            .to_string();
        self.overlay.flash_detail(
            &format!("{name}: command = {command_name}"),
            &format!("cd {path} && {shell_cmd}"),
        );
        Ok(())
    }

    /// Remove the stored startup command.
    pub fn clear_command(&mut self, name: &str) -> Result<(), RecallError> {
        self.registry.clear_command(name)?;
        self.overlay.flash(&format!("{name}: command cleared"));
        Ok(())
    }

    /// Toggle automatic re-binding to new windows of the entry's app.
    pub fn toggle_auto_assign(&mut self, name: &str) -> Result<(), RecallError> {
        let enabled = self.registry.toggle_auto_assign(name)?;
        let state = if enabled { "ON" } else { "OFF" };
        self.overlay.flash(&format!("{name}: auto-assign {state}"));
        Ok(())
    }

    /// Toggle the persistent highlight border.
    pub fn toggle_persistent_highlight(&mut self) {
        if self.registry.toggle_persistent_highlight() {
            if let Some(window) = self.host.focused_window()
                && let Some(name) = self.registry.name_for_window(window.id)
            {
                let name = name.to_string();
                self.overlay.show_persistent_highlight(&window, &name);
            }
            self.overlay.flash("recall border: ON");
        } else {
            self.overlay.hide_persistent_highlight();
            self.overlay.flash("recall border: OFF");
        }
    }

    /// Archived names, flashed for the user and returned for the overlay.
    pub fn list_archive(&self) -> Vec<String> {
        let names: Vec<String> = self.registry.archived().keys().cloned().collect();
        if names.is_empty() {
            self.overlay.flash("archive is empty");
        } else {
            self.overlay.flash(&format!("archive: {}", names.join(", ")));
        }
        names
    }

    // -----------------------------------------------------------------------
    // Relaunch
    // -----------------------------------------------------------------------

    /// Relaunch an archived entry's app at its saved path and re-register
    /// the entry as active, bound to the adopted window.
    pub fn revive(&mut self, name: &str) -> Result<(), RecallError> {
        let Some(archived) = self.registry.archived().get(name) else {
            let err = RecallError::NotArchived(name.to_string());
            self.overlay.flash(&err.to_string());
            return Err(err);
        };
        let entry = archived.entry.clone();

        let path = match self.check_relaunchable(name, &entry) {
            Ok(path) => path,
            Err(err) => {
                self.overlay.flash(&err.to_string());
                return Err(err);
            }
        };

        match self.launch_and_adopt(&entry, &path, self.config.revive_poll_budget) {
            Some(window) => {
                self.registry.adopt_archived(name, &window)?;
                self.refresh_spoken_forms();
                self.host.focus(window.id);
                if !self.registry.settings().persistent_highlight {
                    self.overlay.highlight(&window, name);
                }
                self.run_startup_command(&entry, &window);
                Ok(())
            }
            None => {
                let err = RecallError::AdoptTimeout(name.to_string());
                self.overlay.flash(&err.to_string());
                Err(err)
            }
        }
    }

    /// Relaunch an active entry whose window is gone. Entries that cannot
    /// be relaunched (wrong app class, no path, stale path) fall back to a
    /// plain recall attempt.
    pub fn restore(&mut self, name: &str) -> Result<(), RecallError> {
        let Some(entry) = self.registry.get(name).cloned() else {
            return Err(RecallError::NotFound(name.to_string()));
        };

        let path = match self.check_relaunchable(name, &entry) {
            Ok(path) => path,
            Err(err) => {
                log::info!("Restore: {err}, falling back to recall");
                return self.recall_window(name);
            }
        };

        match self.launch_and_adopt(&entry, &path, self.config.restore_poll_budget) {
            Some(window) => {
                self.registry.rebind(name, &window);
                self.host.focus(window.id);
                self.run_startup_command(&entry, &window);
                Ok(())
            }
            None => {
                let err = RecallError::AdoptTimeout(name.to_string());
                log::warn!("Restore: {err}");
                Err(err)
            }
        }
    }

    /// Fail fast when an entry cannot be relaunched at a directory,
    /// returning the validated path when it can.
    fn check_relaunchable(
        &self,
        name: &str,
        entry: &WindowEntry,
    ) -> Result<std::path::PathBuf, RecallError> {
        if !self.config.is_relaunchable(&entry.app) {
            return Err(RecallError::NotRelaunchable {
                name: name.to_string(),
            });
        }
        let Some(path) = entry.path.clone() else {
            return Err(RecallError::NoSavedPath(name.to_string()));
        };
        if !path.is_dir() {
            return Err(RecallError::PathGone {
                name: name.to_string(),
                path: path.display().to_string(),
            });
        }
        Ok(path)
    }

    /// Snapshot, launch, and wait for a window that was not there before.
    fn launch_and_adopt(
        &self,
        entry: &WindowEntry,
        path: &std::path::Path,
        budget: u32,
    ) -> Option<HostWindow> {
        let known = snapshot_window_ids(self.host.as_ref(), &entry.app);
        self.launcher
            .launch(&launch_command(&self.config.launch_templates, &entry.app, path));
        WindowWaiter::spawn(
            Arc::clone(&self.host),
            entry.app.clone(),
            known,
            self.config.poll_interval,
            budget,
        )
        .wait()
    }

    /// Resolve and type the stored startup command into a fresh window.
    fn run_startup_command(&self, entry: &WindowEntry, window: &HostWindow) {
        let Some(command_name) = entry.command.as_deref() else {
            return;
        };
        let shell_cmd = commands::resolve_command(&self.config.commands, command_name);
        run_when_ready(
            self.host.as_ref(),
            window,
            &shell_cmd,
            entry.path_str(),
            self.config.type_settle_delay,
        );
    }

    // -----------------------------------------------------------------------
    // Two-step commands
    // -----------------------------------------------------------------------

    /// Begin two-step combine: prompt for the name to merge into `primary`.
    pub fn start_combine(&mut self, primary: &str) {
        if !self.registry.active().contains_key(primary) {
            return;
        }
        self.pending.start_combine(primary);
        self.overlay.show_prompt(
            &format!("Combine with \"{primary}\""),
            "Say the name to merge as an alias...",
        );
    }

    /// Begin two-step rename: prompt for the new name.
    pub fn start_rename(&mut self, name: &str) {
        if !self.registry.active().contains_key(name) {
            return;
        }
        self.pending.start_rename(name);
        self.overlay
            .show_prompt(&format!("Rename \"{name}\""), "Say the new name...");
    }

    /// Begin two-step alias: prompt for the alias. If an alias prompt is
    /// already up, `name` completes it instead.
    pub fn start_alias(&mut self, name: &str) {
        if matches!(self.pending.current(), PendingCommand::Alias(_)) {
            if let AliasStart::Completed(action) = self.pending.start_alias(name) {
                self.overlay.hide_prompt();
                self.dispatch_pending(action);
            }
            return;
        }
        if !self.registry.active().contains_key(name) {
            log::info!("Alias start: \"{name}\" is not a saved window");
            return;
        }
        self.pending.start_alias(name);
        self.overlay
            .show_prompt(&format!("Add alias for \"{name}\""), "Say the alias...");
    }

    /// Complete whichever two-step command is pending. The prompt is always
    /// dismissed and the pending state always cleared, whatever the input.
    pub fn finish_pending<I, S>(&mut self, spoken: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let action = self.pending.finish(spoken);
        self.overlay.hide_prompt();
        if let Some(action) = action {
            self.dispatch_pending(action);
        }
    }

    /// Cancel any pending two-step command and dismiss visible overlays.
    pub fn hide_overlay(&mut self) {
        self.pending.cancel();
        self.overlay.hide_any();
    }

    fn dispatch_pending(&mut self, action: PendingAction) {
        let result = match action {
            PendingAction::Combine { primary, secondary } => self.combine(&primary, &secondary),
            PendingAction::Rename { name, new_name } => self.rename(&name, &new_name),
            PendingAction::AddAlias { name, alias } => self.add_alias(&name, &alias),
        };
        if let Err(err) = result {
            log::info!("Pending command failed: {err}");
        }
    }

    // -----------------------------------------------------------------------
    // Host event hooks
    // -----------------------------------------------------------------------

    /// Focus change: run auto-assign, then track the persistent highlight.
    pub fn on_focus_changed(&mut self, window: &HostWindow) {
        self.try_auto_assign(window);
        if !self.registry.settings().persistent_highlight {
            return;
        }
        match self.registry.name_for_window(window.id) {
            Some(name) => {
                let name = name.to_string();
                self.overlay.show_persistent_highlight(window, &name);
            }
            None => self.overlay.clear_persistent_highlight(),
        }
    }

    /// Re-bind the first auto-assign entry of this app whose stored window
    /// is unset or no longer alive.
    fn try_auto_assign(&mut self, window: &HostWindow) {
        let candidate = self
            .registry
            .active()
            .iter()
            .find(|(_, entry)| {
                entry.auto_assign
                    && entry.app == window.app
                    && resolver::find_by_id(self.host.as_ref(), entry.id).is_none()
            })
            .map(|(name, _)| name.clone());
        if let Some(name) = candidate {
            log::info!("Auto-assign: binding \"{name}\" to window {}", window.id);
            self.registry.rebind(&name, window);
        }
    }

    /// Title change: capture the working directory while the title shows
    /// one, before other programs overwrite it.
    pub fn on_title_changed(&mut self, window: &HostWindow) {
        let Some(name) = self.registry.name_for_window(window.id) else {
            return;
        };
        let name = name.to_string();
        if let Some(path) = title_path::resolve_path(&window.title) {
            self.registry
                .capture_path(&name, path, Some(window.title.clone()));
        }
    }

    /// Window close: clear the entry's id but keep the entry, so a later
    /// restore can relaunch it.
    pub fn on_window_closed(&mut self, id: WindowId) {
        if self.registry.clear_window(id).is_some()
            && self.registry.settings().persistent_highlight
        {
            self.overlay.clear_persistent_highlight();
        }
    }

    /// Monitor layout change: overlay surfaces need rebuilding.
    pub fn on_screen_changed(&self) {
        self.overlay.rebuild_canvas();
    }
}
