//! Engine configuration.
//!
//! Everything the host environment would normally supply — storage location,
//! the forbidden-word list, known terminal emulators, launch templates, the
//! named command table, and relaunch timing — collected in one place with
//! sensible defaults and builder-style overrides.

use crate::launch;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Application identities treated as terminal emulators for path detection
/// and relaunching.
pub const TERMINAL_APPS: &[&str] = &[
    "Gnome-terminal",
    "Mate-terminal",
    "kitty",
    "Alacritty",
    "foot",
    "xfce4-terminal",
    "Terminator",
    "Tilix",
    "Terminal",
    "iTerm2",
];

/// Application identities treated as path-bearing editors for relaunching.
pub const EDITOR_APPS: &[&str] = &["Code"];

/// Tunable settings for the recall engine.
#[derive(Debug, Clone)]
pub struct RecallConfig {
    /// Where the registry document lives on disk.
    pub storage_path: PathBuf,
    /// Words that may not be used as names or aliases (case-insensitive).
    pub forbidden_names: Vec<String>,
    /// Terminal-class application identities.
    pub terminal_apps: Vec<String>,
    /// Editor-class application identities (relaunchable when path-bearing).
    pub editor_apps: Vec<String>,
    /// App identity → launch command template with a `{path}` placeholder.
    pub launch_templates: HashMap<String, String>,
    /// Spoken command name → shell command.
    pub commands: HashMap<String, String>,
    /// Interval between window-adoption polls.
    pub poll_interval: Duration,
    /// Poll iterations allowed when reviving an archived entry (~2s).
    pub revive_poll_budget: u32,
    /// Poll iterations allowed when restoring an active entry (~4s).
    pub restore_poll_budget: u32,
    /// Delay between focusing a fresh window and typing into it.
    pub type_settle_delay: Duration,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            forbidden_names: Vec::new(),
            terminal_apps: TERMINAL_APPS.iter().map(|s| s.to_string()).collect(),
            editor_apps: EDITOR_APPS.iter().map(|s| s.to_string()).collect(),
            launch_templates: launch::default_templates(),
            commands: HashMap::new(),
            poll_interval: Duration::from_millis(100),
            revive_poll_budget: 20,
            restore_poll_budget: 40,
            type_settle_delay: Duration::from_millis(50),
        }
    }
}

/// Default registry document location: `<config dir>/winrecall/saved_windows.json`.
pub fn default_storage_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("winrecall")
        .join("saved_windows.json")
}

impl RecallConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the storage path.
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    /// Replace the forbidden-word list.
    pub fn with_forbidden_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the named command table.
    pub fn with_commands(mut self, commands: HashMap<String, String>) -> Self {
        self.commands = commands;
        self
    }

    /// Override relaunch polling (interval plus revive/restore budgets).
    pub fn with_polling(mut self, interval: Duration, revive: u32, restore: u32) -> Self {
        self.poll_interval = interval;
        self.revive_poll_budget = revive;
        self.restore_poll_budget = restore;
        self
    }

    /// Case-insensitive membership test against the forbidden-word list.
    pub fn is_forbidden(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.forbidden_names.iter().any(|f| f.to_lowercase() == lowered)
    }

    /// Whether an app identity is a known terminal emulator.
    pub fn is_terminal(&self, app: &str) -> bool {
        self.terminal_apps.iter().any(|t| t == app)
    }

    /// Whether an app identity is a path-bearing editor.
    pub fn is_editor(&self, app: &str) -> bool {
        self.editor_apps.iter().any(|e| e == app)
    }

    /// Whether an app can be relaunched at a directory at all.
    pub fn is_relaunchable(&self, app: &str) -> bool {
        self.is_terminal(app) || self.is_editor(app)
    }
}
