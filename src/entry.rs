//! Registry data model.
//!
//! Entries are keyed by canonical name in the registry maps, so the structs
//! here hold everything *except* the name. Field shapes mirror the persisted
//! JSON document: `id` is an `int|null` volatile cache, `path` a nullable
//! directory string, `aliases` an ordered list of alternate spoken names.

use crate::host::WindowId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One active named window record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    /// Live window handle, or `None` when no known window exists. Stale ids
    /// are expected and re-validated before every use.
    pub id: Option<WindowId>,
    /// Identity of the owning application.
    pub app: String,
    /// Last observed window title.
    #[serde(default)]
    pub title: String,
    /// Working directory associated with the window (terminal cwd or editor
    /// workspace), if one was ever detected.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Alternate spoken names. Never contains the entry's own canonical name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Spoken name of a startup command, resolved at use-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// When set, focus events may silently re-bind this entry to a new
    /// window of the same app once its id is unset or stale.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_assign: bool,
}

impl WindowEntry {
    /// Create a minimal entry for a live window.
    pub fn new(id: WindowId, app: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            app: app.into(),
            title: title.into(),
            path: None,
            aliases: Vec::new(),
            command: None,
            auto_assign: false,
        }
    }

    /// The stored path as a UTF-8 string, when it is one.
    pub fn path_str(&self) -> Option<&str> {
        self.path.as_deref().and_then(|p| p.to_str())
    }
}

/// A forgotten entry, preserved verbatim plus the archival timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedEntry {
    /// The entry as it was when forgotten (`id` cleared on archival).
    #[serde(flatten)]
    pub entry: WindowEntry,
    /// Seconds since the Unix epoch at archival time.
    pub forgotten_at: f64,
}

impl ArchivedEntry {
    /// Archive an entry now, clearing its volatile window id.
    pub fn forget(mut entry: WindowEntry) -> Self {
        entry.id = None;
        Self {
            entry,
            forgotten_at: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        }
    }
}

/// Small global flag set persisted alongside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Whether the persistent highlight border follows the focused window.
    #[serde(default)]
    pub persistent_highlight: bool,
}

impl Settings {
    /// True when every flag still has its default value (such a settings
    /// block is omitted from the persisted document).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
