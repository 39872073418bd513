//! Shared integration test helpers for winrecall.
//!
//! Provides a scriptable window host, a recording launcher, and recording
//! overlay / spoken-form collaborators used across the `tests/` suite.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{window, FakeHost, RecordingOverlay};
//! ```
//!
//! The `#![allow(dead_code)]` suppresses warnings when only a subset of
//! helpers are used per file.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use winrecall::engine::{Overlay, SpokenForms};
use winrecall::launch::LaunchCommand;
use winrecall::{HostWindow, ProcessLauncher, Rect, WindowHost, WindowId};

/// Build a live-looking window with a non-degenerate frame.
pub fn window(id: WindowId, app: &str, title: &str) -> HostWindow {
    HostWindow {
        id,
        app: app.to_string(),
        title: title.to_string(),
        rect: Rect::sized(800, 600),
    }
}

/// Scriptable [`WindowHost`]. Windows can be present from the start or
/// scheduled to appear after a number of enumeration calls, which is how
/// tests exercise the relaunch-and-adopt poll loop. Focus and typing calls
/// are recorded for assertion.
#[derive(Default)]
pub struct FakeHost {
    windows: Mutex<Vec<HostWindow>>,
    /// `(enumeration count at which it appears, window)` pairs not yet visible.
    pending: Mutex<Vec<(u32, HostWindow)>>,
    focused: Mutex<Option<WindowId>>,
    enumerations: AtomicU32,
    pub focus_calls: Mutex<Vec<WindowId>>,
    pub typed: Mutex<Vec<String>>,
    pub enter_presses: AtomicU32,
}

impl FakeHost {
    pub fn new(windows: Vec<HostWindow>) -> Arc<Self> {
        Arc::new(Self {
            windows: Mutex::new(windows),
            ..Self::default()
        })
    }

    pub fn set_focused(&self, id: Option<WindowId>) {
        *self.focused.lock().unwrap() = id;
    }

    pub fn add_window(&self, window: HostWindow) {
        self.windows.lock().unwrap().push(window);
    }

    pub fn remove_window(&self, id: WindowId) {
        self.windows.lock().unwrap().retain(|w| w.id != id);
    }

    /// Make `window` visible only after `after` further enumeration calls.
    pub fn appear_later(&self, window: HostWindow, after: u32) {
        let n = self.enumerations.load(Ordering::SeqCst);
        self.pending.lock().unwrap().push((n + after, window));
    }
}

impl WindowHost for FakeHost {
    fn all_windows(&self) -> Vec<HostWindow> {
        let n = self.enumerations.fetch_add(1, Ordering::SeqCst) + 1;
        let mut windows = self.windows.lock().unwrap();
        let mut pending = self.pending.lock().unwrap();
        let mut i = 0;
        while i < pending.len() {
            if pending[i].0 <= n {
                windows.push(pending.remove(i).1);
            } else {
                i += 1;
            }
        }
        windows.clone()
    }

    fn focused_window(&self) -> Option<HostWindow> {
        let id = (*self.focused.lock().unwrap())?;
        self.windows.lock().unwrap().iter().find(|w| w.id == id).cloned()
    }

    fn focus(&self, id: WindowId) {
        self.focus_calls.lock().unwrap().push(id);
        *self.focused.lock().unwrap() = Some(id);
    }

    fn insert_text(&self, text: &str) {
        self.typed.lock().unwrap().push(text.to_string());
    }

    fn press_enter(&self) {
        self.enter_presses.fetch_add(1, Ordering::SeqCst);
    }
}

/// Launcher that records invocations instead of spawning processes.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    pub launched: Arc<Mutex<Vec<LaunchCommand>>>,
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, command: &LaunchCommand) {
        self.launched.lock().unwrap().push(command.clone());
    }
}

/// Overlay that records every call as a readable event string.
#[derive(Clone, Default)]
pub struct RecordingOverlay {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingOverlay {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events().iter().any(|e| e.contains(needle))
    }
}

impl Overlay for RecordingOverlay {
    fn flash(&self, message: &str) {
        self.push(format!("flash: {message}"));
    }

    fn flash_detail(&self, message: &str, subtitle: &str) {
        self.push(format!("flash: {message} | {subtitle}"));
    }

    fn highlight(&self, window: &HostWindow, name: &str) {
        self.push(format!("highlight: {name} @{}", window.id));
    }

    fn show_persistent_highlight(&self, window: &HostWindow, name: &str) {
        self.push(format!("border: {name} @{}", window.id));
    }

    fn clear_persistent_highlight(&self) {
        self.push("border-clear".to_string());
    }

    fn hide_persistent_highlight(&self) {
        self.push("border-off".to_string());
    }

    fn show_overlay(&self) {
        self.push("overlay".to_string());
    }

    fn show_prompt(&self, title: &str, subtitle: &str) {
        self.push(format!("prompt: {title} | {subtitle}"));
    }

    fn hide_prompt(&self) {
        self.push("prompt-hide".to_string());
    }

    fn hide_any(&self) {
        self.push("hide-any".to_string());
    }

    fn rebuild_canvas(&self) {
        self.push("canvas-rebuild".to_string());
    }
}

/// Spoken-form sink that keeps every rebuilt name map.
#[derive(Clone, Default)]
pub struct RecordingSpokenForms {
    pub rebuilds: Arc<Mutex<Vec<BTreeMap<String, String>>>>,
}

impl RecordingSpokenForms {
    pub fn latest(&self) -> BTreeMap<String, String> {
        self.rebuilds.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn rebuild_count(&self) -> usize {
        self.rebuilds.lock().unwrap().len()
    }
}

impl SpokenForms for RecordingSpokenForms {
    fn rebuild(&self, name_map: &BTreeMap<String, String>, _generate_subsequences: bool) {
        self.rebuilds.lock().unwrap().push(name_map.clone());
    }
}
