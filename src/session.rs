//! Window adoption after a relaunch.
//!
//! There is no PID-to-window mapping to lean on — several supported terminal
//! emulators run every window out of one server process — so the only way to
//! correlate a launch with its window is to snapshot the app's window ids
//! beforehand and poll for a new id afterwards.
//!
//! The poll runs as its own task ([`WindowWaiter`]): a spawned thread ticks
//! at a fixed interval for a fixed iteration budget and delivers the first
//! unseen, positively-sized window over a channel. Callers may block on the
//! result, poll for it, or cancel the waiter outright.

use crate::host::{HostWindow, WindowHost, WindowId};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Snapshot the ids of all current windows of an app, for later diffing.
pub fn snapshot_window_ids(host: &dyn WindowHost, app: &str) -> HashSet<WindowId> {
    host.windows_of(app).iter().map(|w| w.id).collect()
}

/// Background poll task watching for a window that was not in the snapshot.
pub struct WindowWaiter {
    rx: Receiver<Option<HostWindow>>,
    cancel: Arc<AtomicBool>,
}

impl WindowWaiter {
    /// Spawn the poll task.
    ///
    /// Ticks every `interval` up to `budget` times; each tick re-enumerates
    /// `app`'s windows and adopts the first one whose id is not in `known`
    /// and whose width is positive. Exactly one message is always delivered:
    /// the adopted window, or `None` on budget exhaustion or cancellation.
    pub fn spawn(
        host: Arc<dyn WindowHost>,
        app: String,
        known: HashSet<WindowId>,
        interval: Duration,
        budget: u32,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancelled = Arc::clone(&cancel);

        std::thread::spawn(move || {
            for _ in 0..budget {
                if cancelled.load(Ordering::Relaxed) {
                    let _ = tx.send(None);
                    return;
                }
                std::thread::sleep(interval);
                let fresh = host
                    .windows_of(&app)
                    .into_iter()
                    .find(|w| !known.contains(&w.id) && w.rect.width > 0);
                if let Some(window) = fresh {
                    log::debug!("Adopted new {app} window {}", window.id);
                    let _ = tx.send(Some(window));
                    return;
                }
            }
            log::warn!("No new {app} window appeared within the poll budget");
            let _ = tx.send(None);
        });

        Self { rx, cancel }
    }

    /// Block until the waiter finishes, returning the adopted window if any.
    pub fn wait(self) -> Option<HostWindow> {
        match self.rx.recv() {
            Ok(result) => result,
            Err(RecvError) => None,
        }
    }

    /// Non-blocking check for a result. `None` means still polling.
    pub fn try_take(&self) -> Option<Option<HostWindow>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(None),
        }
    }

    /// Ask the poll task to stop at its next tick.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Focus a freshly adopted window and type a startup command into it,
/// prefixed with a `cd` when a working directory is known.
pub fn run_when_ready(
    host: &dyn WindowHost,
    window: &HostWindow,
    command: &str,
    path: Option<&str>,
    settle: Duration,
) {
    let full_cmd = match path {
        Some(path) => format!("cd {path} && {command}"),
        None => command.to_string(),
    };
    host.focus(window.id);
    std::thread::sleep(settle);
    host.insert_text(&full_cmd);
    host.press_enter();
}
