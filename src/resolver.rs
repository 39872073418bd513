//! Live-window resolution for saved entries.
//!
//! The stored window id is only a cache: apps restart and hosts recycle
//! handles. Resolution therefore happens in two stages — an exact id scan,
//! then a heuristic re-match by app identity and path/title. Both take the
//! first satisfying window in host enumeration order; there is no scoring,
//! so ties between equally good candidates are resolved arbitrarily.

use crate::entry::WindowEntry;
use crate::host::{HostWindow, WindowHost, WindowId};

/// Exhaustive scan over all enumerable windows for an exact id match.
pub fn find_by_id(host: &dyn WindowHost, id: Option<WindowId>) -> Option<HostWindow> {
    let id = id?;
    host.all_windows().into_iter().find(|w| w.id == id)
}

/// Heuristic re-association of an entry with a live window of its app.
///
/// Windows with non-positive width or height are skipped (not yet rendered
/// or already destroyed). A window matches when the entry's stored path is a
/// substring of its current title, or its title starts with the entry's
/// stored title.
pub fn rematch(host: &dyn WindowHost, entry: &WindowEntry) -> Option<HostWindow> {
    let saved_path = entry.path_str().filter(|p| !p.is_empty());
    let saved_title = (!entry.title.is_empty()).then_some(entry.title.as_str());

    for window in host.windows_of(&entry.app) {
        if window.rect.width <= 0 || window.rect.height <= 0 {
            continue;
        }
        if let Some(path) = saved_path
            && window.title.contains(path)
        {
            return Some(window);
        }
        if let Some(title) = saved_title
            && window.title.starts_with(title)
        {
            return Some(window);
        }
    }
    None
}

/// Resolve an entry to a live window: exact id first, heuristic second.
///
/// Returns the window and whether it came from the heuristic path. Callers
/// that get a re-matched window must write the fresh id/title back to the
/// entry and persist, so later lookups take the cheap id path again.
pub fn resolve(host: &dyn WindowHost, entry: &WindowEntry) -> Option<(HostWindow, bool)> {
    if let Some(window) = find_by_id(host, entry.id) {
        return Some((window, false));
    }
    rematch(host, entry).map(|w| (w, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Rect;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct StaticHost {
        windows: Vec<HostWindow>,
        focused: Mutex<Option<WindowId>>,
    }

    impl StaticHost {
        fn new(windows: Vec<HostWindow>) -> Self {
            Self {
                windows,
                focused: Mutex::new(None),
            }
        }
    }

    impl WindowHost for StaticHost {
        fn all_windows(&self) -> Vec<HostWindow> {
            self.windows.clone()
        }
        fn focused_window(&self) -> Option<HostWindow> {
            let id = (*self.focused.lock().unwrap())?;
            self.windows.iter().find(|w| w.id == id).cloned()
        }
        fn focus(&self, id: WindowId) {
            *self.focused.lock().unwrap() = Some(id);
        }
        fn insert_text(&self, _text: &str) {}
        fn press_enter(&self) {}
    }

    fn win(id: WindowId, app: &str, title: &str) -> HostWindow {
        HostWindow {
            id,
            app: app.into(),
            title: title.into(),
            rect: Rect::sized(800, 600),
        }
    }

    #[test]
    fn find_by_id_matches_across_apps() {
        let host = StaticHost::new(vec![win(1, "kitty", "a"), win(2, "Code", "b")]);
        assert_eq!(find_by_id(&host, Some(2)).unwrap().app, "Code");
        assert!(find_by_id(&host, Some(9)).is_none());
        assert!(find_by_id(&host, None).is_none());
    }

    #[test]
    fn rematch_by_path_substring() {
        // Title neither equals nor starts with the stored title, but it
        // contains the stored path.
        let host = StaticHost::new(vec![win(5, "kitty", "proj — nvim")]);
        let mut entry = WindowEntry::new(99, "kitty", "user@host: /home/u/proj");
        entry.path = Some(PathBuf::from("proj"));
        let found = rematch(&host, &entry).unwrap();
        assert_eq!(found.id, 5);
    }

    #[test]
    fn rematch_by_title_prefix() {
        let host = StaticHost::new(vec![win(5, "kitty", "htop — session 2")]);
        let entry = WindowEntry::new(99, "kitty", "htop");
        assert_eq!(rematch(&host, &entry).unwrap().id, 5);
    }

    #[test]
    fn rematch_ignores_other_apps_and_degenerate_windows() {
        let mut zero = win(3, "kitty", "htop");
        zero.rect = Rect::default();
        let host = StaticHost::new(vec![win(1, "Alacritty", "htop"), zero]);
        let entry = WindowEntry::new(99, "kitty", "htop");
        assert!(rematch(&host, &entry).is_none());
    }

    #[test]
    fn rematch_first_candidate_wins() {
        let host = StaticHost::new(vec![win(1, "kitty", "htop a"), win(2, "kitty", "htop b")]);
        let entry = WindowEntry::new(99, "kitty", "htop");
        assert_eq!(rematch(&host, &entry).unwrap().id, 1);
    }

    #[test]
    fn resolve_prefers_exact_id() {
        let host = StaticHost::new(vec![win(1, "kitty", "htop a"), win(2, "kitty", "htop b")]);
        let entry = WindowEntry::new(2, "kitty", "htop");
        let (window, rematched) = resolve(&host, &entry).unwrap();
        assert_eq!(window.id, 2);
        assert!(!rematched);
    }

    #[test]
    fn resolve_falls_back_to_heuristic() {
        let host = StaticHost::new(vec![win(7, "kitty", "htop b")]);
        let entry = WindowEntry::new(2, "kitty", "htop");
        let (window, rematched) = resolve(&host, &entry).unwrap();
        assert_eq!(window.id, 7);
        assert!(rematched);
    }

    #[test]
    fn empty_stored_fields_never_match() {
        let host = StaticHost::new(vec![win(7, "kitty", "anything")]);
        let mut entry = WindowEntry::new(2, "kitty", "");
        entry.path = Some(PathBuf::from(""));
        assert!(rematch(&host, &entry).is_none());
    }
}
