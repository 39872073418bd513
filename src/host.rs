//! Host window capability interface.
//!
//! The engine never talks to an OS window system directly. Everything it
//! needs — enumerating windows of non-background applications, reading
//! id/title/rect, focusing, and typing into the focused window — goes
//! through the [`WindowHost`] trait so the core is testable against an
//! in-memory fake.

/// Opaque host window handle. Stable only for the lifetime of the window;
/// the registry treats stored ids as a volatile cache.
pub type WindowId = u64;

/// Window frame in screen coordinates.
///
/// Width/height may be non-positive for windows the host reports before
/// they are rendered (or after they are destroyed); the resolver skips those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a rect at the origin with the given size.
    pub fn sized(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// A live window as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostWindow {
    /// Host-assigned window handle.
    pub id: WindowId,
    /// Identity of the owning application (e.g. "kitty", "Code").
    pub app: String,
    /// Current title string.
    pub title: String,
    /// Current frame.
    pub rect: Rect,
}

/// Narrow capability interface over the host's window and input APIs.
///
/// Implementations enumerate only windows of non-background applications.
/// Focus and typing are fire-and-forget: the host gives no synchronous
/// success signal, so callers verify outcomes by re-enumerating.
pub trait WindowHost: Send + Sync {
    /// All enumerable windows across all applications.
    fn all_windows(&self) -> Vec<HostWindow>;

    /// Windows belonging to applications whose identity equals `app`.
    fn windows_of(&self, app: &str) -> Vec<HostWindow> {
        self.all_windows()
            .into_iter()
            .filter(|w| w.app == app)
            .collect()
    }

    /// The currently focused window, if any.
    fn focused_window(&self) -> Option<HostWindow>;

    /// Bring the window with this id to the foreground.
    fn focus(&self, id: WindowId);

    /// Type literal text into the focused window.
    fn insert_text(&self, text: &str);

    /// Press the Enter key in the focused window.
    fn press_enter(&self);
}
