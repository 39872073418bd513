//! Typed error types for the recall engine.
//!
//! Every operation resolves a failure to one of these variants instead of
//! panicking or propagating an opaque error past the crate boundary. The
//! `Display` text doubles as the short user-visible message the overlay
//! layer flashes, so each variant reads as something a user can act on.

use thiserror::Error;

/// Top-level error type for registry and session operations.
///
/// Covers the failure categories callers may want to distinguish:
/// - Name validation (reserved words, namespace collisions)
/// - Lookup misses (active map, archive)
/// - Window resolution failures
/// - Relaunch preconditions and adoption timeouts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecallError {
    // -----------------------------------------------------------------------
    // Name validation
    // -----------------------------------------------------------------------
    /// The requested name is on the configured block-list.
    #[error("\"{0}\" is a reserved word")]
    ReservedName(String),

    /// The spoken form is already the canonical name or an alias of another
    /// entry. Allowing it would make spoken-form resolution ambiguous.
    #[error("\"{spoken}\" already belongs to \"{owner}\"")]
    NameTaken {
        /// The spoken form that was rejected.
        spoken: String,
        /// Canonical name of the entry that owns it.
        owner: String,
    },

    // -----------------------------------------------------------------------
    // Lookup misses
    // -----------------------------------------------------------------------
    /// No active entry with this canonical name.
    #[error("no saved window named \"{0}\"")]
    NotFound(String),

    /// No archived entry with this name.
    #[error("\"{0}\" is not in the archive")]
    NotArchived(String),

    /// The spoken form is not an alias of any entry.
    #[error("\"{0}\" is not an alias")]
    NotAnAlias(String),

    // -----------------------------------------------------------------------
    // Window resolution
    // -----------------------------------------------------------------------
    /// Neither the stored id nor the heuristic re-match found a live window.
    #[error("\"{0}\" has no matching window")]
    WindowMissing(String),

    // -----------------------------------------------------------------------
    // Relaunch
    // -----------------------------------------------------------------------
    /// The entry's app is not something the launcher knows how to reopen
    /// at a directory.
    #[error("\"{name}\" has no terminal path to restore")]
    NotRelaunchable {
        /// Canonical name of the entry.
        name: String,
    },

    /// The entry has no saved working directory.
    #[error("\"{0}\" has no saved path")]
    NoSavedPath(String),

    /// The saved working directory no longer exists on disk.
    #[error("\"{name}\" path no longer exists: {path}")]
    PathGone {
        /// Canonical name of the entry.
        name: String,
        /// The stale directory, as stored.
        path: String,
    },

    /// The process was launched but no new window of the app appeared
    /// within the polling budget.
    #[error("\"{0}\" timed out waiting for window")]
    AdoptTimeout(String),
}
