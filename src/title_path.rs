//! Terminal title → working directory parsing.
//!
//! Terminal emulators encode the shell's cwd in the window title in a few
//! loosely standard shapes. This module extracts it with an ordered fallback
//! chain, most specific first:
//!
//! 1. The classic prompt shape `user@host: /path` — least likely to
//!    false-positive, so it always wins when present.
//! 2. Title segments split on em dash / pipe separators that start with
//!    `/` or `~`.
//! 3. Any whitespace token that starts with `/` or `~`.
//!
//! Every candidate is `~`-expanded and must exist as a directory before it
//! is accepted. A title with no verifiable path yields `None`; parsing never
//! fails louder than that.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Matches `<anything>@<anything>:<whitespace><rest>` and captures `<rest>`.
fn at_host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@[^:]*:\s*(.+)$").expect("valid regex"))
}

/// Splits titles on em dash and pipe separators with surrounding whitespace.
fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*[—|]\s*").expect("valid regex"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

/// Extract a verified working directory from a terminal title.
pub fn resolve_path(title: &str) -> Option<PathBuf> {
    resolve_path_with(title, |p| p.is_dir())
}

/// Fallback-chain implementation with an injectable directory check, so the
/// strategies are testable without touching the real filesystem.
pub(crate) fn resolve_path_with<F>(title: &str, is_dir: F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let accept = |raw: &str| -> Option<PathBuf> {
        let candidate = expand_tilde(raw.trim());
        is_dir(&candidate).then_some(candidate)
    };

    // Strategy 1: user@host: /path
    if let Some(caps) = at_host_pattern().captures(title)
        && let Some(path) = accept(&caps[1])
    {
        return Some(path);
    }

    // Strategy 2: split on common title separators and check segments
    for segment in separator_pattern().split(title) {
        let segment = segment.trim();
        if segment.starts_with('/') || segment.starts_with('~') {
            if let Some(path) = accept(segment) {
                return Some(path);
            }
        }
    }

    // Strategy 3: scan individual tokens
    for token in title.split_whitespace() {
        if token.starts_with('/') || token.starts_with('~') {
            if let Some(path) = accept(token) {
                return Some(path);
            }
        }
    }

    None
}
