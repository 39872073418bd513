//! Startup command name resolution.
//!
//! Entries store the *spoken* name of a startup command (e.g. "yolo"), not
//! the shell text, so editing the command table retroactively changes what
//! every entry runs. Resolution is total: an unknown name is treated as a
//! literal shell command.

use std::collections::HashMap;

/// Resolve a stored command reference to shell text.
///
/// Order: key lookup, then reverse lookup by value (older registries stored
/// the resolved value instead of the spoken name), then literal pass-through.
pub fn resolve_command(table: &HashMap<String, String>, stored: &str) -> String {
    if let Some(shell_cmd) = table.get(stored) {
        return shell_cmd.clone();
    }
    // Data written before names were stored holds the shell text itself.
    if table.values().any(|shell_cmd| shell_cmd == stored) {
        return stored.to_string();
    }
    stored.to_string()
}
