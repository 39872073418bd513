//! Application launching at a working directory.
//!
//! A static template table maps known application identities to a command
//! line with a `{path}` placeholder. Unknown identities fall back to the
//! lower-cased identity as the binary name with a best-guess working
//! directory flag. Launching is fire-and-forget: no handle comes back, and
//! spawn failures are only observable as an adoption timeout later.

use std::collections::HashMap;
use std::path::Path;

/// Placeholder substituted with the target directory in launch templates.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// A fully resolved launch invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Binary to spawn.
    pub program: String,
    /// Arguments, with the path placeholder already substituted.
    pub args: Vec<String>,
}

/// Built-in launch templates for known application identities.
///
/// Templates are parsed with `shell_words`, so quoting behaves like a shell
/// without actually involving one.
pub fn default_templates() -> HashMap<String, String> {
    [
        ("Gnome-terminal", "gnome-terminal --working-directory={path}"),
        ("Mate-terminal", "mate-terminal --working-directory={path}"),
        ("xfce4-terminal", "xfce4-terminal --working-directory={path}"),
        ("kitty", "kitty --directory {path}"),
        ("Alacritty", "alacritty --working-directory {path}"),
        ("foot", "foot --working-directory={path}"),
        ("Terminator", "terminator --working-directory={path}"),
        ("Tilix", "tilix -w {path}"),
        ("Terminal", "open -a Terminal {path}"),
        ("iTerm2", "open -a iTerm {path}"),
        ("Code", "code {path}"),
    ]
    .into_iter()
    .map(|(app, template)| (app.to_string(), template.to_string()))
    .collect()
}

/// Resolve an application identity and target directory to a launch command.
///
/// Falls back to `<lowercased identity> --working-directory=<path>` for
/// identities missing from the table.
pub fn launch_command(
    templates: &HashMap<String, String>,
    app: &str,
    path: &Path,
) -> LaunchCommand {
    let path_str = path.to_string_lossy();

    if let Some(template) = templates.get(app) {
        match shell_words::split(template) {
            Ok(words) if !words.is_empty() => {
                let mut words = words.into_iter();
                let program = words.next().unwrap_or_default();
                let args = words
                    .map(|w| w.replace(PATH_PLACEHOLDER, &path_str))
                    .collect();
                return LaunchCommand { program, args };
            }
            Ok(_) => {
                log::warn!("Empty launch template for {app}, using generic fallback");
            }
            Err(e) => {
                log::warn!("Bad launch template for {app}: {e}, using generic fallback");
            }
        }
    }

    LaunchCommand {
        program: app.to_lowercase(),
        args: vec![format!("--working-directory={path_str}")],
    }
}

/// Process spawning capability, separated from command construction so the
/// engine can be exercised without creating real processes.
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the command, detached. Must not block and must not report
    /// success or failure synchronously.
    fn launch(&self, cmd: &LaunchCommand);
}

/// Launcher backed by `std::process::Command`.
///
/// The spawned child is intentionally not waited on; a failure to spawn is
/// logged and otherwise ignored, because window adoption is the only real
/// success signal.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, cmd: &LaunchCommand) {
        log::info!("Launching {} {:?}", cmd.program, cmd.args);
        match std::process::Command::new(&cmd.program).args(&cmd.args).spawn() {
            Ok(child) => {
                log::debug!("Spawned pid {}", child.id());
            }
            Err(e) => {
                log::error!("Failed to spawn {}: {e}", cmd.program);
            }
        }
    }
}
