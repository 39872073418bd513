// Library exports for embedders and tests.

/// Crate version, for use by embedding frontends.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod commands;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod host;
pub mod launch;
pub mod pending;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod title_path;

pub use config::RecallConfig;
pub use engine::{NullOverlay, NullSpokenForms, Overlay, RecallEngine, SpokenForms};
pub use entry::{ArchivedEntry, Settings, WindowEntry};
pub use error::RecallError;
pub use host::{HostWindow, Rect, WindowHost, WindowId};
pub use launch::{ProcessLauncher, SystemLauncher};
pub use registry::{JsonFileStore, MemoryStore, Registry, SaveOutcome, StateStore};
