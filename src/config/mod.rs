// src/config/mod.rs

//! Settings loading and validation for buildstream.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a settings file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Expose the key/value [`Settings`] lookup the build controller reads on
//!   every run.

pub mod loader;
pub mod model;
pub mod validate;

use std::collections::BTreeMap;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{RawSettingsFile, SettingsFile};

/// Key of the build tool executable setting.
pub const BUILD_COMMAND_KEY: &str = "build_command";
/// Key of the SDK home directory setting.
pub const SDK_HOME_KEY: &str = "sdk_home";
/// Executable used when `build_command` is unset or empty.
pub const DEFAULT_BUILD_COMMAND: &str = "gradle";

/// Read-only string settings lookup.
///
/// An absent key and an empty value mean the same thing to every caller.
pub trait Settings: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Configured build tool, falling back to [`DEFAULT_BUILD_COMMAND`].
    fn build_command(&self) -> String {
        self.get(BUILD_COMMAND_KEY)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_string())
    }

    /// Configured SDK home, `None` when unset or empty.
    fn sdk_home(&self) -> Option<String> {
        self.get(SDK_HOME_KEY).filter(|s| !s.is_empty())
    }
}

impl Settings for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}
