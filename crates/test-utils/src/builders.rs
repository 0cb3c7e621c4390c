#![allow(dead_code)]

use std::collections::BTreeMap;

use buildstream::config::{RawSettingsFile, SettingsFile};
use buildstream::types::NormalizeMode;

/// Builder for `SettingsFile` to simplify test setup.
pub struct SettingsBuilder {
    raw: RawSettingsFile,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawSettingsFile::default(),
        }
    }

    /// Settings whose build command is `sh`, so tasks `["-c", "<script>"]`
    /// run a shell script.
    pub fn shell() -> Self {
        Self::new().build_command("sh")
    }

    pub fn build_command(mut self, cmd: &str) -> Self {
        self.raw.build_command = cmd.to_string();
        self
    }

    pub fn sdk_home(mut self, dir: &str) -> Self {
        self.raw.sdk_home = dir.to_string();
        self
    }

    pub fn sdk_home_var(mut self, var: &str) -> Self {
        self.raw.sdk_home_var = var.to_string();
        self
    }

    pub fn kill_superseded(mut self, val: bool) -> Self {
        self.raw.kill_superseded = val;
        self
    }

    pub fn normalize(mut self, mode: NormalizeMode) -> Self {
        self.raw.normalize = mode;
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.raw.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> SettingsFile {
        SettingsFile::try_from(self.raw).expect("Failed to build valid settings from builder")
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain key/value settings, as a host's settings store would hand them out.
pub fn map_settings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Tasks that make `sh` run `script`.
pub fn sh_tasks(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}
