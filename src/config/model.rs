// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::NormalizeMode;

use super::{BUILD_COMMAND_KEY, SDK_HOME_KEY, Settings};

/// Settings file as read from TOML, before validation.
///
/// ```toml
/// build_command = "./gradlew"
/// sdk_home = "/opt/android-sdk"
/// sdk_home_var = "ANDROID_HOME"
/// kill_superseded = true
/// normalize = "lines"
/// output_id = "_build"
///
/// [env]
/// JAVA_OPTS = "-Xmx2g"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSettingsFile {
    /// Build tool executable; empty means `gradle`.
    #[serde(default)]
    pub build_command: String,

    /// SDK home directory; empty means "do not override".
    #[serde(default)]
    pub sdk_home: String,

    /// Environment variable that receives `sdk_home`.
    #[serde(default = "default_sdk_home_var")]
    pub sdk_home_var: String,

    /// Kill a still-running build when a new one is started.
    #[serde(default = "default_kill_superseded")]
    pub kill_superseded: bool,

    #[serde(default)]
    pub normalize: NormalizeMode,

    /// Identifier of the output sink the host shows.
    #[serde(default = "default_output_id")]
    pub output_id: String,

    /// Extra environment overrides applied on top of the inherited
    /// environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_sdk_home_var() -> String {
    "ANDROID_HOME".to_string()
}

fn default_kill_superseded() -> bool {
    true
}

fn default_output_id() -> String {
    "_build".to_string()
}

impl Default for RawSettingsFile {
    fn default() -> Self {
        Self {
            build_command: String::new(),
            sdk_home: String::new(),
            sdk_home_var: default_sdk_home_var(),
            kill_superseded: default_kill_superseded(),
            normalize: NormalizeMode::default(),
            output_id: default_output_id(),
            env: BTreeMap::new(),
        }
    }
}

/// Validated settings.
///
/// Only constructed through `TryFrom<RawSettingsFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct SettingsFile {
    raw: RawSettingsFile,
}

impl SettingsFile {
    pub(crate) fn new_unchecked(raw: RawSettingsFile) -> Self {
        Self { raw }
    }

    pub fn sdk_home_var(&self) -> &str {
        &self.raw.sdk_home_var
    }

    pub fn kill_superseded(&self) -> bool {
        self.raw.kill_superseded
    }

    pub fn normalize(&self) -> NormalizeMode {
        self.raw.normalize
    }

    pub fn output_id(&self) -> &str {
        &self.raw.output_id
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.raw.env
    }

    /// Replace the build command, e.g. from a CLI override.
    pub fn with_build_command(mut self, cmd: impl Into<String>) -> Self {
        self.raw.build_command = cmd.into();
        self
    }
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self::new_unchecked(RawSettingsFile::default())
    }
}

impl Settings for SettingsFile {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            BUILD_COMMAND_KEY => Some(self.raw.build_command.clone()),
            SDK_HOME_KEY => Some(self.raw.sdk_home.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_answers_only_the_command_keys() {
        let raw = RawSettingsFile {
            build_command: "./gradlew".to_string(),
            sdk_home: "/opt/sdk".to_string(),
            ..RawSettingsFile::default()
        };
        let settings = SettingsFile::new_unchecked(raw);

        assert_eq!(settings.get(BUILD_COMMAND_KEY).as_deref(), Some("./gradlew"));
        assert_eq!(settings.get(SDK_HOME_KEY).as_deref(), Some("/opt/sdk"));
        assert_eq!(settings.get("sdk_home_var"), None);
        assert_eq!(settings.get("output_id"), None);
    }
}
