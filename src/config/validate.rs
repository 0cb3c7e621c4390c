// src/config/validate.rs

use crate::config::model::{RawSettingsFile, SettingsFile};
use crate::errors::{BuildStreamError, Result};

impl TryFrom<RawSettingsFile> for SettingsFile {
    type Error = crate::errors::BuildStreamError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_settings(&raw)?;
        Ok(SettingsFile::new_unchecked(raw))
    }
}

fn validate_raw_settings(cfg: &RawSettingsFile) -> Result<()> {
    validate_env_name("sdk_home_var", &cfg.sdk_home_var)?;
    for key in cfg.env.keys() {
        validate_env_name("[env]", key)?;
    }

    if cfg.output_id.trim().is_empty() {
        return Err(BuildStreamError::ConfigError(
            "output_id must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_env_name(field: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BuildStreamError::ConfigError(format!(
            "{field}: environment variable name must not be empty"
        )));
    }
    if name.contains('=') || name.contains('\0') {
        return Err(BuildStreamError::ConfigError(format!(
            "{field}: invalid environment variable name '{name}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_env_names_with_equals() {
        let mut raw = RawSettingsFile::default();
        raw.env.insert("A=B".to_string(), "x".to_string());
        let err = SettingsFile::try_from(raw).unwrap_err();
        assert!(matches!(err, BuildStreamError::ConfigError(msg) if msg.contains("A=B")));
    }

    #[test]
    fn rejects_empty_sdk_home_var() {
        let raw = RawSettingsFile {
            sdk_home_var: String::new(),
            ..RawSettingsFile::default()
        };
        assert!(SettingsFile::try_from(raw).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SettingsFile::try_from(RawSettingsFile::default()).is_ok());
    }
}
