// src/exec/invocation.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::errors::{BuildStreamError, Result};

/// One build-tool invocation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    command: Vec<String>,
    working_dir: PathBuf,
    env: BTreeMap<String, String>,
}

impl Invocation {
    /// `command[0]` is the executable; the rest are passed verbatim as
    /// arguments (no shell interpretation).
    pub fn new(
        command: Vec<String>,
        working_dir: impl Into<PathBuf>,
        env: BTreeMap<String, String>,
    ) -> Result<Self> {
        match command.first() {
            Some(program) if !program.is_empty() => {}
            _ => {
                return Err(BuildStreamError::ConfigError(
                    "invocation needs a non-empty executable".to_string(),
                ));
            }
        }

        Ok(Self {
            command,
            working_dir: working_dir.into(),
            env,
        })
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn program(&self) -> &str {
        &self.command[0]
    }

    pub fn args(&self) -> &[String] {
        &self.command[1..]
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Overrides applied on top of the inherited environment.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Build the OS command: inherited environment plus overrides, stdout and
    /// stderr piped, stdin detached.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.args())
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}
