// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `buildstream`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildstream",
    version,
    about = "Run a build tool and stream its output as it is produced.",
    long_about = None
)]
pub struct CliArgs {
    /// Build tasks to run (e.g. `build test`).
    ///
    /// If omitted, the task list is read interactively from stdin.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Path to the settings file (TOML).
    ///
    /// A missing file means "all defaults".
    #[arg(long, value_name = "PATH", default_value = "buildstream.toml")]
    pub settings: String,

    /// The "active document"; the build runs in the directory containing it.
    #[arg(long, value_name = "PATH", default_value = "build.gradle")]
    pub document: String,

    /// Override the `build_command` setting.
    #[arg(long, value_name = "CMD")]
    pub build_command: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDSTREAM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_words_become_tasks() {
        let args = CliArgs::parse_from(["buildstream", "--log-level", "debug", "clean", "build"]);
        assert_eq!(args.tasks, vec!["clean".to_string(), "build".to_string()]);
        assert_eq!(args.settings, "buildstream.toml");
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
