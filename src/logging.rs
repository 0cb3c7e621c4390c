// src/logging.rs

//! Logging setup for `buildstream` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level`, applied to this crate; other targets stay at `warn`
//! 2. `BUILDSTREAM_LOG`, taken as an `EnvFilter` directive
//!    (e.g. `debug`, `buildstream::exec=trace,info`)
//! 3. `info`
//!
//! Logs are sent to STDERR so that stdout carries only build output.

use anyhow::Result;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "BUILDSTREAM_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup. An unparsable `BUILDSTREAM_LOG` falls back
/// to `info` and is reported once logging is up.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(cli_level, env_value.as_deref());

    let (filter, rejected) = match EnvFilter::try_new(&directive) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_DIRECTIVE), Some(e)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    if let Some(e) = rejected {
        warn!(%directive, error = %e, "invalid {LOG_ENV} directive; using {DEFAULT_DIRECTIVE}");
    }

    Ok(())
}

fn filter_directive(cli_level: Option<LogLevel>, env_value: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level_name(level));
    }
    match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_DIRECTIVE.to_string(),
    }
}

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
