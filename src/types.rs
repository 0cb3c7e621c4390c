use std::str::FromStr;
use serde::Deserialize;

/// How decoded output is shaped before it is appended to the output sink.
///
/// - `Passthrough`: raw chunks with line endings normalised to `\n`.
/// - `Lines`: additionally split into lines, trim each line and drop empty
///   ones, so every append is a run of clean `\n`-terminated lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    Passthrough,
    Lines,
}

impl Default for NormalizeMode {
    fn default() -> Self {
        NormalizeMode::Passthrough
    }
}

impl FromStr for NormalizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passthrough" => Ok(NormalizeMode::Passthrough),
            "lines" => Ok(NormalizeMode::Lines),
            other => Err(format!(
                "invalid normalize mode: {other} (expected \"passthrough\" or \"lines\")"
            )),
        }
    }
}

/// Which pipe of the child process a chunk was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_mode_from_str() {
        assert_eq!("Lines".parse::<NormalizeMode>(), Ok(NormalizeMode::Lines));
        assert_eq!(
            " passthrough ".parse::<NormalizeMode>(),
            Ok(NormalizeMode::Passthrough)
        );
        assert!("verbatim".parse::<NormalizeMode>().is_err());
    }
}
