// src/output/normalize.rs

use crate::types::NormalizeMode;

/// Rewrite every `\r\n` and every lone `\r` as `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Make decoded output safe to append to an output sink.
///
/// In [`NormalizeMode::Lines`] each surviving line is terminated with `\n`,
/// so consecutive appends never run two lines together.
pub fn normalize(text: &str, mode: NormalizeMode) -> String {
    let text = normalize_newlines(text);
    match mode {
        NormalizeMode::Passthrough => text,
        NormalizeMode::Lines => {
            let mut out = String::with_capacity(text.len());
            for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
                out.push_str(line);
                out.push('\n');
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_and_lone_cr_become_lf() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_newlines("\r\r\n"), "\n\n");
    }

    #[test]
    fn passthrough_keeps_whitespace_and_blank_lines() {
        let out = normalize("  a \r\n\r\nb", NormalizeMode::Passthrough);
        assert_eq!(out, "  a \n\nb");
    }

    #[test]
    fn lines_mode_trims_and_drops_empty_lines() {
        let out = normalize("  > Task :compile \r\n\r\n   \nBUILD SUCCESSFUL", NormalizeMode::Lines);
        assert_eq!(out, "> Task :compile\nBUILD SUCCESSFUL\n");
    }

    #[test]
    fn lines_mode_on_blank_input_is_empty() {
        assert_eq!(normalize(" \r\n\t\n", NormalizeMode::Lines), "");
    }
}
