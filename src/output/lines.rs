// src/output/lines.rs

use crate::types::NormalizeMode;

use super::normalize::{normalize, normalize_newlines};

/// Reassembles lines that a pipe read split in two.
///
/// Only complete lines leave the buffer; the unterminated tail waits for the
/// next chunk or for [`LineBuffer::flush`]. One buffer serves one run.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a decoded chunk and return every line it completes, trimmed, with
    /// blank lines dropped.
    pub fn push(&mut self, text: &str) -> String {
        self.pending.push_str(&normalize_newlines(text));
        match self.pending.rfind('\n') {
            Some(end) => {
                let tail = self.pending.split_off(end + 1);
                let complete = std::mem::replace(&mut self.pending, tail);
                normalize(&complete, NormalizeMode::Lines)
            }
            None => String::new(),
        }
    }

    /// Emit whatever is left as a final line.
    pub fn flush(&mut self) -> String {
        let tail = std::mem::take(&mut self.pending);
        match tail.trim() {
            "" => String::new(),
            line => format!("{line}\n"),
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
