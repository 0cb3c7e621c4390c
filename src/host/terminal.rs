// src/host/terminal.rs

//! Terminal host: build output goes to stdout, prompts read from stdin.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, error, warn};

use super::{Host, OutputSink, PromptReply};

#[derive(Debug, Clone)]
pub struct TerminalHost {
    document: Option<PathBuf>,
}

impl TerminalHost {
    pub fn new(document: Option<PathBuf>) -> Self {
        Self { document }
    }
}

impl Host for TerminalHost {
    type Sink = TerminalSink;

    fn output_sink(&mut self, id: &str) -> TerminalSink {
        debug!(sink = %id, "opening terminal output sink");
        TerminalSink { read_only: true }
    }

    fn bring_to_foreground(&mut self, _id: &str) {}

    fn prompt_for_text(&mut self, prompt: &str, default: &str, reply: PromptReply) {
        let prompt = prompt.to_string();
        let default = default.to_string();

        tokio::task::spawn_blocking(move || {
            eprint!("{prompt} [{default}]: ");
            let _ = std::io::stderr().flush();

            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(0) => reply.cancel(),
                Ok(_) if line.trim().is_empty() => reply.submit(default),
                Ok(_) => reply.submit(line.trim().to_string()),
                Err(e) => {
                    warn!(error = %e, "failed to read prompt answer from stdin");
                    reply.cancel();
                }
            }
        });
    }

    fn active_document(&self) -> Option<PathBuf> {
        self.document.clone()
    }

    fn report_error(&mut self, message: &str) {
        error!("{message}");
    }
}

/// Writes appended text straight to stdout.
///
/// A terminal cannot be cleared or scrolled meaningfully, so those are
/// no-ops; the read-only flag is tracked only to catch misuse.
#[derive(Debug)]
pub struct TerminalSink {
    read_only: bool,
}

impl OutputSink for TerminalSink {
    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn append(&mut self, text: &str) {
        if self.read_only {
            warn!("append to read-only sink");
        }
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            debug!(error = %e, "failed to write build output to stdout");
        }
    }

    fn scroll_to_end(&mut self) {}

    fn clear(&mut self) {}
}
