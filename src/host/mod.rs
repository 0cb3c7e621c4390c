// src/host/mod.rs

//! Boundary to the interactive host (editor, IDE, terminal).
//!
//! The build controller never touches UI state directly; it goes through
//! [`Host`] and [`OutputSink`], always from the single host-loop task.
//! [`terminal`] provides the implementation the `buildstream` binary uses.

pub mod terminal;

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::HostEvent;

pub use terminal::TerminalHost;

/// A single output destination (panel, view, terminal).
pub trait OutputSink {
    fn set_read_only(&mut self, read_only: bool);
    fn append(&mut self, text: &str);
    fn scroll_to_end(&mut self);
    fn clear(&mut self);
}

/// Services the build controller needs from its host.
pub trait Host {
    type Sink: OutputSink;

    /// Return the sink with this id, creating it on first use.
    fn output_sink(&mut self, id: &str) -> Self::Sink;

    fn bring_to_foreground(&mut self, id: &str);

    /// Ask the user for a line of text. The answer (or cancellation) comes
    /// back through `reply`, possibly much later.
    fn prompt_for_text(&mut self, prompt: &str, default: &str, reply: PromptReply);

    /// Path of the document the user is currently looking at, if any.
    fn active_document(&self) -> Option<PathBuf>;

    /// Host-level error channel (status bar, dialog, stderr).
    fn report_error(&mut self, message: &str);
}

/// One-shot answer to [`Host::prompt_for_text`].
///
/// Dropping it without answering counts as a cancellation.
#[derive(Debug)]
pub struct PromptReply {
    tx: Option<mpsc::UnboundedSender<HostEvent>>,
    working_dir: PathBuf,
}

impl PromptReply {
    pub(crate) fn new(tx: mpsc::UnboundedSender<HostEvent>, working_dir: PathBuf) -> Self {
        Self {
            tx: Some(tx),
            working_dir,
        }
    }

    pub fn submit(mut self, text: impl Into<String>) {
        self.send(Some(text.into()));
    }

    pub fn cancel(mut self) {
        self.send(None);
    }

    fn send(&mut self, text: Option<String>) {
        if let Some(tx) = self.tx.take() {
            let event = HostEvent::PromptAnswered {
                text,
                working_dir: std::mem::take(&mut self.working_dir),
            };
            if tx.send(event).is_err() {
                debug!("host loop gone; dropping prompt answer");
            }
        }
    }
}

impl Drop for PromptReply {
    fn drop(&mut self) {
        self.send(None);
    }
}
