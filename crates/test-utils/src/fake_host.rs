use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use buildstream::host::{Host, OutputSink, PromptReply};

/// One operation performed on a fake output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOp {
    Clear,
    ReadOnly(bool),
    Append(String),
    ScrollToEnd,
}

/// Everything a `FakeHost` was asked to do.
#[derive(Debug, Default)]
pub struct HostLog {
    pub sink_ops: Vec<SinkOp>,
    pub sinks_opened: Vec<String>,
    pub foregrounded: Vec<String>,
    pub prompts: Vec<(String, String)>,
    pub errors: Vec<String>,
    /// Appends made while the sink was read-only.
    pub read_only_violations: usize,
}

impl HostLog {
    /// Every append made since the sink was last cleared, in order.
    pub fn appends_since_clear(&self) -> Vec<String> {
        let start = self
            .sink_ops
            .iter()
            .rposition(|op| *op == SinkOp::Clear)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.sink_ops[start..]
            .iter()
            .filter_map(|op| match op {
                SinkOp::Append(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Concatenated output since the last clear.
    pub fn output(&self) -> String {
        self.appends_since_clear().concat()
    }
}

/// How a `FakeHost` answers task prompts.
#[derive(Debug, Clone)]
pub enum PromptBehaviour {
    Answer(String),
    Cancel,
}

/// A host that records every call and answers prompts from a script.
pub struct FakeHost {
    document: Option<PathBuf>,
    prompt: PromptBehaviour,
    log: Arc<Mutex<HostLog>>,
}

impl FakeHost {
    pub fn new(document: Option<PathBuf>) -> Self {
        Self {
            document,
            prompt: PromptBehaviour::Cancel,
            log: Arc::new(Mutex::new(HostLog::default())),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBehaviour) -> Self {
        self.prompt = prompt;
        self
    }

    /// Shared handle to the log; stays valid after the host is moved into a
    /// controller.
    pub fn log(&self) -> Arc<Mutex<HostLog>> {
        Arc::clone(&self.log)
    }
}

fn lock(log: &Arc<Mutex<HostLog>>) -> MutexGuard<'_, HostLog> {
    log.lock().unwrap()
}

impl Host for FakeHost {
    type Sink = FakeSink;

    fn output_sink(&mut self, id: &str) -> FakeSink {
        lock(&self.log).sinks_opened.push(id.to_string());
        FakeSink {
            log: Arc::clone(&self.log),
            read_only: false,
        }
    }

    fn bring_to_foreground(&mut self, id: &str) {
        lock(&self.log).foregrounded.push(id.to_string());
    }

    fn prompt_for_text(&mut self, prompt: &str, default: &str, reply: PromptReply) {
        lock(&self.log)
            .prompts
            .push((prompt.to_string(), default.to_string()));
        match &self.prompt {
            PromptBehaviour::Answer(text) => reply.submit(text.clone()),
            PromptBehaviour::Cancel => reply.cancel(),
        }
    }

    fn active_document(&self) -> Option<PathBuf> {
        self.document.clone()
    }

    fn report_error(&mut self, message: &str) {
        lock(&self.log).errors.push(message.to_string());
    }
}

/// Sink half of `FakeHost`; writes into the shared `HostLog`.
pub struct FakeSink {
    log: Arc<Mutex<HostLog>>,
    read_only: bool,
}

impl OutputSink for FakeSink {
    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        lock(&self.log).sink_ops.push(SinkOp::ReadOnly(read_only));
    }

    fn append(&mut self, text: &str) {
        let mut log = lock(&self.log);
        if self.read_only {
            log.read_only_violations += 1;
        }
        log.sink_ops.push(SinkOp::Append(text.to_string()));
    }

    fn scroll_to_end(&mut self) {
        lock(&self.log).sink_ops.push(SinkOp::ScrollToEnd);
    }

    fn clear(&mut self) {
        lock(&self.log).sink_ops.push(SinkOp::Clear);
    }
}
