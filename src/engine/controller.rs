// src/engine/controller.rs

//! The build controller: single listener of record for build processes and
//! sole owner of the output sink and the active-run slot.
//!
//! Every method here runs on the host-loop task. Supervisor callbacks never
//! call in directly; they arrive as queued [`HostEvent`]s.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::{Settings, SettingsFile};
use crate::engine::listener::QueueListener;
use crate::engine::HostEvent;
use crate::errors::{BuildStreamError, Result};
use crate::exec::{Invocation, ProcessListener, ProcessSupervisor};
use crate::host::{Host, OutputSink, PromptReply};
use crate::output::{LineBuffer, normalize};
use crate::types::NormalizeMode;

/// Appended to the output sink when a build's stdout closes.
pub const FINISHED_MARKER: &str = "[Finished]";

/// Pre-filled answer offered when prompting for tasks.
const PROMPT_DEFAULT: &str = "tasks";

/// A host command with a single entry point.
pub trait Command {
    fn run(&mut self, args: Vec<String>) -> Result<()>;
}

/// Controller behaviour that does not change between runs.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Environment variable that receives the `sdk_home` setting.
    pub sdk_home_var: String,
    /// Kill a still-running build when a new one starts. Output from a
    /// superseded build is discarded either way.
    pub kill_superseded: bool,
    pub normalize: NormalizeMode,
    pub output_id: String,
    pub extra_env: BTreeMap<String, String>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            sdk_home_var: "ANDROID_HOME".to_string(),
            kill_superseded: true,
            normalize: NormalizeMode::Passthrough,
            output_id: "_build".to_string(),
            extra_env: BTreeMap::new(),
        }
    }
}

impl From<&SettingsFile> for ControllerOptions {
    fn from(settings: &SettingsFile) -> Self {
        Self {
            sdk_home_var: settings.sdk_home_var().to_string(),
            kill_superseded: settings.kill_superseded(),
            normalize: settings.normalize(),
            output_id: settings.output_id().to_string(),
            extra_env: settings.env().clone(),
        }
    }
}

/// Split prompted text into task names.
pub fn parse_tasks(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Build the invocation for one run.
///
/// The SDK home variable is only set when the setting is non-empty; extra
/// environment entries from the options go in first, so the SDK setting wins
/// on a clash.
pub fn build_invocation(
    settings: &dyn Settings,
    options: &ControllerOptions,
    tasks: Vec<String>,
    working_dir: PathBuf,
) -> Result<Invocation> {
    let mut command = Vec::with_capacity(tasks.len() + 1);
    command.push(settings.build_command());
    command.extend(tasks);

    let mut env = options.extra_env.clone();
    if let Some(home) = settings.sdk_home() {
        env.insert(options.sdk_home_var.clone(), home);
    }

    Invocation::new(command, working_dir, env)
}

/// Directory containing `document`; `.` for a bare file name.
pub fn document_dir(document: &Path) -> PathBuf {
    match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub struct BuildController<H: Host> {
    host: H,
    settings: Arc<dyn Settings>,
    options: ControllerOptions,
    tx: mpsc::UnboundedSender<HostEvent>,
    /// Strong owner of the listener; supervisors only hold weak references.
    listener: Arc<dyn ProcessListener>,
    sink: Option<H::Sink>,
    /// Latest run. Kept after it finishes so output queued behind
    /// `[Finished]` still reaches the sink.
    active: Option<ProcessSupervisor>,
    active_finished: bool,
    lines: LineBuffer,
    prompt_pending: bool,
}

impl<H: Host> BuildController<H> {
    /// `tx` must feed the queue this controller is driven from.
    pub fn new(
        host: H,
        settings: Arc<dyn Settings>,
        options: ControllerOptions,
        tx: mpsc::UnboundedSender<HostEvent>,
    ) -> Self {
        let listener: Arc<dyn ProcessListener> = Arc::new(QueueListener::new(tx.clone()));
        Self {
            host,
            settings,
            options,
            tx,
            listener,
            sink: None,
            active: None,
            active_finished: false,
            lines: LineBuffer::new(),
            prompt_pending: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The supervisor whose output currently reaches the sink, finished or
    /// not.
    pub fn active(&self) -> Option<&ProcessSupervisor> {
        self.active.as_ref()
    }

    /// No build running and no prompt waiting for an answer.
    pub fn is_idle(&self) -> bool {
        (self.active.is_none() || self.active_finished) && !self.prompt_pending
    }

    /// Handle one queued event. Returns `Ok(false)` when the loop should stop.
    pub fn handle_event(&mut self, event: HostEvent) -> Result<bool> {
        match event {
            HostEvent::Run { tasks } => Command::run(self, tasks)?,
            HostEvent::PromptAnswered { text, working_dir } => {
                self.on_prompt_answered(text, working_dir)?;
            }
            HostEvent::ProcessData { proc, data } => self.append_data(&proc, &data),
            HostEvent::ProcessFinished { proc } => self.finish(&proc),
            HostEvent::Shutdown => {
                self.shutdown();
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Kill the active build, if any.
    pub fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            if !self.active_finished {
                info!(run_id = active.id(), "shutting down; killing active build");
            }
            active.kill();
        }
        self.active_finished = false;
    }

    fn resolve_working_dir(&mut self) -> Result<PathBuf> {
        match self.host.active_document() {
            Some(document) => Ok(document_dir(&document)),
            None => {
                let err = BuildStreamError::NoActiveDocument;
                self.host.report_error(&err.to_string());
                Err(err)
            }
        }
    }

    fn on_prompt_answered(&mut self, text: Option<String>, working_dir: PathBuf) -> Result<()> {
        self.prompt_pending = false;
        match text {
            Some(text) => self.start_run(parse_tasks(&text), working_dir),
            None => {
                info!("task prompt cancelled; nothing to run");
                Ok(())
            }
        }
    }

    fn start_run(&mut self, tasks: Vec<String>, working_dir: PathBuf) -> Result<()> {
        let invocation =
            build_invocation(self.settings.as_ref(), &self.options, tasks, working_dir)?;

        self.prepare_sink();

        if let Some(previous) = self.active.take() {
            if self.options.kill_superseded {
                info!(run_id = previous.id(), "new build requested; killing superseded build");
                previous.kill();
            } else {
                debug!(
                    run_id = previous.id(),
                    "new build requested; superseded build keeps running, output discarded"
                );
            }
        }

        match ProcessSupervisor::start(invocation, &self.listener) {
            Ok(sup) => {
                self.active = Some(sup);
                self.active_finished = false;
                self.lines.clear();
                Ok(())
            }
            Err(err) => {
                self.host.report_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Open (or reuse) the output sink, clear it and bring it forward.
    fn prepare_sink(&mut self) {
        let id = self.options.output_id.clone();
        let sink = self.sink.get_or_insert_with(|| self.host.output_sink(&id));
        sink.clear();
        sink.set_read_only(true);
        self.host.bring_to_foreground(&id);
    }

    fn append_data(&mut self, proc: &ProcessSupervisor, data: &str) {
        if self.active.as_ref() != Some(proc) {
            debug!(run_id = proc.id(), "discarding output from superseded build");
            proc.kill();
            return;
        }

        let text = match self.options.normalize {
            NormalizeMode::Passthrough => normalize(data, NormalizeMode::Passthrough),
            NormalizeMode::Lines => {
                let mut text = self.lines.push(data);
                if self.active_finished {
                    text.push_str(&self.lines.flush());
                }
                text
            }
        };
        if !text.is_empty() {
            self.write_output(&text);
        }
    }

    fn finish(&mut self, proc: &ProcessSupervisor) {
        if self.active.as_ref() != Some(proc) {
            debug!(run_id = proc.id(), "ignoring completion of superseded build");
            proc.kill();
            return;
        }

        let tail = self.lines.flush();
        if !tail.is_empty() {
            self.write_output(&tail);
        }
        self.write_output(FINISHED_MARKER);
        match proc.try_exit_status() {
            Some(status) => info!(run_id = proc.id(), %status, "build finished"),
            None => info!(run_id = proc.id(), "build finished (stdout closed)"),
        }
        proc.kill();
        self.active_finished = true;
    }

    fn write_output(&mut self, text: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.set_read_only(false);
            sink.append(text);
            sink.set_read_only(true);
            sink.scroll_to_end();
        }
    }
}

impl<H: Host> Command for BuildController<H> {
    /// Start a build. An empty task list asks the host for tasks first and
    /// resumes once the answer is queued.
    fn run(&mut self, tasks: Vec<String>) -> Result<()> {
        let working_dir = self.resolve_working_dir()?;

        if tasks.is_empty() {
            let prompt = self.settings.build_command();
            self.prompt_pending = true;
            let reply = PromptReply::new(self.tx.clone(), working_dir);
            self.host.prompt_for_text(&prompt, PROMPT_DEFAULT, reply);
            return Ok(());
        }

        self.start_run(tasks, working_dir)
    }
}

impl<H: Host> Drop for BuildController<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BUILD_COMMAND_KEY, SDK_HOME_KEY};

    fn settings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_tool_and_no_sdk_override() {
        let inv = build_invocation(
            &settings(&[]),
            &ControllerOptions::default(),
            vec!["build".to_string()],
            PathBuf::from("/proj"),
        )
        .unwrap();

        assert_eq!(inv.command(), ["gradle".to_string(), "build".to_string()]);
        assert!(!inv.env().contains_key("ANDROID_HOME"));
    }

    #[test]
    fn sdk_home_lands_in_configured_variable() {
        let options = ControllerOptions {
            sdk_home_var: "SDK_ROOT".to_string(),
            ..ControllerOptions::default()
        };
        let inv = build_invocation(
            &settings(&[(BUILD_COMMAND_KEY, "./gradlew"), (SDK_HOME_KEY, "/opt/sdk")]),
            &options,
            vec![],
            PathBuf::from("."),
        )
        .unwrap();

        assert_eq!(inv.command(), ["./gradlew".to_string()]);
        assert_eq!(inv.env().get("SDK_ROOT").map(String::as_str), Some("/opt/sdk"));
    }

    #[test]
    fn prompted_text_is_split_on_whitespace() {
        assert_eq!(parse_tasks("  clean\tbuild \n"), vec!["clean", "build"]);
        assert!(parse_tasks("   ").is_empty());
    }

    #[test]
    fn document_dir_of_bare_file_is_current_dir() {
        assert_eq!(document_dir(Path::new("build.gradle")), PathBuf::from("."));
        assert_eq!(
            document_dir(Path::new("/src/app/build.gradle")),
            PathBuf::from("/src/app")
        );
    }
}
