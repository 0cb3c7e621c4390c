// src/engine/mod.rs

//! Build orchestration on top of the host's single-threaded event queue.
//!
//! This module ties together:
//! - the [`HostEvent`] queue: an unbounded mpsc channel with exactly one
//!   consumer, standing in for the host's UI thread
//! - the [`QueueListener`] that turns supervisor callbacks (which arrive on
//!   reader tasks) into queued events
//! - the [`BuildController`], which owns all shared display state and is only
//!   ever touched by the consumer
//! - the [`HostLoop`] that drains the queue into the controller

use std::path::PathBuf;

use crate::exec::ProcessSupervisor;

/// Events processed, one at a time, by the host loop.
#[derive(Debug)]
pub enum HostEvent {
    /// Start a build with these tasks; an empty list prompts for them.
    Run { tasks: Vec<String> },
    /// Answer to a task prompt. `None` means the user cancelled.
    PromptAnswered {
        text: Option<String>,
        working_dir: PathBuf,
    },
    /// A decoded chunk of output from `proc`.
    ProcessData {
        proc: ProcessSupervisor,
        data: String,
    },
    /// `proc` reached end of stdout.
    ProcessFinished { proc: ProcessSupervisor },
    /// Kill any active build and stop the loop.
    Shutdown,
}

/// Options for the host loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopOptions {
    /// Exit once no build is running and no prompt is pending (CLI mode).
    pub exit_when_idle: bool,
    /// Return the first controller error instead of logging it and carrying
    /// on.
    pub stop_on_error: bool,
}

pub mod controller;
pub mod listener;
pub mod runtime;

pub use controller::{BuildController, Command, ControllerOptions, FINISHED_MARKER, build_invocation, parse_tasks};
pub use listener::QueueListener;
pub use runtime::HostLoop;
