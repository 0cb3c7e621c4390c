// src/exec/supervisor.rs

//! Supervision of a single build-tool process.
//!
//! A [`ProcessSupervisor`] spawns the process described by an
//! [`Invocation`] and runs two Tokio reader tasks, one per pipe. Each reader
//! pulls up to [`READ_CHUNK_SIZE`] bytes at a time, decodes them and hands the
//! text to the registered [`ProcessListener`]. When the stdout reader sees
//! end-of-stream it reports completion exactly once; stderr EOF just ends
//! that reader.
//!
//! The supervisor only holds a weak reference to its listener. `kill()`
//! clears that reference, so once `kill()` returns no callback is running
//! and none will start.

use std::fmt;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::{debug, info, trace, warn};

use crate::errors::{BuildStreamError, Result};
use crate::exec::decode::ChunkDecoder;
use crate::exec::invocation::Invocation;
use crate::types::StreamKind;

/// Upper bound on a single pipe read.
pub const READ_CHUNK_SIZE: usize = 32 * 1024;

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// Receives output and completion from a supervisor.
///
/// Callbacks arrive on Tokio worker threads. Calls for one stream are
/// sequential and in read order; stdout and stderr callbacks may run
/// concurrently with each other. A callback must not call
/// [`ProcessSupervisor::kill`] on the supervisor that is delivering to it;
/// schedule that onto another task instead.
pub trait ProcessListener: Send + Sync {
    fn on_data(&self, proc: &ProcessSupervisor, data: String);
    fn on_finished(&self, proc: &ProcessSupervisor);
}

/// Lifecycle of a supervisor. `Finished` and `Killed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Created,
    Running,
    Finished,
    Killed,
}

/// Cheap, cloneable handle to one supervised process.
///
/// Clones compare equal; two different runs never do.
#[derive(Clone)]
pub struct ProcessSupervisor {
    inner: Arc<Inner>,
}

struct Inner {
    id: u64,
    invocation: Invocation,
    listener: RwLock<Option<Weak<dyn ProcessListener>>>,
    child: Mutex<Option<Child>>,
    state: Mutex<SupervisorState>,
}

impl ProcessSupervisor {
    /// Spawn the process and start both pipe readers.
    ///
    /// Must be called from within a Tokio runtime. A spawn failure is
    /// returned as [`BuildStreamError::Spawn`] and is not retried.
    pub fn start(invocation: Invocation, listener: &Arc<dyn ProcessListener>) -> Result<Self> {
        let id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);
        let sup = ProcessSupervisor {
            inner: Arc::new(Inner {
                id,
                invocation,
                listener: RwLock::new(Some(Arc::downgrade(listener))),
                child: Mutex::new(None),
                state: Mutex::new(SupervisorState::Created),
            }),
        };

        let invocation = &sup.inner.invocation;
        info!(
            run_id = id,
            program = %invocation.program(),
            args = ?invocation.args(),
            cwd = %invocation.working_dir().display(),
            "starting build process"
        );

        let mut child = invocation
            .to_command()
            .spawn()
            .map_err(|source| BuildStreamError::Spawn {
                program: invocation.program().to_string(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        *lock(&sup.inner.child) = Some(child);
        *lock(&sup.inner.state) = SupervisorState::Running;

        match stdout {
            Some(pipe) => {
                tokio::spawn(read_stream(sup.clone(), pipe, StreamKind::Stdout));
            }
            None => warn!(run_id = id, "no stdout pipe; completion will never be reported"),
        }
        if let Some(pipe) = stderr {
            tokio::spawn(read_stream(sup.clone(), pipe, StreamKind::Stderr));
        }

        Ok(sup)
    }

    /// Monotonic identifier of this run, unique within the process.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn invocation(&self) -> &Invocation {
        &self.inner.invocation
    }

    pub fn state(&self) -> SupervisorState {
        *lock(&self.inner.state)
    }

    /// Exit status if the process has already exited, without blocking.
    pub fn try_exit_status(&self) -> Option<ExitStatus> {
        let mut child = lock(&self.inner.child);
        child.as_mut().and_then(|c| c.try_wait().ok().flatten())
    }

    /// Terminate the process immediately and stop all further delivery.
    ///
    /// Does not wait for the readers to drain; they notice the closed pipes
    /// on their own. Calling this twice, or after the run finished, only
    /// releases whatever is left.
    pub fn kill(&self) {
        {
            let mut state = lock(&self.inner.state);
            if *state == SupervisorState::Killed {
                return;
            }
            if *state != SupervisorState::Finished {
                *state = SupervisorState::Killed;
            }
        }

        if let Some(mut child) = lock(&self.inner.child).take() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(run_id = self.id(), %status, "process already exited; releasing handle");
                }
                _ => {
                    if let Err(e) = child.start_kill() {
                        warn!(run_id = self.id(), error = %e, "failed to kill build process");
                    } else {
                        info!(run_id = self.id(), "build process killed");
                    }
                }
            }
        }

        // Waits for in-flight callbacks; none start afterwards.
        *self
            .inner
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Deliver one decoded chunk. Returns `false` once the listener is gone.
    fn deliver_data(&self, data: String) -> bool {
        let guard = self
            .inner
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref().and_then(Weak::upgrade) {
            Some(listener) => {
                listener.on_data(self, data);
                true
            }
            None => false,
        }
    }

    fn deliver_finished(&self) {
        {
            let mut state = lock(&self.inner.state);
            if *state != SupervisorState::Running {
                return;
            }
            *state = SupervisorState::Finished;
        }

        let guard = self
            .inner
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(listener) = guard.as_ref().and_then(Weak::upgrade) {
            listener.on_finished(self);
        }
    }
}

impl PartialEq for ProcessSupervisor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ProcessSupervisor {}

impl fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("id", &self.inner.id)
            .field("command", &self.inner.invocation.command())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reader loop for one pipe.
async fn read_stream<R>(sup: ProcessSupervisor, mut pipe: R, stream: StreamKind)
where
    R: AsyncRead + Unpin,
{
    let run_id = sup.id();
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut decoder = ChunkDecoder::new();

    loop {
        let n = match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!(run_id, %stream, error = %e, "pipe read failed; treating as end of stream");
                break;
            }
        };
        trace!(run_id, %stream, bytes = n, "read chunk");

        if let Some(text) = decoder.push(&buf[..n]) {
            if !sup.deliver_data(text) {
                debug!(run_id, %stream, "listener detached; reader stopping");
                return;
            }
        }
    }

    if let Some(text) = decoder.finish() {
        if !sup.deliver_data(text) {
            return;
        }
    }

    debug!(run_id, %stream, "end of stream");
    if stream == StreamKind::Stdout {
        sup.deliver_finished();
    }
}
