// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{info, trace, warn};

use crate::errors::Result;
use crate::host::Host;

use super::controller::BuildController;
use super::{HostEvent, LoopOptions};

/// The host's single consumer: drains [`HostEvent`]s one at a time into the
/// [`BuildController`].
///
/// Reader tasks only ever enqueue; all display state is mutated here, so no
/// two events are ever handled concurrently.
pub struct HostLoop<H: Host> {
    controller: BuildController<H>,
    event_rx: mpsc::UnboundedReceiver<HostEvent>,
    options: LoopOptions,
}

impl<H: Host> fmt::Debug for HostLoop<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostLoop")
            .field("options", &self.options)
            .field("active", &self.controller.active())
            .finish_non_exhaustive()
    }
}

impl<H: Host> HostLoop<H> {
    pub fn new(
        controller: BuildController<H>,
        event_rx: mpsc::UnboundedReceiver<HostEvent>,
        options: LoopOptions,
    ) -> Self {
        Self {
            controller,
            event_rx,
            options,
        }
    }

    pub fn controller(&self) -> &BuildController<H> {
        &self.controller
    }

    /// Main event loop. Hands the controller back when it stops, so callers
    /// can inspect the host afterwards.
    pub async fn run(mut self) -> Result<BuildController<H>> {
        info!("host loop started");

        let mut queued: Option<HostEvent> = None;

        loop {
            let event = match queued.take() {
                Some(e) => e,
                None => match self.event_rx.recv().await {
                    Some(e) => e,
                    None => {
                        info!("host event channel closed; exiting");
                        break;
                    }
                },
            };

            trace!(?event, "host loop received event");

            match self.controller.handle_event(event) {
                Ok(true) => {}
                Ok(false) => {
                    info!("shutdown requested; stopping host loop");
                    break;
                }
                Err(e) if self.options.stop_on_error => return Err(e),
                Err(e) => warn!(error = %e, "build request failed"),
            }

            if self.options.exit_when_idle && self.controller.is_idle() {
                // Output already queued behind the completion still gets shown.
                if let Ok(event) = self.event_rx.try_recv() {
                    queued = Some(event);
                    continue;
                }
                info!("no build running; exiting");
                break;
            }
        }

        Ok(self.controller)
    }
}
