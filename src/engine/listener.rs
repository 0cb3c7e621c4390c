// src/engine/listener.rs

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::HostEvent;
use crate::exec::{ProcessListener, ProcessSupervisor};

/// Listener half of the build controller.
///
/// Never touches display state: every callback is posted to the host queue
/// and handled later by the controller on the loop task.
#[derive(Debug, Clone)]
pub struct QueueListener {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl QueueListener {
    pub fn new(tx: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self { tx }
    }

    fn post(&self, event: HostEvent) {
        if self.tx.send(event).is_err() {
            debug!("host loop closed; dropping process event");
        }
    }
}

impl ProcessListener for QueueListener {
    fn on_data(&self, proc: &ProcessSupervisor, data: String) {
        self.post(HostEvent::ProcessData {
            proc: proc.clone(),
            data,
        });
    }

    fn on_finished(&self, proc: &ProcessSupervisor) {
        self.post(HostEvent::ProcessFinished { proc: proc.clone() });
    }
}
