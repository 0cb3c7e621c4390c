use std::sync::Arc;

use tokio::sync::mpsc;

use buildstream::exec::{ProcessListener, ProcessSupervisor};

/// What a `ChannelListener` observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Data { run_id: u64, data: String },
    Finished { run_id: u64 },
}

/// A listener that forwards every callback onto an unbounded channel.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<ListenerEvent>,
}

impl ChannelListener {
    /// The `Arc` must be kept alive by the test: supervisors only hold a weak
    /// reference to their listener.
    pub fn new() -> (Arc<dyn ProcessListener>, mpsc::UnboundedReceiver<ListenerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl ProcessListener for ChannelListener {
    fn on_data(&self, proc: &ProcessSupervisor, data: String) {
        let _ = self.tx.send(ListenerEvent::Data {
            run_id: proc.id(),
            data,
        });
    }

    fn on_finished(&self, proc: &ProcessSupervisor) {
        let _ = self.tx.send(ListenerEvent::Finished { run_id: proc.id() });
    }
}

/// Receive events until the first `Finished`, inclusive.
pub async fn collect_until_finished(
    rx: &mut mpsc::UnboundedReceiver<ListenerEvent>,
) -> Vec<ListenerEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let done = matches!(event, ListenerEvent::Finished { .. });
        events.push(event);
        if done {
            break;
        }
    }
    events
}

/// Concatenated data payloads, in delivery order.
pub fn data_of(events: &[ListenerEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            ListenerEvent::Data { data, .. } => Some(data.as_str()),
            ListenerEvent::Finished { .. } => None,
        })
        .collect()
}
