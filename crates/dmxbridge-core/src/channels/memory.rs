use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::ChannelError;
use super::handle::{ChannelMessage, DataChannel, ReadyState};
use super::registry::ChannelNotifier;

/// In-process data channel.
///
/// Messages sent to it land on the receiver returned by [`MemoryChannel::new`];
/// [`MemoryChannel::deliver`] and [`MemoryChannel::close`] play the transport's
/// part. Used by the console channel of the CLI and by tests.
pub struct MemoryChannel {
    label: String,
    ready: Mutex<ReadyState>,
    outbox: mpsc::UnboundedSender<ChannelMessage>,
    notifier: OnceLock<ChannelNotifier>,
}

impl MemoryChannel {
    pub fn new(label: impl Into<String>) -> (Arc<Self>, mpsc::UnboundedReceiver<ChannelMessage>) {
        let (outbox, rx) = mpsc::unbounded_channel();
        let channel = Arc::new(Self {
            label: label.into(),
            ready: Mutex::new(ReadyState::Open),
            outbox,
            notifier: OnceLock::new(),
        });
        (channel, rx)
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        *self
            .ready
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    /// Inject an inbound message as if the peer had sent it.
    ///
    /// Returns `false` when the channel is not registered or already closed.
    pub fn deliver(&self, message: impl Into<ChannelMessage>) -> bool {
        match self.notifier.get() {
            Some(notifier) => notifier.message(message),
            None => false,
        }
    }

    pub fn close(&self) {
        self.set_ready_state(ReadyState::Closed);
        if let Some(notifier) = self.notifier.get() {
            notifier.closed();
        }
    }
}

#[async_trait]
impl DataChannel for MemoryChannel {
    fn label(&self) -> &str {
        &self.label
    }

    fn ready_state(&self) -> ReadyState {
        *self
            .ready
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn attach(&self, notifier: ChannelNotifier) {
        // A channel belongs to one registry; later attachments are ignored.
        let _ = self.notifier.set(notifier);
    }

    async fn send(&self, message: &ChannelMessage) -> Result<(), ChannelError> {
        self.outbox
            .send(message.clone())
            .map_err(|_| ChannelError::Closed)
    }
}
