use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::handle::{ChannelMessage, DataChannel, ReadyState};

pub type ChannelId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

impl From<ReadyState> for ChannelState {
    fn from(ready: ReadyState) -> Self {
        match ready {
            ReadyState::Connecting => ChannelState::Connecting,
            ReadyState::Open => ChannelState::Open,
            ReadyState::Closing | ReadyState::Closed => ChannelState::Closed,
        }
    }
}

/// Notification fanned out to registry subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened { id: ChannelId, label: String },
    Message { id: ChannelId, message: ChannelMessage },
    Closed { id: ChannelId },
}

/// Result of [`ChannelRegistry::send`]. Nothing is queued for later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The transport is not open yet (or any more); the message was dropped.
    NotReady,
    /// No live channel has this id.
    UnknownChannel,
    /// The transport rejected the message; it was dropped.
    Failed,
}

/// A registered data channel.
#[derive(Clone)]
pub struct Channel {
    id: ChannelId,
    handle: Arc<dyn DataChannel>,
    removed: Arc<AtomicBool>,
}

impl Channel {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn label(&self) -> &str {
        self.handle.label()
    }

    pub fn handle(&self) -> &Arc<dyn DataChannel> {
        &self.handle
    }

    /// Transport readiness until the registry removes the channel, then `Closed`.
    pub fn state(&self) -> ChannelState {
        if self.removed.load(Ordering::Acquire) {
            return ChannelState::Closed;
        }
        self.handle.ready_state().into()
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("label", &self.label())
            .field("state", &self.state())
            .finish()
    }
}

#[derive(Default)]
struct Shared {
    next_id: AtomicU64,
    channels: DashMap<ChannelId, Channel>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ChannelEvent>>>,
}

impl Shared {
    fn emit(&self, event: ChannelEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn close(&self, id: ChannelId) -> bool {
        let Some((_, channel)) = self.channels.remove(&id) else {
            debug!(channel = id, "close for unknown channel ignored");
            return false;
        };
        channel.removed.store(true, Ordering::Release);
        info!(channel = id, label = channel.label(), "data channel closed");
        self.emit(ChannelEvent::Closed { id });
        true
    }
}

/// Callback surface handed to the transport for one channel.
///
/// Holds the registry weakly, so a transport that outlives the registry
/// simply reports into nothing.
#[derive(Clone)]
pub struct ChannelNotifier {
    id: ChannelId,
    shared: Weak<Shared>,
}

impl ChannelNotifier {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Report an inbound message. Returns `false` once the channel is gone.
    ///
    /// A message accepted here is queued ahead of the channel's `Closed`
    /// event and is forwarded even if the channel closes right after.
    pub fn message(&self, message: impl Into<ChannelMessage>) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        // Holding the entry blocks a concurrent removal until the event is queued.
        let Some(_live) = shared.channels.get(&self.id) else {
            debug!(channel = self.id, "message after close dropped");
            return false;
        };
        shared.emit(ChannelEvent::Message {
            id: self.id,
            message: message.into(),
        });
        true
    }

    /// Report that the transport closed the channel.
    pub fn closed(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.close(self.id);
        }
    }
}

impl fmt::Debug for ChannelNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelNotifier")
            .field("id", &self.id)
            .finish()
    }
}

/// Owns every open data channel, keyed by a process-unique id.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    shared: Arc<Shared>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a transport channel and start receiving its
    /// notifications.
    pub fn register(&self, handle: Arc<dyn DataChannel>) -> Channel {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let channel = Channel {
            id,
            handle,
            removed: Arc::new(AtomicBool::new(false)),
        };
        self.shared.channels.insert(id, channel.clone());

        info!(
            channel = id,
            label = channel.label(),
            state = ?channel.state(),
            "data channel registered"
        );
        self.shared.emit(ChannelEvent::Opened {
            id,
            label: channel.label().to_string(),
        });
        channel.handle.attach(ChannelNotifier {
            id,
            shared: Arc::downgrade(&self.shared),
        });
        channel
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    /// Remove a channel. Unknown ids are a no-op and return `false`.
    pub fn close(&self, id: ChannelId) -> bool {
        self.shared.close(id)
    }

    pub fn get(&self, id: ChannelId) -> Option<Channel> {
        self.shared.channels.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.shared.channels.contains_key(&id)
    }

    /// State of a live channel; removed channels report `None`.
    pub fn state(&self, id: ChannelId) -> Option<ChannelState> {
        self.shared.channels.get(&id).map(|entry| entry.state())
    }

    pub fn ids(&self) -> Vec<ChannelId> {
        let mut ids: Vec<_> = self.shared.channels.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.shared.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.channels.is_empty()
    }

    /// Best-effort delivery to one channel.
    pub async fn send(&self, id: ChannelId, message: &ChannelMessage) -> SendOutcome {
        let Some(channel) = self.get(id) else {
            return SendOutcome::UnknownChannel;
        };
        deliver(&channel, message).await
    }

    /// Best-effort delivery to every live channel; returns how many took it.
    pub async fn broadcast(&self, message: &ChannelMessage) -> usize {
        let channels: Vec<Channel> = self
            .shared
            .channels
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let mut sent = 0;
        for channel in &channels {
            if deliver(channel, message).await == SendOutcome::Sent {
                sent += 1;
            }
        }
        sent
    }
}

async fn deliver(channel: &Channel, message: &ChannelMessage) -> SendOutcome {
    let ready = channel.handle.ready_state();
    if ready != ReadyState::Open {
        debug!(channel = channel.id, state = ?ready, "channel not ready, message dropped");
        return SendOutcome::NotReady;
    }
    match channel.handle.send(message).await {
        Ok(()) => SendOutcome::Sent,
        Err(err) => {
            warn!(channel = channel.id, error = %err, "channel send failed");
            SendOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelEvent, ChannelRegistry, ChannelState, SendOutcome};
    use crate::channels::{ChannelMessage, MemoryChannel, ReadyState};

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let registry = ChannelRegistry::new();
        let (a, _) = MemoryChannel::new("a");
        let (b, _) = MemoryChannel::new("b");
        let first = registry.register(a);
        registry.close(first.id());
        let second = registry.register(b);
        assert!(second.id() > first.id());
    }

    #[test]
    fn close_a_keeps_b() {
        let registry = ChannelRegistry::new();
        let (a, _) = MemoryChannel::new("a");
        let (b, _) = MemoryChannel::new("b");
        let a = registry.register(a);
        let b = registry.register(b);

        assert!(registry.close(a.id()));
        assert_eq!(registry.ids(), vec![b.id()]);
        assert_eq!(a.state(), ChannelState::Closed);
        assert_eq!(registry.state(b.id()), Some(ChannelState::Open));
        assert!(!registry.close(a.id()));
    }

    #[test]
    fn events_arrive_in_order() {
        let registry = ChannelRegistry::new();
        let mut events = registry.subscribe();
        let (handle, _) = MemoryChannel::new("peer");
        let channel = registry.register(handle.clone());

        assert!(handle.deliver("one"));
        assert!(handle.deliver("two"));
        handle.close();
        assert!(!handle.deliver("late"));

        let id = channel.id();
        assert_eq!(
            events.try_recv().unwrap(),
            ChannelEvent::Opened {
                id,
                label: "peer".to_string()
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            ChannelEvent::Message {
                id,
                message: ChannelMessage::from("one")
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            ChannelEvent::Message {
                id,
                message: ChannelMessage::from("two")
            }
        );
        assert_eq!(events.try_recv().unwrap(), ChannelEvent::Closed { id });
        assert!(events.try_recv().is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn state_follows_the_transport_until_removed() {
        let registry = ChannelRegistry::new();
        let (handle, _) = MemoryChannel::new("peer");
        handle.set_ready_state(ReadyState::Connecting);
        let channel = registry.register(handle.clone());
        assert_eq!(registry.state(channel.id()), Some(ChannelState::Connecting));

        handle.set_ready_state(ReadyState::Open);
        assert_eq!(channel.state(), ChannelState::Open);

        registry.close(channel.id());
        handle.set_ready_state(ReadyState::Open);
        assert_eq!(channel.state(), ChannelState::Closed);
        assert_eq!(registry.state(channel.id()), None);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let registry = ChannelRegistry::new();
        drop(registry.subscribe());
        let mut live = registry.subscribe();
        let (handle, _) = MemoryChannel::new("peer");
        registry.register(handle);
        assert!(matches!(live.try_recv(), Ok(ChannelEvent::Opened { .. })));
    }

    #[tokio::test]
    async fn send_respects_ready_state() {
        let registry = ChannelRegistry::new();
        let (handle, mut outbox) = MemoryChannel::new("peer");
        let channel = registry.register(handle.clone());
        let message = ChannelMessage::from("hello");

        assert_eq!(registry.send(channel.id(), &message).await, SendOutcome::Sent);
        assert_eq!(outbox.try_recv().unwrap(), message);

        handle.set_ready_state(ReadyState::Connecting);
        assert_eq!(registry.send(channel.id(), &message).await, SendOutcome::NotReady);
        assert!(outbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_to_removed_channel_is_noop() {
        let registry = ChannelRegistry::new();
        let (handle, _) = MemoryChannel::new("peer");
        let channel = registry.register(handle);
        registry.close(channel.id());
        let outcome = registry.send(channel.id(), &ChannelMessage::from("x")).await;
        assert_eq!(outcome, SendOutcome::UnknownChannel);
    }

    #[tokio::test]
    async fn send_failure_is_reported_not_raised() {
        let registry = ChannelRegistry::new();
        let (handle, outbox) = MemoryChannel::new("peer");
        let channel = registry.register(handle);
        drop(outbox);
        let outcome = registry.send(channel.id(), &ChannelMessage::from("x")).await;
        assert_eq!(outcome, SendOutcome::Failed);
    }

    #[tokio::test]
    async fn broadcast_skips_channels_not_ready() {
        let registry = ChannelRegistry::new();
        let (open, mut open_rx) = MemoryChannel::new("open");
        let (pending, mut pending_rx) = MemoryChannel::new("pending");
        pending.set_ready_state(ReadyState::Connecting);
        registry.register(open);
        registry.register(pending);

        let sent = registry.broadcast(&ChannelMessage::from("all")).await;
        assert_eq!(sent, 1);
        assert!(open_rx.try_recv().is_ok());
        assert!(pending_rx.try_recv().is_err());
    }
}
