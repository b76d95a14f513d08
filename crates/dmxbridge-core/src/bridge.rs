use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::channels::{ChannelEvent, ChannelMessage, ChannelRegistry};
use crate::config::{BridgeConfig, ConfigMessage};
use crate::net::AddressError;
use crate::outputs::OutputSet;
use crate::pipeline::{ControlPayload, ForwardingPipeline};
use crate::protocols::artnet::{ArtNetEncoder, SequenceCounter, decode};

/// Receive buffer size. A larger datagram arrives truncated and then fails
/// payload validation.
const MAX_DATAGRAM: usize = 2048;

enum Step {
    Event(ChannelEvent),
    Datagram(io::Result<(usize, SocketAddr)>),
    Stop,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to bind Art-Net socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid output address: {0}")]
    Address(#[from] AddressError),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Process-scoped bridge state: the shared socket, the channel registry, the
/// output set and the sequence counter, wired into one event loop.
pub struct Bridge {
    config: BridgeConfig,
    socket: Arc<UdpSocket>,
    registry: ChannelRegistry,
    outputs: Arc<OutputSet>,
    pipeline: Arc<ForwardingPipeline>,
    events: Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
}

impl Bridge {
    /// Bind the shared broadcast socket. This is the only fatal failure.
    pub async fn bind(config: BridgeConfig) -> Result<Self, BridgeError> {
        let addr = SocketAddr::new(config.bind_address, config.port);
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| BridgeError::Bind { addr, source })?;
        socket
            .set_broadcast(true)
            .map_err(|source| BridgeError::Bind { addr, source })?;
        let socket = Arc::new(socket);
        info!(local = %socket.local_addr()?, "Art-Net socket bound");

        let registry = ChannelRegistry::new();
        let events = registry.subscribe();
        let outputs = Arc::new(OutputSet::new());
        let encoder = ArtNetEncoder::new(Arc::new(SequenceCounter::new()));
        let pipeline = Arc::new(ForwardingPipeline::new(
            registry.clone(),
            Arc::clone(&outputs),
            encoder,
            socket.clone(),
            config.destination_port(),
        ));

        Ok(Self {
            config,
            socket,
            registry,
            outputs,
            pipeline,
            events: Mutex::new(events),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn local_addr(&self) -> Result<SocketAddr, BridgeError> {
        Ok(self.socket.local_addr()?)
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn outputs(&self) -> &Arc<OutputSet> {
        &self.outputs
    }

    pub fn pipeline(&self) -> &Arc<ForwardingPipeline> {
        &self.pipeline
    }

    /// Replace the output set from a configuration message.
    pub fn apply_config(&self, message: &ConfigMessage) -> Result<usize, BridgeError> {
        let count = self.outputs.replace(message.outputs())?;
        info!(outputs = count, "output set replaced");
        Ok(count)
    }

    /// Parse a raw JSON configuration message and apply it.
    pub fn apply_config_json(&self, raw: &[u8]) -> Result<usize, BridgeError> {
        let message = ConfigMessage::parse(raw)?;
        self.apply_config(&message)
    }

    /// Run the event loop until `shutdown` resolves.
    ///
    /// Channel events are served before socket reads, so every message
    /// already reported by a transport is forwarded before the loop stops.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), BridgeError>
    where
        F: Future<Output = ()>,
    {
        let mut events = self.events.lock().await;
        let mut buf = vec![0u8; MAX_DATAGRAM];
        tokio::pin!(shutdown);

        loop {
            let step = tokio::select! {
                biased;
                Some(event) = events.recv() => Step::Event(event),
                received = self.socket.recv_from(&mut buf) => Step::Datagram(received),
                _ = &mut shutdown => Step::Stop,
            };
            match step {
                Step::Event(event) => self.handle_event(event).await,
                Step::Datagram(Ok((len, from))) => self.distribute_inbound(&buf[..len], from).await,
                Step::Datagram(Err(err)) => warn!(error = %err, "Art-Net receive failed"),
                Step::Stop => break,
            }
        }
        info!("bridge stopped");
        Ok(())
    }

    async fn handle_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened { id, label } => {
                debug!(channel = id, label = %label, "channel ready")
            }
            // The notifier only queues messages while the channel is live.
            ChannelEvent::Message { id, message } => {
                if let Err(err) = self.pipeline.forward_message(&message).await {
                    warn!(channel = id, error = %err, "control message dropped");
                }
            }
            ChannelEvent::Closed { id } => debug!(channel = id, "channel released"),
        }
    }

    /// Decode an inbound datagram and hand it to every open channel.
    async fn distribute_inbound(&self, datagram: &[u8], from: SocketAddr) {
        if self.is_own_frame(from) {
            return;
        }
        let frame = match decode(datagram) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(from = %from, error = %err, "inbound datagram dropped");
                return;
            }
        };
        let payload = ControlPayload::from(frame);
        if let Err(err) = payload.validate() {
            debug!(from = %from, error = %err, "inbound frame out of range, dropped");
            return;
        }
        let json = match payload.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "inbound payload serialization failed");
                return;
            }
        };
        let delivered = self.registry.broadcast(&ChannelMessage::Text(json)).await;
        debug!(
            from = %from,
            universe = payload.universe,
            channels = delivered,
            "inbound frame relayed"
        );
    }

    /// Our own broadcasts loop back through the shared socket.
    fn is_own_frame(&self, from: SocketAddr) -> bool {
        let Ok(local) = self.socket.local_addr() else {
            return false;
        };
        from.port() == local.port()
            && self
                .outputs
                .snapshot()
                .iter()
                .any(|output| from.ip() == output.interface_address)
    }
}
