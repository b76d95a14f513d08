use std::net::{SocketAddr, SocketAddrV4};
use std::sync::Arc;

use tracing::{debug, error};

use super::error::ForwardError;
use super::payload::ControlPayload;
use super::sink::DatagramSink;
use crate::channels::{ChannelId, ChannelMessage, ChannelRegistry};
use crate::outputs::OutputSet;
use crate::protocols::artnet::{ArtNetEncoder, EncodeError, layout};

/// Per-frame delivery summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReport {
    pub universe: u16,
    pub sequence: u8,
    pub frame_len: usize,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The channel was already removed; nothing was sent.
    UnknownChannel,
    Forwarded(ForwardReport),
}

/// Turns channel messages into ArtDmx datagrams on every configured output.
pub struct ForwardingPipeline {
    registry: ChannelRegistry,
    outputs: Arc<OutputSet>,
    encoder: ArtNetEncoder,
    sink: Arc<dyn DatagramSink>,
    destination_port: u16,
}

impl ForwardingPipeline {
    pub fn new(
        registry: ChannelRegistry,
        outputs: Arc<OutputSet>,
        encoder: ArtNetEncoder,
        sink: Arc<dyn DatagramSink>,
        destination_port: u16,
    ) -> Self {
        Self {
            registry,
            outputs,
            encoder,
            sink,
            destination_port,
        }
    }

    pub fn destination_port(&self) -> u16 {
        self.destination_port
    }

    pub fn encoder(&self) -> &ArtNetEncoder {
        &self.encoder
    }

    /// Handle one raw message received on `channel_id`.
    pub async fn on_message(
        &self,
        channel_id: ChannelId,
        raw: &ChannelMessage,
    ) -> Result<ForwardOutcome, ForwardError> {
        if !self.registry.contains(channel_id) {
            debug!(channel = channel_id, "message for removed channel skipped");
            return Ok(ForwardOutcome::UnknownChannel);
        }
        let report = self.forward_message(raw).await?;
        Ok(ForwardOutcome::Forwarded(report))
    }

    /// Parse and forward a message without a registry lookup.
    ///
    /// For messages already accepted by a live channel's notifier; they are
    /// forwarded even if the channel closed after reporting them.
    pub async fn forward_message(
        &self,
        raw: &ChannelMessage,
    ) -> Result<ForwardReport, ForwardError> {
        let payload = ControlPayload::parse(raw.as_bytes())?;
        Ok(self.forward(&payload).await?)
    }

    /// Encode `payload` once and send the frame to every output.
    ///
    /// The output set is read once, so the frame reaches either the whole
    /// old set or the whole new one when a replacement races this call.
    pub async fn forward(&self, payload: &ControlPayload) -> Result<ForwardReport, EncodeError> {
        let frame = self
            .encoder
            .encode_artdmx(payload.universe, &payload.channel_values)?;
        let outputs = self.outputs.snapshot();

        let mut report = ForwardReport {
            universe: payload.universe,
            sequence: frame[layout::SEQUENCE_OFFSET],
            frame_len: frame.len(),
            attempted: outputs.len(),
            delivered: 0,
            failed: 0,
        };
        for output in outputs.iter() {
            let target = SocketAddr::V4(SocketAddrV4::new(
                output.broadcast_address,
                self.destination_port,
            ));
            match self.sink.send_to(&frame, target).await {
                Ok(_) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    error!(
                        output = %output.name,
                        target = %target,
                        error = %err,
                        "Art-Net send failed"
                    );
                }
            }
        }
        debug!(
            universe = report.universe,
            sequence = report.sequence,
            outputs = report.attempted,
            delivered = report.delivered,
            "frame forwarded"
        );
        Ok(report)
    }
}
