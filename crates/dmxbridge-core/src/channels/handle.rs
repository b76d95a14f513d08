use async_trait::async_trait;
use serde::Serialize;

use super::error::ChannelError;
use super::registry::ChannelNotifier;

/// Transmission state reported by the transport for one data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// A message carried by a data channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl ChannelMessage {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ChannelMessage::Text(text) => text.as_bytes(),
            ChannelMessage::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<String> for ChannelMessage {
    fn from(value: String) -> Self {
        ChannelMessage::Text(value)
    }
}

impl From<&str> for ChannelMessage {
    fn from(value: &str) -> Self {
        ChannelMessage::Text(value.to_string())
    }
}

impl From<Vec<u8>> for ChannelMessage {
    fn from(value: Vec<u8>) -> Self {
        ChannelMessage::Binary(value)
    }
}

/// An open, message-oriented duplex channel provided by the real-time
/// transport engine.
///
/// The transport keeps the [`ChannelNotifier`] handed to [`DataChannel::attach`]
/// and reports every inbound message and the final close through it, in
/// arrival order.
#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> &str;

    fn ready_state(&self) -> ReadyState;

    fn attach(&self, notifier: ChannelNotifier);

    async fn send(&self, message: &ChannelMessage) -> Result<(), ChannelError>;
}
