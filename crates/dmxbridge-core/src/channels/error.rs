use thiserror::Error;

/// Errors a transport reports when a channel cannot take a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel is closed")]
    Closed,
    #[error("transport error: {0}")]
    Transport(String),
}
