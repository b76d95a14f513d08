use thiserror::Error;

/// Errors for inbound control messages that cannot be forwarded.
///
/// # Examples
/// ```
/// use dmxbridge_core::ControlPayload;
///
/// let err = ControlPayload::parse(br#"{"universe": 1}"#).unwrap_err();
/// assert!(err.to_string().contains("malformed control payload"));
/// ```
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed control payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("universe {universe} out of range 0-32767")]
    UniverseOutOfRange { universe: u16 },
    #[error("too many channel values: {count}, at most 512 allowed")]
    TooManyValues { count: usize },
}

/// Why a channel message was not forwarded.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("encoding failed: {0}")]
    Encode(#[from] crate::protocols::artnet::EncodeError),
}
