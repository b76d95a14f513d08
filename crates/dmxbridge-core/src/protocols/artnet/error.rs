use thiserror::Error;

/// Errors returned by Art-Net decoding and reading.
///
/// # Examples
/// ```
/// use dmxbridge_core::protocols::artnet::ArtNetError;
///
/// let err = ArtNetError::TooShort { needed: 18, actual: 4 };
/// assert!(err.to_string().contains("payload too short"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtNetError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid ArtDMX length: {length}")]
    InvalidLength { length: u16 },
}

/// Errors returned when building an Art-Net frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("universe {universe} exceeds 15 bits")]
    UniverseOutOfRange { universe: u16 },
    #[error("payload too long: {len} bytes, at most 512 allowed")]
    PayloadTooLong { len: usize },
}
