use thiserror::Error;

/// Errors returned for malformed dotted-decimal IPv4 input.
///
/// # Examples
/// ```
/// use dmxbridge_core::net::{AddressError, parse_ipv4};
///
/// let err = parse_ipv4("10.0.0").unwrap_err();
/// assert_eq!(err, AddressError::OctetCount { input: "10.0.0".to_string(), count: 3 });
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address '{input}': expected 4 octets, got {count}")]
    OctetCount { input: String, count: usize },
    #[error("invalid address '{input}': octet '{octet}' is not numeric")]
    NonNumeric { input: String, octet: String },
    #[error("invalid address '{input}': octet {value} is out of range 0-255")]
    OutOfRange { input: String, value: u64 },
}
