//! IPv4 address arithmetic for output configuration.

pub mod broadcast;
pub mod error;

pub use broadcast::{broadcast_address, parse_ipv4, resolve};
pub use error::AddressError;
