//! Peer message forwarding.
//!
//! A channel message is parsed into a [`ControlPayload`], encoded once as an
//! ArtDmx frame and written to the broadcast address of every output through
//! the shared [`DatagramSink`]. Delivery is fire-and-forget per output: there
//! is no retry, no queue and no backpressure.

pub mod error;
pub mod forward;
pub mod payload;
pub mod sink;

pub use error::{ForwardError, PayloadError};
pub use forward::{ForwardOutcome, ForwardReport, ForwardingPipeline};
pub use payload::ControlPayload;
pub use sink::DatagramSink;
