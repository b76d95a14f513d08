//! Data channel ownership and event dispatch.
//!
//! The [`ChannelRegistry`] owns every open channel, assigns ids from a
//! monotonic counter and fans transport notifications out to subscribers as
//! [`ChannelEvent`]s. Events of one channel keep their arrival order; there
//! is no ordering across channels.

pub mod error;
pub mod handle;
pub mod memory;
pub mod registry;

pub use error::ChannelError;
pub use handle::{ChannelMessage, DataChannel, ReadyState};
pub use memory::MemoryChannel;
pub use registry::{
    Channel, ChannelEvent, ChannelId, ChannelNotifier, ChannelRegistry, ChannelState, SendOutcome,
};
