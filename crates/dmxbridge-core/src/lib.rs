//! dmxbridge core library: peer data channels to Art-Net and back.
//!
//! Peers reach the bridge through message-oriented data channels established
//! by an external real-time transport. Each channel is owned by the
//! [`ChannelRegistry`]; its JSON control messages flow through the
//! [`ForwardingPipeline`], which encodes one ArtDmx frame per message and
//! broadcasts it to every configured [`Output`] on a single shared UDP
//! socket. Inbound Art-Net datagrams travel the opposite way and reach every
//! open channel as JSON.
//!
//! Invariants:
//! - Sequence numbers advance once per encoded frame and cycle `0..=254`.
//! - The output set is swapped atomically; a frame never reaches a mix of
//!   old and new outputs.
//! - Channel ids are monotonic and never reused; operations on a removed
//!   channel are no-ops.
//! - Per-message failures are logged and dropped, never fatal.
//!
//! Version française (résumé):
//! Cette crate relie des canaux de données pair-à-pair à Art-Net : messages
//! JSON -> trame ArtDmx -> diffusion vers chaque sortie configurée, et le
//! chemin inverse pour les trames reçues. Les erreurs par message sont
//! journalisées puis ignorées.
//!
//! # Examples
//! ```no_run
//! use dmxbridge_core::{Bridge, BridgeConfig, ConfigMessage, MemoryChannel};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let bridge = Bridge::bind(BridgeConfig::default()).await?;
//! bridge.apply_config(&ConfigMessage::parse(
//!     br#"[{"name":"lan","address":"192.168.1.10","mask":"255.255.255.0"}]"#,
//! )?)?;
//!
//! let (channel, _replies) = MemoryChannel::new("console");
//! bridge.registry().register(channel.clone());
//! channel.deliver(r#"{"universe":0,"channelValues":[255,128,0]}"#);
//!
//! bridge
//!     .run(tokio::time::sleep(std::time::Duration::from_secs(5)))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod bridge;
pub mod channels;
mod config;
pub mod net;
pub mod outputs;
pub mod pipeline;
pub mod protocols;

pub use bridge::{Bridge, BridgeError};
pub use channels::{
    Channel, ChannelError, ChannelEvent, ChannelId, ChannelMessage, ChannelNotifier,
    ChannelRegistry, ChannelState, DataChannel, MemoryChannel, ReadyState, SendOutcome,
};
pub use config::{BridgeConfig, ConfigMessage, DEFAULT_ARTNET_PORT};
pub use outputs::{InterfaceAddr, Output, OutputSet, OutputSpec};
pub use pipeline::{
    ControlPayload, DatagramSink, ForwardError, ForwardOutcome, ForwardReport, ForwardingPipeline,
    PayloadError,
};
pub use protocols::artnet::{ArtNetEncoder, ArtNetError, EncodeError, SequenceCounter};
