use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::outputs::OutputSpec;

/// Standard Art-Net UDP port.
pub const DEFAULT_ARTNET_PORT: u16 = 6454;

/// Socket settings for a bridge.
///
/// # Examples
/// ```
/// use dmxbridge_core::BridgeConfig;
///
/// let config: BridgeConfig = serde_json::from_str(r#"{"port": 6455}"#)?;
/// assert_eq!(config.port, 6455);
/// assert_eq!(config.destination_port(), 6455);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Local address the shared socket binds to.
    pub bind_address: IpAddr,
    /// Local port; also the destination port unless overridden.
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<u16>,
}

impl BridgeConfig {
    pub fn destination_port(&self) -> u16 {
        self.destination_port.unwrap_or(self.port)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_ARTNET_PORT,
            destination_port: None,
        }
    }
}

/// Output configuration update: `{"outputs": [...]}` or a bare list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigMessage {
    Outputs { outputs: Vec<OutputSpec> },
    List(Vec<OutputSpec>),
}

impl ConfigMessage {
    pub fn parse(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    pub fn outputs(&self) -> &[OutputSpec] {
        match self {
            ConfigMessage::Outputs { outputs } => outputs,
            ConfigMessage::List(outputs) => outputs,
        }
    }

    pub fn into_outputs(self) -> Vec<OutputSpec> {
        match self {
            ConfigMessage::Outputs { outputs } => outputs,
            ConfigMessage::List(outputs) => outputs,
        }
    }
}
