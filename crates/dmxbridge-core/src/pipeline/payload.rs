use serde::{Deserialize, Serialize};

use super::error::PayloadError;
use crate::protocols::artnet::{DMX_MAX_SLOTS, DecodedFrame, MAX_UNIVERSE};

/// DMX values for one universe, as exchanged with peers in JSON.
///
/// # Examples
/// ```
/// use dmxbridge_core::ControlPayload;
///
/// let payload = ControlPayload::parse(br#"{"universe":2,"channelValues":[0,128,255]}"#)?;
/// assert_eq!(payload.universe, 2);
/// assert_eq!(payload.channel_values, vec![0, 128, 255]);
/// # Ok::<(), dmxbridge_core::PayloadError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPayload {
    pub universe: u16,
    pub channel_values: Vec<u8>,
}

impl ControlPayload {
    /// Parse and range-check a raw message.
    pub fn parse(raw: &[u8]) -> Result<Self, PayloadError> {
        let payload: ControlPayload = serde_json::from_slice(raw)?;
        payload.validate()?;
        Ok(payload)
    }

    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.universe > MAX_UNIVERSE {
            return Err(PayloadError::UniverseOutOfRange {
                universe: self.universe,
            });
        }
        if self.channel_values.len() > DMX_MAX_SLOTS {
            return Err(PayloadError::TooManyValues {
                count: self.channel_values.len(),
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<DecodedFrame> for ControlPayload {
    fn from(frame: DecodedFrame) -> Self {
        Self {
            universe: frame.universe,
            channel_values: frame.payload,
        }
    }
}
