use std::sync::Arc;

use super::error::EncodeError;
use super::layout;
use super::sequence::SequenceCounter;

pub fn low_byte(value: u16) -> u8 {
    (value & 0xFF) as u8
}

pub fn high_byte(value: u16) -> u8 {
    ((value >> 8) & 0xFF) as u8
}

/// Builds Art-Net frames, stamping each with the next sequence tick.
#[derive(Debug, Clone, Default)]
pub struct ArtNetEncoder {
    sequence: Arc<SequenceCounter>,
}

impl ArtNetEncoder {
    pub fn new(sequence: Arc<SequenceCounter>) -> Self {
        Self { sequence }
    }

    pub fn sequence(&self) -> &Arc<SequenceCounter> {
        &self.sequence
    }

    /// Encode `payload` for `universe` under `opcode`.
    ///
    /// The sequence counter only advances when the frame is actually built.
    pub fn encode(
        &self,
        opcode: u16,
        universe: u16,
        payload: &[u8],
    ) -> Result<Vec<u8>, EncodeError> {
        if universe > layout::MAX_UNIVERSE {
            return Err(EncodeError::UniverseOutOfRange { universe });
        }
        if payload.len() > layout::DMX_MAX_SLOTS {
            return Err(EncodeError::PayloadTooLong { len: payload.len() });
        }
        let length = payload.len() as u16;

        let mut frame = Vec::with_capacity(layout::DMX_DATA_OFFSET + payload.len());
        frame.extend_from_slice(layout::ARTNET_ID);
        frame.push(low_byte(opcode));
        frame.push(high_byte(opcode));
        frame.push(high_byte(layout::PROTOCOL_VERSION));
        frame.push(low_byte(layout::PROTOCOL_VERSION));
        frame.push(self.sequence.next());
        frame.push(0);
        frame.push(low_byte(universe));
        frame.push(high_byte(universe));
        frame.push(high_byte(length));
        frame.push(low_byte(length));
        frame.extend_from_slice(payload);
        Ok(frame)
    }

    pub fn encode_artdmx(&self, universe: u16, payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
        self.encode(layout::OP_DMX, universe, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::{ArtNetEncoder, high_byte, low_byte};
    use crate::protocols::artnet::error::EncodeError;
    use crate::protocols::artnet::layout;
    use crate::protocols::artnet::parser::{decode, parse_artdmx};

    #[test]
    fn splits_bytes() {
        assert_eq!(low_byte(0x5000), 0x00);
        assert_eq!(high_byte(0x5000), 0x50);
        assert_eq!(low_byte(0x7FFF), 0xFF);
        assert_eq!(high_byte(0x7FFF), 0x7F);
    }

    #[test]
    fn empty_payload_is_header_only() {
        let encoder = ArtNetEncoder::default();
        let frame = encoder.encode_artdmx(0, &[]).unwrap();
        assert_eq!(frame.len(), layout::DMX_DATA_OFFSET);
        assert_eq!(&frame[layout::LENGTH_RANGE.clone()], &[0x00, 0x00]);
    }

    #[test]
    fn header_layout() {
        let encoder = ArtNetEncoder::default();
        let frame = encoder.encode_artdmx(0x0203, &[10, 20, 30]).unwrap();
        assert_eq!(&frame[..8], layout::ARTNET_ID);
        assert_eq!(&frame[layout::OP_CODE_RANGE.clone()], &[0x00, 0x50]);
        assert_eq!(&frame[layout::VERSION_RANGE.clone()], &[0x00, 0x0E]);
        assert_eq!(frame[layout::SEQUENCE_OFFSET], 0);
        assert_eq!(frame[layout::PHYSICAL_OFFSET], 0);
        assert_eq!(frame[layout::UNIVERSE_LOW_OFFSET], 0x03);
        assert_eq!(frame[layout::UNIVERSE_HIGH_OFFSET], 0x02);
        assert_eq!(&frame[layout::LENGTH_RANGE.clone()], &[0x00, 0x03]);
        assert_eq!(&frame[layout::DMX_DATA_OFFSET..], &[10, 20, 30]);
    }

    #[test]
    fn full_universe_length_is_big_endian() {
        let encoder = ArtNetEncoder::default();
        let frame = encoder.encode_artdmx(1, &[0xAA; 512]).unwrap();
        assert_eq!(frame.len(), layout::DMX_DATA_OFFSET + 512);
        assert_eq!(&frame[layout::LENGTH_RANGE.clone()], &[0x02, 0x00]);
    }

    #[test]
    fn round_trips_through_both_decoders() {
        let encoder = ArtNetEncoder::default();
        for (universe, len) in [(0u16, 0usize), (1, 1), (255, 2), (256, 17), (0x7FFF, 512)] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
            let frame = encoder.encode_artdmx(universe, &payload).unwrap();

            let decoded = decode(&frame).unwrap();
            assert_eq!(decoded.universe, universe);
            assert_eq!(decoded.payload, payload);

            let parsed = parse_artdmx(&frame).unwrap().unwrap();
            assert_eq!(parsed.universe, universe);
            assert_eq!(parsed.data, payload);
        }
    }

    #[test]
    fn sequence_advances_per_frame() {
        let encoder = ArtNetEncoder::default();
        for n in 0..300u32 {
            let frame = encoder.encode_artdmx(0, &[]).unwrap();
            assert_eq!(frame[layout::SEQUENCE_OFFSET] as u32, n % 255);
        }
    }

    #[test]
    fn rejects_universe_over_15_bits() {
        let encoder = ArtNetEncoder::default();
        let err = encoder.encode_artdmx(0x8000, &[]).unwrap_err();
        assert_eq!(err, EncodeError::UniverseOutOfRange { universe: 0x8000 });
        assert_eq!(encoder.sequence().peek(), 0);
    }

    #[test]
    fn rejects_oversized_payload() {
        let encoder = ArtNetEncoder::default();
        let err = encoder.encode_artdmx(0, &[0u8; 513]).unwrap_err();
        assert_eq!(err, EncodeError::PayloadTooLong { len: 513 });
    }
}
