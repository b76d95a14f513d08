use super::error::ArtNetError;
use super::layout;
use super::reader::ArtNetReader;

/// Universe and channel values recovered from a received frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub universe: u16,
    pub payload: Vec<u8>,
}

/// Decode any frame long enough to carry the ArtDmx header.
///
/// This read path is permissive: neither the `Art-Net` identifier nor the
/// opcode is checked, and the payload is every byte after the header
/// regardless of the declared length. Use [`parse_artdmx`] for the strict
/// variant.
pub fn decode(frame: &[u8]) -> Result<DecodedFrame, ArtNetError> {
    let reader = ArtNetReader::new(frame);
    reader.require_len(layout::DMX_DATA_OFFSET)?;

    let low = reader.read_u8(layout::UNIVERSE_LOW_OFFSET)? as u16;
    let high = reader.read_u8(layout::UNIVERSE_HIGH_OFFSET)? as u16;
    let payload = reader.read_tail(layout::DMX_DATA_OFFSET)?;

    Ok(DecodedFrame {
        universe: low | (high << 8),
        payload: payload.to_vec(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtDmx {
    pub universe: u16,
    pub sequence: Option<u8>,
    pub data: Vec<u8>,
}

/// Strictly parse an ArtDmx frame.
///
/// Returns `Ok(None)` for frames that are not Art-Net or carry another
/// opcode.
pub fn parse_artdmx(payload: &[u8]) -> Result<Option<ArtDmx>, ArtNetError> {
    let reader = ArtNetReader::new(payload);
    reader.require_len(layout::DMX_DATA_OFFSET)?;

    let signature = reader.read_signature()?;
    if signature != layout::ARTNET_ID {
        return Ok(None);
    }

    let opcode = reader.read_u16_le(layout::OP_CODE_RANGE.clone())?;
    if opcode != layout::OP_DMX {
        return Ok(None);
    }

    let sequence = reader.read_optional_nonzero_u8(layout::SEQUENCE_OFFSET)?;
    let universe = reader.read_u16_le(layout::UNIVERSE_RANGE.clone())?;
    let length = reader.read_u16_be(layout::LENGTH_RANGE.clone())?;
    if length as usize > layout::DMX_MAX_SLOTS {
        return Err(ArtNetError::InvalidLength { length });
    }

    let needed = layout::DMX_DATA_OFFSET + length as usize;
    reader.require_len(needed)?;
    let data = reader.read_slice(layout::DMX_DATA_OFFSET..needed)?;

    Ok(Some(ArtDmx {
        universe,
        sequence,
        data: data.to_vec(),
    }))
}
