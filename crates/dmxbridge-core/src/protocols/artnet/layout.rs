pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

pub const OP_CODE_RANGE: std::ops::Range<usize> = 8..10;
pub const VERSION_RANGE: std::ops::Range<usize> = 10..12;
pub const SEQUENCE_OFFSET: usize = 12;
pub const PHYSICAL_OFFSET: usize = 13;
pub const UNIVERSE_LOW_OFFSET: usize = 14;
pub const UNIVERSE_HIGH_OFFSET: usize = 15;
pub const UNIVERSE_RANGE: std::ops::Range<usize> = 14..16;
pub const LENGTH_RANGE: std::ops::Range<usize> = 16..18;
pub const DMX_DATA_OFFSET: usize = 18;

pub const DMX_MAX_SLOTS: usize = 512;
pub const PROTOCOL_VERSION: u16 = 14;
pub const OP_DMX: u16 = 0x5000;
pub const MAX_UNIVERSE: u16 = 0x7FFF;
