//! Art-Net protocol encoding and decoding.
//!
//! Frames are built by [`ArtNetEncoder`], which stamps each one with the next
//! tick of a shared [`SequenceCounter`]. Two read paths exist: [`decode`] is
//! permissive (header length only, as legacy senders expect) while
//! [`parse_artdmx`] validates the signature, opcode and declared length.
//!
//! Byte offsets live in `layout`, safe reads in `reader`, frame assembly in
//! `writer`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod sequence;
pub mod writer;

pub use error::{ArtNetError, EncodeError};
pub use layout::{DMX_MAX_SLOTS, MAX_UNIVERSE, OP_DMX};
pub use parser::{ArtDmx, DecodedFrame, decode, parse_artdmx};
pub use sequence::SequenceCounter;
pub use writer::{ArtNetEncoder, high_byte, low_byte};
