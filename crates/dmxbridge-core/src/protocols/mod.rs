//! Protocol modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access and protocol conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `writer`: frame assembly
//! - `error`: explicit, actionable errors
//!
//! Codecs are pure apart from the sequence counter; sockets and channels are
//! handled by the pipeline and bridge layers.

pub mod artnet;
