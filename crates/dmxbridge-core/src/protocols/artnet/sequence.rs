use std::sync::atomic::{AtomicU32, Ordering};

/// Art-Net sequence numbers cycle through `0..MODULUS`.
pub const MODULUS: u32 = 255;

/// Frame sequence counter shared by every encoder of one bridge.
///
/// The n-th call to [`SequenceCounter::next`] yields `n mod 255`, and
/// concurrent callers never receive the same tick.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    next: AtomicU32,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u8 {
        let previous = self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| {
                Some((value + 1) % MODULUS)
            })
            .unwrap_or_else(|value| value);
        previous as u8
    }

    /// The value the next call to [`SequenceCounter::next`] will return.
    pub fn peek(&self) -> u8 {
        self.next.load(Ordering::Acquire) as u8
    }
}
