//! In-memory wire with fault injection.
//!
//! A [`Wire`] is a one-way FIFO of sealed frames. Faults are applied to the
//! frames already queued, so a test decides exactly which message gets
//! corrupted, lost, replayed or reordered.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

/// Corruption applied to queued frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// XOR `mask` into byte `offset` of the newest frame.
    ///
    /// Out-of-range offsets leave the frame untouched.
    Tamper {
        /// Byte to corrupt.
        offset: usize,
        /// Bits to flip.
        mask: u8,
    },
    /// Lose the newest frame.
    Drop,
    /// Deliver the newest frame twice.
    Duplicate,
    /// Swap the two newest frames.
    Reorder,
    /// Cut the newest frame down to `len` bytes.
    Truncate {
        /// Remaining length.
        len: usize,
    },
}

/// One direction of a simulated connection.
#[derive(Debug, Default)]
pub struct Wire {
    frames: VecDeque<Bytes>,
    sent: usize,
    faults: usize,
}

impl Wire {
    /// Empty wire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a frame.
    pub fn push(&mut self, frame: impl Into<Bytes>) {
        self.frames.push_back(frame.into());
        self.sent += 1;
    }

    /// Takes the oldest queued frame.
    pub fn pop(&mut self) -> Option<Bytes> {
        self.frames.pop_front()
    }

    /// Frames waiting for delivery.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames pushed over the wire's lifetime.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Faults applied over the wire's lifetime.
    pub fn faults(&self) -> usize {
        self.faults
    }

    /// Applies `fault` to the queued frames.
    ///
    /// Returns `false` when there was nothing to apply it to.
    pub fn inject(&mut self, fault: Fault) -> bool {
        let applied = match fault {
            Fault::Tamper { offset, mask } => match self.frames.pop_back() {
                Some(frame) => {
                    let mut bytes = BytesMut::from(&frame[..]);
                    if let Some(byte) = bytes.get_mut(offset) {
                        *byte ^= mask;
                    }
                    self.frames.push_back(bytes.freeze());
                    true
                },
                None => false,
            },
            Fault::Drop => self.frames.pop_back().is_some(),
            Fault::Duplicate => match self.frames.back().cloned() {
                Some(frame) => {
                    self.frames.push_back(frame);
                    true
                },
                None => false,
            },
            Fault::Reorder => {
                let len = self.frames.len();
                if len >= 2 {
                    self.frames.swap(len - 1, len - 2);
                }
                len >= 2
            },
            Fault::Truncate { len } => match self.frames.back_mut() {
                Some(frame) => {
                    frame.truncate(len);
                    true
                },
                None => false,
            },
        };

        if applied {
            self.faults += 1;
            tracing::debug!(?fault, queued = self.frames.len(), "fault injected");
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_with(frames: &[&'static [u8]]) -> Wire {
        let mut wire = Wire::new();
        for frame in frames {
            wire.push(Bytes::from_static(frame));
        }
        wire
    }

    #[test]
    fn fifo_order() {
        let mut wire = wire_with(&[b"a", b"b"]);

        assert_eq!(wire.pop().as_deref(), Some(&b"a"[..]));
        assert_eq!(wire.pop().as_deref(), Some(&b"b"[..]));
        assert!(wire.pop().is_none());
        assert_eq!(wire.sent(), 2);
    }

    #[test]
    fn tamper_flips_bits_in_newest_frame() {
        let mut wire = wire_with(&[b"aaa", b"bbb"]);

        assert!(wire.inject(Fault::Tamper { offset: 1, mask: 0x01 }));

        assert_eq!(wire.pop().as_deref(), Some(&b"aaa"[..]));
        assert_eq!(wire.pop().as_deref(), Some(&b"bcb"[..]));
    }

    #[test]
    fn tamper_out_of_range_is_noop() {
        let mut wire = wire_with(&[b"x"]);

        assert!(wire.inject(Fault::Tamper { offset: 10, mask: 0xff }));
        assert_eq!(wire.pop().as_deref(), Some(&b"x"[..]));
    }

    #[test]
    fn drop_duplicate_reorder() {
        let mut wire = wire_with(&[b"1", b"2", b"3"]);

        assert!(wire.inject(Fault::Drop));
        assert!(wire.inject(Fault::Reorder));
        assert!(wire.inject(Fault::Duplicate));

        let delivered: Vec<_> = std::iter::from_fn(|| wire.pop()).collect();
        assert_eq!(delivered, vec![&b"2"[..], b"1", b"1"]);
        assert_eq!(wire.faults(), 3);
    }

    #[test]
    fn truncate_shortens_frame() {
        let mut wire = wire_with(&[b"abcdef"]);

        assert!(wire.inject(Fault::Truncate { len: 2 }));
        assert_eq!(wire.pop().as_deref(), Some(&b"ab"[..]));
    }

    #[test]
    fn faults_on_empty_wire_do_nothing() {
        let mut wire = Wire::new();

        assert!(!wire.inject(Fault::Drop));
        assert!(!wire.inject(Fault::Duplicate));
        assert!(!wire.inject(Fault::Reorder));
        assert!(!wire.inject(Fault::Tamper { offset: 0, mask: 1 }));
        assert!(!wire.inject(Fault::Truncate { len: 0 }));
        assert_eq!(wire.faults(), 0);
    }
}
