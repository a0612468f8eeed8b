//! Circular buffer holding the most recent synthesis for every channel.
//!
//! Samples are interleaved. Logical index `0` is the oldest sample still
//! held and `len - 1` the newest; [`RollingHistory::slot`] maps a logical
//! index onto the physical storage so callers never deal with the wrap.

use alloc::vec;
use alloc::vec::Vec;

use super::types::CeltSig;

#[derive(Clone, Debug)]
pub(crate) struct RollingHistory {
    data: Vec<CeltSig>,
    len: usize,
    channels: usize,
    /// Physical frame index of logical index 0.
    head: usize,
}

impl RollingHistory {
    /// Creates a silent history of `len` samples per channel.
    pub(crate) fn new(len: usize, channels: usize) -> Self {
        Self {
            data: vec![0.0; len * channels],
            len,
            channels,
            head: 0,
        }
    }

    /// Samples per channel.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Physical index of logical sample `t` of channel `c`.
    #[inline]
    pub(crate) fn slot(&self, t: usize, c: usize) -> usize {
        debug_assert!(t < self.len && c < self.channels);
        let mut frame = self.head + t;
        if frame >= self.len {
            frame -= self.len;
        }
        frame * self.channels + c
    }

    #[inline]
    pub(crate) fn get(&self, t: usize, c: usize) -> CeltSig {
        self.data[self.slot(t, c)]
    }

    #[inline]
    pub(crate) fn set(&mut self, t: usize, c: usize, value: CeltSig) {
        let idx = self.slot(t, c);
        self.data[idx] = value;
    }

    /// Drops the oldest `samples` per channel and appends as many zeros.
    pub(crate) fn advance(&mut self, samples: usize) {
        debug_assert!(samples <= self.len);
        self.head = (self.head + samples) % self.len;
        for t in self.len - samples..self.len {
            for c in 0..self.channels {
                self.set(t, c, 0.0);
            }
        }
    }

    /// Copies `len` interleaved samples starting at logical index `start`.
    pub(crate) fn copy_segment(&self, start: usize, len: usize, out: &mut [CeltSig]) {
        debug_assert!(start + len <= self.len);
        debug_assert_eq!(out.len(), len * self.channels);
        for (t, frame) in out.chunks_exact_mut(self.channels).enumerate() {
            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = self.get(start + t, c);
            }
        }
    }
}
