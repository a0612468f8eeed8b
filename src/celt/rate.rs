//! Pulse allocation for the residual quantiser.

use super::cwrs::ncwrs;
use super::math::ceil_log2_u64;

/// Upper bound on the pulses spent on a single band.
pub(crate) const CELT_MAX_PULSES: usize = 128;

/// Largest pulse count `k` for a band of `n` coefficients whose codeword
/// fits in `bits` bits, keeping one bit of slack for the range coder.
///
/// The count is additionally capped so that `V(n, k)` fits in 32 bits.
pub(crate) fn bits2pulses(n: usize, bits: i32) -> usize {
    if n == 0 || bits <= 1 {
        return 0;
    }
    let mut best = 0;
    for k in 1..=CELT_MAX_PULSES {
        let v = ncwrs(n, k);
        if !fits_in32(v) || ceil_log2_u64(v) as i32 + 1 > bits {
            break;
        }
        best = k;
    }
    best
}

#[inline]
pub(crate) fn fits_in32(v: u64) -> bool {
    v <= u64::from(u32::MAX)
}
