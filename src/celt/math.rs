//! Scalar helpers shared by the analysis and quantisation stages.

use libm::{expf, logf, sqrtf};

/// Base-2 logarithm.
#[inline]
pub(crate) fn celt_log2(x: f32) -> f32 {
    // 1 / ln(2)
    const INV_LN_2: f32 = 1.442_695_040_888_963_4;
    INV_LN_2 * logf(x)
}

/// Base-2 exponential.
#[inline]
pub(crate) fn celt_exp2(x: f32) -> f32 {
    // ln(2)
    const LN_2: f32 = 0.693_147_180_559_945_3;
    expf(LN_2 * x)
}

#[inline]
pub(crate) fn celt_sqrt(x: f32) -> f32 {
    sqrtf(x)
}

/// Dot product of two equally sized slices.
#[inline]
pub(crate) fn celt_inner_prod(x: &[f32], y: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(&a, &b)| a * b).sum()
}

/// Sum of squares of a slice.
#[inline]
pub(crate) fn celt_energy(x: &[f32]) -> f32 {
    x.iter().map(|&v| v * v).sum()
}

/// Smallest `b` such that `2^b >= v`.
#[inline]
pub(crate) fn ceil_log2_u64(v: u64) -> u32 {
    if v <= 1 {
        0
    } else {
        64 - (v - 1).leading_zeros()
    }
}
