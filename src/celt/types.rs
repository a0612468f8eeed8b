//! Scalar aliases shared by the codec core.
//!
//! Only the floating-point representation is built; the aliases keep the
//! role of each buffer visible at call sites.

/// Time-domain signal sample (pre-emphasised, unscaled PCM units).
pub type CeltSig = f32;
/// Component of a unit-energy band vector.
pub type CeltNorm = f32;
/// Band amplitude (square root of band energy).
pub type CeltEner = f32;
/// Per pitch-band prediction gain.
pub type CeltPGain = f32;
/// Window and table coefficient.
pub type CeltCoef = f32;
/// Accumulator precision.
pub type CeltWord32 = f32;
