//! Conversion of de-emphasised samples back to 16-bit PCM.

use libm::roundf;

/// Saturates a sample to `[-32767, 32767]` and rounds it to the nearest
/// integer, halves away from zero.
#[must_use]
pub(crate) fn sig2int16(value: f32) -> i16 {
    // NaN never reaches here in practice; map it to silence if it does.
    if value.is_nan() {
        return 0;
    }
    roundf(value.clamp(-32_767.0, 32_767.0)) as i16
}
