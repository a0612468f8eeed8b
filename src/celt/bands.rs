//! Per-band energy normalisation, stereo mixing, pitch gains and residual
//! coding.
//!
//! Spectra are laid out as produced by `compute_mdcts`: for a band spanning
//! bins `e[i]..e[i + 1]`, channel `c` owns indices `j * C + c` for
//! `j in B * e[i]..B * e[i + 1]`.

use alloc::vec;
use alloc::vec::Vec;

use super::cwrs::{decode_pulses, encode_pulses};
use super::entdec::EcDec;
use super::entenc::EcEnc;
use super::math::{celt_energy, celt_inner_prod, celt_sqrt};
use super::modes::CeltMode;
use super::rate::bits2pulses;
use super::types::{CeltEner, CeltNorm, CeltPGain, CeltSig};
use super::vq::{add_pulses, op_pvq_search, renormalise_vector};

const EPSILON: f32 = 1e-15;

/// Regularises the pitch gain denominator for near-silent predictions.
const PITCH_GAIN_BIAS: f32 = 0.001;

/// Quantisation step of the residual gain.
const RESIDUAL_GAIN_STEP: f32 = 0.1875;
const RESIDUAL_GAIN_LEVELS: u32 = 16;
/// Bits reserved for the residual gain index before pulses are allotted.
const RESIDUAL_GAIN_BITS: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MixDirection {
    /// Left/right into the energy-weighted mid/side basis.
    Forward,
    /// Back to left/right.
    Inverse,
}

/// Computes the amplitude (square root of energy) of every band and channel,
/// stored at `bank[band * C + channel]`.
pub(crate) fn compute_band_energies(mode: &CeltMode, freq: &[CeltSig], bank: &mut [CeltEner]) {
    let channels = mode.channels();
    let b = mode.nb_blocks();
    for (i, edges) in mode.e_bands().windows(2).enumerate() {
        for c in 0..channels {
            let sum: f32 = (b * edges[0]..b * edges[1])
                .map(|j| {
                    let v = freq[j * channels + c];
                    v * v
                })
                .sum();
            bank[i * channels + c] = celt_sqrt(EPSILON + sum);
        }
    }
}

/// Divides each band by its amplitude.
pub(crate) fn normalise_bands(mode: &CeltMode, freq: &[CeltSig], x: &mut [CeltNorm], bank: &[CeltEner]) {
    let channels = mode.channels();
    let b = mode.nb_blocks();
    for (i, edges) in mode.e_bands().windows(2).enumerate() {
        for c in 0..channels {
            let g = 1.0 / (EPSILON + bank[i * channels + c]);
            for j in b * edges[0]..b * edges[1] {
                x[j * channels + c] = freq[j * channels + c] * g;
            }
        }
    }
}

/// Scales each unit-energy band back by its amplitude.
pub(crate) fn denormalise_bands(mode: &CeltMode, x: &[CeltNorm], freq: &mut [CeltSig], bank: &[CeltEner]) {
    let channels = mode.channels();
    let b = mode.nb_blocks();
    for (i, edges) in mode.e_bands().windows(2).enumerate() {
        for c in 0..channels {
            let g = bank[i * channels + c];
            for j in b * edges[0]..b * edges[1] {
                freq[j * channels + c] = x[j * channels + c] * g;
            }
        }
    }
}

/// Rescales every band of every channel to unit energy. Silent bands stay
/// silent.
pub(crate) fn renormalise_bands(mode: &CeltMode, x: &mut [CeltNorm]) {
    let channels = mode.channels();
    let b = mode.nb_blocks();
    for edges in mode.e_bands().windows(2) {
        for c in 0..channels {
            let range = b * edges[0]..b * edges[1];
            let energy: f32 = range
                .clone()
                .map(|j| x[j * channels + c] * x[j * channels + c])
                .sum();
            if energy <= EPSILON {
                continue;
            }
            let g = 1.0 / celt_sqrt(energy);
            for j in range {
                x[j * channels + c] *= g;
            }
        }
    }
}

/// Rotates the two channels of each band by the angle given by their
/// amplitudes. [`MixDirection::Inverse`] undoes [`MixDirection::Forward`].
pub(crate) fn stereo_mix(mode: &CeltMode, x: &mut [CeltNorm], bank: &[CeltEner], dir: MixDirection) {
    debug_assert_eq!(mode.channels(), 2);
    let b = mode.nb_blocks();
    let sign = match dir {
        MixDirection::Forward => 1.0,
        MixDirection::Inverse => -1.0,
    };
    for (i, edges) in mode.e_bands().windows(2).enumerate() {
        let left = bank[i * 2];
        let right = bank[i * 2 + 1];
        let norm = EPSILON + celt_sqrt(EPSILON + left * left + right * right);
        let a1 = left / norm;
        let a2 = sign * right / norm;
        for j in b * edges[0]..b * edges[1] {
            let l = x[j * 2];
            let r = x[j * 2 + 1];
            x[j * 2] = a1 * l + a2 * r;
            x[j * 2 + 1] = a1 * r - a2 * l;
        }
    }
}

/// Least-squares gain of `p` against `x` over each pitch band, clamped to
/// `[0, 1)`.
pub(crate) fn compute_pitch_gain(mode: &CeltMode, x: &[CeltNorm], p: &[CeltNorm], gains: &mut [CeltPGain]) {
    let stride = mode.nb_blocks() * mode.channels();
    for (gain, edges) in gains.iter_mut().zip(mode.p_bands().windows(2)) {
        let range = stride * edges[0]..stride * edges[1];
        let sxx = celt_energy(&p[range.clone()]);
        let sxy = celt_inner_prod(&x[range.clone()], &p[range]).clamp(0.0, sxx);
        *gain = sxy / (sxx + PITCH_GAIN_BIAS);
    }
}

/// Applies the quantised pitch gains to `p` and clears every bin outside the
/// pitch bands, so bins no gain covers are never predicted.
pub(crate) fn pitch_quant_bands(mode: &CeltMode, p: &mut [CeltNorm], gains: &[CeltPGain]) {
    let stride = mode.nb_blocks() * mode.channels();
    let p_bands = mode.p_bands();
    for (&gain, edges) in gains.iter().zip(p_bands.windows(2)) {
        for v in &mut p[stride * edges[0]..stride * edges[1]] {
            *v *= gain;
        }
    }
    let first = p_bands.first().copied().unwrap_or(0);
    let last = p_bands.last().copied().unwrap_or(0);
    p[..stride * first].fill(0.0);
    p[stride * last..].fill(0.0);
}

/// Span and pulse count of band `i` given the bits still available.
///
/// Bits are shared out in proportion to band width over what remains of the
/// spectrum, so a band never borrows from those above it.
fn band_allocation(mode: &CeltMode, i: usize, total_bits: i32, tell: i32) -> (usize, usize, usize) {
    let stride = mode.nb_blocks() * mode.channels();
    let e_bands = mode.e_bands();
    let start = stride * e_bands[i];
    let end = stride * e_bands[i + 1];
    let n = end - start;
    let remaining = i64::from((total_bits - tell).max(0));
    let left = (stride * (mode.block_size() - e_bands[i])) as i64;
    let bits = (remaining * n as i64 / left) as i32;
    (start, end, bits2pulses(n, bits - RESIDUAL_GAIN_BITS))
}

fn reconstruct_band(x: &mut [CeltNorm], p: &[CeltNorm], gain_index: u32, pulses: &[i32], target: f32) {
    x.copy_from_slice(p);
    if gain_index > 0 {
        add_pulses(x, pulses, gain_index as f32 * RESIDUAL_GAIN_STEP);
    }
    renormalise_vector(x, target);
}

/// Codes the residual `x - p` (passed in `x`) band by band and replaces `x`
/// with the reconstruction the decoder will produce.
///
/// `p` is the gain-scaled prediction. Each band of the reconstruction has
/// norm `sqrt(C)` unless both residual and prediction are silent.
pub(crate) fn quant_bands(
    mode: &CeltMode,
    x: &mut [CeltNorm],
    p: &[CeltNorm],
    total_bits: i32,
    enc: &mut EcEnc<'_>,
) {
    let target = celt_sqrt(mode.channels() as f32);
    for i in 0..mode.nb_ebands() {
        let (start, end, k) = band_allocation(mode, i, total_bits, enc.tell());
        let band = &mut x[start..end];
        if k == 0 {
            reconstruct_band(band, &p[start..end], 0, &[], target);
            continue;
        }
        let residual_norm = celt_sqrt(celt_energy(band));
        let gain_index = (libm::roundf(residual_norm / RESIDUAL_GAIN_STEP) as u32)
            .min(RESIDUAL_GAIN_LEVELS - 1);
        enc.enc_uint(gain_index, RESIDUAL_GAIN_LEVELS);
        let pulses = if gain_index > 0 {
            let y = op_pvq_search(band, k);
            encode_pulses(&y, k, enc);
            y
        } else {
            Vec::new()
        };
        reconstruct_band(band, &p[start..end], gain_index, &pulses, target);
    }
}

/// Decoder counterpart of [`quant_bands`]: writes the reconstruction to `x`.
pub(crate) fn unquant_bands(
    mode: &CeltMode,
    x: &mut [CeltNorm],
    p: &[CeltNorm],
    total_bits: i32,
    dec: &mut EcDec<'_>,
) {
    let target = celt_sqrt(mode.channels() as f32);
    for i in 0..mode.nb_ebands() {
        let (start, end, k) = band_allocation(mode, i, total_bits, dec.tell());
        let band = &mut x[start..end];
        if k == 0 {
            reconstruct_band(band, &p[start..end], 0, &[], target);
            continue;
        }
        let gain_index = dec.dec_uint(RESIDUAL_GAIN_LEVELS);
        let mut pulses = vec![0i32; end - start];
        if gain_index > 0 {
            decode_pulses(&mut pulses, k, dec);
        }
        reconstruct_band(band, &p[start..end], gain_index, &pulses, target);
    }
}
