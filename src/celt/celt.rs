//! Frame-level glue shared by the encoder and decoder: constants, the
//! windowed MDCT analysis and synthesis over a whole frame, and the
//! emphasis filters.

use alloc::vec;

use super::float_cast::sig2int16;
use super::history::RollingHistory;
use super::modes::CeltMode;
use super::types::CeltSig;

/// Samples per channel kept in the synthesis history.
pub const MAX_PERIOD: usize = 1024;

/// Largest supported channel count.
pub const MAX_CHANNELS: usize = 2;

/// Largest compressed frame accepted by the encoder.
pub(crate) const MAX_BYTES: usize = 1275;

/// Coefficient of the first-order emphasis filters.
pub(crate) const PREEMPH: f32 = 0.8;

/// Samples are scaled down by this factor before squaring when measuring
/// frame energy, keeping the sums in the same range as the admission margin.
const ENERGY_SHIFT_SCALE: f32 = 1.0 / 16.0;

/// Windows and transforms every block of every channel in a frame.
///
/// `input` holds `C * (B*N + overlap)` interleaved samples. Coefficients are
/// written to `out` with the bin as the major index, then the block, then
/// the channel: `out[C*B*j + C*i + c]`. Returns the energy of the windowed
/// input, measured on samples scaled by 1/16.
pub(crate) fn compute_mdcts(mode: &CeltMode, input: &[CeltSig], out: &mut [CeltSig]) -> f32 {
    let n = mode.block_size();
    let b = mode.nb_blocks();
    let c_count = mode.channels();
    let overlap = mode.overlap();
    let window = mode.window();
    let n4 = (n - overlap) / 2;
    debug_assert_eq!(input.len(), c_count * (b * n + overlap));
    debug_assert_eq!(out.len(), c_count * b * n);

    let mut x = vec![0.0f32; 2 * n];
    let mut tmp = vec![0.0f32; n];
    let mut energy = 0.0f32;

    for c in 0..c_count {
        for i in 0..b {
            x.fill(0.0);
            for j in 0..n + overlap {
                x[j + n4] = input[c_count * (i * n + j) + c];
            }
            for (j, &w) in window.iter().enumerate() {
                x[n4 + j] *= w;
                x[2 * n - n4 - 1 - j] *= w;
            }
            energy += x
                .iter()
                .map(|&v| {
                    let s = v * ENERGY_SHIFT_SCALE;
                    s * s
                })
                .sum::<f32>();

            mode.mdct.forward(&x, &mut tmp);
            for (j, &coef) in tmp.iter().enumerate() {
                out[c_count * b * j + c_count * i + c] = coef;
            }
        }
    }
    energy
}

/// Inverse of [`compute_mdcts`], overlap-adding into the newest `B*N`
/// samples of `history`.
///
/// `overlap_mem` carries the windowed tail of the previous block per
/// channel (`C * overlap` samples, interleaved). The caller advances the
/// history by one frame beforehand.
pub(crate) fn compute_inv_mdcts(
    mode: &CeltMode,
    freq: &[CeltSig],
    history: &mut RollingHistory,
    overlap_mem: &mut [CeltSig],
) {
    let n = mode.block_size();
    let b = mode.nb_blocks();
    let c_count = mode.channels();
    let overlap = mode.overlap();
    let window = mode.window();
    let n4 = (n - overlap) / 2;
    let end = history.len();
    debug_assert_eq!(freq.len(), c_count * b * n);
    debug_assert_eq!(overlap_mem.len(), c_count * overlap);

    let mut x = vec![0.0f32; 2 * n];
    let mut tmp = vec![0.0f32; n];

    for c in 0..c_count {
        for i in 0..b {
            for (j, slot) in tmp.iter_mut().enumerate() {
                *slot = freq[c_count * b * j + c_count * i + c];
            }
            mode.mdct.backward(&tmp, &mut x);

            let base = end - (b - i) * n;
            for (j, &w) in window.iter().enumerate() {
                let lead = 2.0 * (overlap_mem[c_count * j + c] + w * x[j + n4]);
                history.set(base + j, c, lead);
            }
            for (j, &w) in window.iter().enumerate() {
                overlap_mem[c_count * (overlap - 1 - j) + c] = w * x[2 * n - j - n4 - 1];
            }
            for j in 0..2 * n4 {
                history.set(base + overlap + j, c, 2.0 * x[j + n4 + overlap]);
            }
        }
    }
}

/// Builds the analysis buffer for one frame: the stored tail of the
/// previous frame followed by the pre-emphasised PCM.
///
/// Updates the filter memory and replaces `in_mem` with the last `overlap`
/// samples of the new buffer.
pub(crate) fn preemphasis(
    pcm: &[i16],
    channels: usize,
    overlap: usize,
    preemph_mem: &mut [CeltSig],
    in_mem: &mut [CeltSig],
) -> alloc::vec::Vec<CeltSig> {
    let frame = pcm.len() / channels;
    let mut input = vec![0.0f32; channels * (frame + overlap)];
    input[..channels * overlap].copy_from_slice(in_mem);

    for c in 0..channels {
        for i in 0..frame {
            let sample = f32::from(pcm[channels * i + c]);
            input[channels * (i + overlap) + c] = sample - PREEMPH * preemph_mem[c];
            preemph_mem[c] = sample;
        }
    }
    in_mem.copy_from_slice(&input[channels * frame..]);
    input
}

/// Runs the de-emphasis filter over the newest `pcm.len() / C` samples of
/// the history and writes saturated 16-bit output.
pub(crate) fn deemphasis(
    history: &RollingHistory,
    channels: usize,
    preemph_mem: &mut [CeltSig],
    pcm: &mut [i16],
) {
    let frame = pcm.len() / channels;
    let start = history.len() - frame;
    for c in 0..channels {
        for t in 0..frame {
            let tmp = history.get(start + t, c) + PREEMPH * preemph_mem[c];
            preemph_mem[c] = tmp;
            pcm[channels * t + c] = sig2int16(tmp);
        }
    }
}
