//! Band energy quantisation.
//!
//! Energies are coded in the log2 amplitude domain. Each band is predicted
//! from the same band in the previous frame (coefficient 0.8) plus an
//! inter-band term that accumulates the quantised deltas of lower bands.
//! The prediction error is quantised with a 0.25 step and Laplace coded.

use alloc::vec;

use super::entdec::EcDec;
use super::entenc::EcEnc;
use super::laplace::{ec_laplace_decode, ec_laplace_encode};
use super::math::{celt_exp2, celt_log2};
use super::modes::CeltMode;
use super::types::CeltEner;

/// Floor of the log2 band amplitude.
pub(crate) const MIN_LOG_ENERGY: f32 = -8.0;
/// Ceiling of the log2 band amplitude.
pub(crate) const MAX_LOG_ENERGY: f32 = 24.0;

const ENERGY_STEP: f32 = 0.25;
/// Inter-frame prediction coefficient.
const PRED_COEF: f32 = 0.8;
/// Inter-band leakage; `1 - BETA` of each quantised delta carries upward.
const BETA: f32 = 0.56;
const MAX_QI: i32 = 255;

const LAPLACE_FS: u32 = 9_000;
const LAPLACE_DECAY: u32 = 14_000;

/// Delta assumed, without coding, once the energy budget is exhausted.
const OUT_OF_BUDGET_QI: i32 = -1;

/// Quantises `band_e` (linear amplitudes, `band * C + channel`) in place.
///
/// `old_e` holds the previous frame's quantised log energies and receives
/// this frame's. Deltas are only coded while the coder has used at most
/// `budget` bits; past that a fixed decrement is assumed.
pub(crate) fn quant_energy(
    mode: &CeltMode,
    band_e: &mut [CeltEner],
    old_e: &mut [f32],
    budget: i32,
    enc: &mut EcEnc<'_>,
) {
    let channels = mode.channels();
    let mut prev = vec![0.0f32; channels];
    for i in 0..mode.nb_ebands() {
        for c in 0..channels {
            let idx = i * channels + c;
            let x = celt_log2(band_e[idx]).max(MIN_LOG_ENERGY);
            let pred = PRED_COEF * old_e[idx] + prev[c];
            let qi = if enc.tell() > budget {
                OUT_OF_BUDGET_QI
            } else {
                let mut qi = libm::roundf((x - pred) / ENERGY_STEP) as i32;
                qi = qi.clamp(-MAX_QI, MAX_QI);
                ec_laplace_encode(enc, &mut qi, LAPLACE_FS, LAPLACE_DECAY);
                qi
            };
            let q = qi as f32 * ENERGY_STEP;
            let e = (pred + q).clamp(MIN_LOG_ENERGY, MAX_LOG_ENERGY);
            old_e[idx] = e;
            prev[c] += (1.0 - BETA) * q;
            band_e[idx] = celt_exp2(e);
        }
    }
}

/// Decoder counterpart of [`quant_energy`].
pub(crate) fn unquant_energy(
    mode: &CeltMode,
    band_e: &mut [CeltEner],
    old_e: &mut [f32],
    budget: i32,
    dec: &mut EcDec<'_>,
) {
    let channels = mode.channels();
    let mut prev = vec![0.0f32; channels];
    for i in 0..mode.nb_ebands() {
        for c in 0..channels {
            let idx = i * channels + c;
            let pred = PRED_COEF * old_e[idx] + prev[c];
            let qi = if dec.tell() > budget {
                OUT_OF_BUDGET_QI
            } else {
                ec_laplace_decode(dec, LAPLACE_FS, LAPLACE_DECAY)
            };
            let q = qi.clamp(-MAX_QI, MAX_QI) as f32 * ENERGY_STEP;
            let e = (pred + q).clamp(MIN_LOG_ENERGY, MAX_LOG_ENERGY);
            old_e[idx] = e;
            prev[c] += (1.0 - BETA) * q;
            band_e[idx] = celt_exp2(e);
        }
    }
}
