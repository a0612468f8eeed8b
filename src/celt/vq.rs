//! Pyramid vector quantisation of band residuals.

use alloc::vec;
use alloc::vec::Vec;

use libm::floorf;

use super::math::{celt_energy, celt_sqrt};
use super::types::CeltNorm;

const EPSILON: f32 = 1e-15;

/// Finds the `k`-pulse integer vector whose direction best matches `x`.
///
/// Pulses are first projected onto the pyramid, then placed greedily one at
/// a time maximising `<x, y> / |y|`. Returns the signed pulse vector.
pub(crate) fn op_pvq_search(x: &[CeltNorm], k: usize) -> Vec<i32> {
    let n = x.len();
    debug_assert!(n > 0);
    let mut pulses = vec![0i32; n];
    if k == 0 {
        return pulses;
    }

    let mut ax: Vec<f32> = x.iter().map(|v| v.abs()).collect();
    let mut y = vec![0.0f32; n];
    let mut xy = 0.0f32;
    let mut yy = 0.0f32;
    let mut pulses_left = k as i32;

    if k > n >> 1 {
        let mut sum: f32 = ax.iter().sum();
        if sum <= EPSILON {
            ax.fill(0.0);
            ax[0] = 1.0;
            sum = 1.0;
        }
        let rcp = (k as f32 + 0.8) / sum;
        for idx in 0..n {
            let pulse = floorf(rcp * ax[idx]) as i32;
            pulses[idx] = pulse;
            let val = pulse as f32;
            yy += val * val;
            xy += ax[idx] * val;
            y[idx] = 2.0 * val;
            pulses_left -= pulse;
        }
    }
    debug_assert!(pulses_left >= 0);
    let pulses_left = pulses_left.max(0);

    for _ in 0..pulses_left {
        yy += 1.0;
        let mut best_id = 0usize;
        let mut best_den = yy + y[0];
        let mut best_num = (xy + ax[0]) * (xy + ax[0]);
        for idx in 1..n {
            let rxy = xy + ax[idx];
            let ryy = yy + y[idx];
            let num = rxy * rxy;
            if best_den * num > ryy * best_num {
                best_den = ryy;
                best_num = num;
                best_id = idx;
            }
        }
        xy += ax[best_id];
        yy += y[best_id];
        y[best_id] += 2.0;
        pulses[best_id] += 1;
    }

    for (pulse, &value) in pulses.iter_mut().zip(x) {
        if value < 0.0 {
            *pulse = -*pulse;
        }
    }
    pulses
}

/// Scales `x` in place to Euclidean norm `target`. All-zero input is left
/// untouched.
pub(crate) fn renormalise_vector(x: &mut [CeltNorm], target: f32) {
    let energy = celt_energy(x);
    if energy <= EPSILON {
        return;
    }
    let g = target / celt_sqrt(energy);
    for v in x.iter_mut() {
        *v *= g;
    }
}

/// Adds `gain * y / |y|` to `x`.
pub(crate) fn add_pulses(x: &mut [CeltNorm], pulses: &[i32], gain: f32) {
    let yy: f32 = pulses.iter().map(|&p| (p * p) as f32).sum();
    if yy <= 0.0 {
        return;
    }
    let g = gain / celt_sqrt(yy);
    for (v, &p) in x.iter_mut().zip(pulses) {
        *v += g * p as f32;
    }
}
