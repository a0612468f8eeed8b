//! Time-domain pitch search against the synthesis history.

use alloc::vec;
use alloc::vec::Vec;

use super::celt::MAX_PERIOD;
use super::history::RollingHistory;
use super::math::celt_inner_prod;
use super::modes::CeltMode;
use super::types::{CeltSig, CeltWord32};

/// Applied to correlations before squaring so full-scale input stays finite.
const XCORR_SCALE: f32 = 1e-12;

/// Cross-correlates `x` with `y` at every lag in `0..max_pitch`.
pub(crate) fn celt_pitch_xcorr(x: &[CeltSig], y: &[CeltSig], max_pitch: usize, xcorr: &mut [CeltWord32]) {
    let len = x.len();
    debug_assert!(y.len() >= len + max_pitch);
    for (lag, slot) in xcorr.iter_mut().enumerate().take(max_pitch) {
        *slot = celt_inner_prod(x, &y[lag..lag + len]);
    }
}

/// Returns the lag maximising `xcorr^2 / energy(y[lag..lag + len])` among
/// lags with positive correlation, or 0 when none correlates positively.
pub(crate) fn find_best_pitch(xcorr: &[CeltWord32], y: &[CeltSig], len: usize, max_pitch: usize) -> usize {
    debug_assert!(xcorr.len() >= max_pitch);
    debug_assert!(y.len() >= len + max_pitch);

    let mut syy: CeltWord32 = 1.0 + celt_inner_prod(&y[..len], &y[..len]);
    let mut best_num = -1.0f32;
    let mut best_den = 0.0f32;
    let mut best_pitch = 0;

    for (lag, &corr) in xcorr.iter().enumerate().take(max_pitch) {
        if corr > 0.0 {
            let corr16 = corr * XCORR_SCALE;
            let num = corr16 * corr16;
            if num * best_den > best_num * syy {
                best_num = num;
                best_den = syy;
                best_pitch = lag;
            }
        }
        let entering = y[lag + len];
        let leaving = y[lag];
        syy += entering * entering - leaving * leaving;
        if syy < 1.0 {
            syy = 1.0;
        }
    }
    best_pitch
}

/// Searches the history for the segment that best continues the frame in
/// `input` (`C * (B*N + overlap)` interleaved samples).
///
/// Channels are summed before correlating. The returned lag indexes the
/// start of a `B*N + overlap` long segment of the history.
pub(crate) fn pitch_search(mode: &CeltMode, input: &[CeltSig], history: &RollingHistory) -> usize {
    let channels = mode.channels();
    let len = mode.analysis_len();
    let max_pitch = MAX_PERIOD - len;
    debug_assert_eq!(history.len(), MAX_PERIOD);

    let x: Vec<CeltSig> = input
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum())
        .collect();
    let y: Vec<CeltSig> = (0..MAX_PERIOD)
        .map(|t| (0..channels).map(|c| history.get(t, c)).sum())
        .collect();

    let mut xcorr = vec![0.0; max_pitch];
    celt_pitch_xcorr(&x, &y, max_pitch, &mut xcorr);
    let lag = find_best_pitch(&xcorr, &y, len, max_pitch);
    log::trace!("pitch search: best lag {lag} of {max_pitch}");
    lag
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::sinf;

    fn sequence(len: usize, seed: u32) -> Vec<CeltSig> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((state >> 8) as f32 / (1u32 << 24) as f32) - 0.5
            })
            .collect()
    }

    #[test]
    fn xcorr_matches_naive() {
        let x = sequence(32, 1);
        let y = sequence(32 + 20, 2);
        let mut xcorr = vec![0.0; 20];
        celt_pitch_xcorr(&x, &y, 20, &mut xcorr);
        for (lag, &got) in xcorr.iter().enumerate() {
            let want: f32 = (0..32).map(|i| x[i] * y[i + lag]).sum();
            assert!((got - want).abs() < 1e-5);
        }
    }

    #[test]
    fn finds_planted_lag() {
        let len = 48;
        let max_pitch = 40;
        let x = sequence(len, 0x1111_2222);
        let mut y = sequence(len + max_pitch, 7);
        for v in &mut y {
            *v *= 0.05;
        }
        for i in 0..len {
            y[i + 23] += x[i];
        }
        let mut xcorr = vec![0.0; max_pitch];
        celt_pitch_xcorr(&x, &y, max_pitch, &mut xcorr);
        assert_eq!(find_best_pitch(&xcorr, &y, len, max_pitch), 23);
    }

    #[test]
    fn huge_correlations_still_rank() {
        let y = vec![30_000.0f32; 12];
        let xcorr = [1e20f32, 3e20, 2e20, 1e20];
        assert_eq!(find_best_pitch(&xcorr, &y, 8, 4), 1);
    }

    #[test]
    fn no_positive_correlation_yields_zero() {
        let x = vec![1.0; 8];
        let y = vec![-1.0; 16];
        let mut xcorr = vec![0.0; 8];
        celt_pitch_xcorr(&x, &y, 8, &mut xcorr);
        assert_eq!(find_best_pitch(&xcorr, &y, 8, 8), 0);
    }

    #[test]
    fn search_follows_periodic_history() {
        let mode = CeltMode::new(48_000, 2, 64, 2, 32).unwrap();
        let period = 100.0;
        let len = mode.analysis_len();
        let mut history = RollingHistory::new(MAX_PERIOD, 2);
        let wave = |t: usize| 1000.0 * sinf(2.0 * core::f32::consts::PI * t as f32 / period);
        for t in 0..MAX_PERIOD {
            history.set(t, 0, wave(t));
            history.set(t, 1, 0.5 * wave(t));
        }
        // The frame continues the wave right where the history ends.
        let input: Vec<f32> = (0..len)
            .flat_map(|t| {
                let v = wave(MAX_PERIOD + t);
                [v, 0.5 * v]
            })
            .collect();
        let lag = pitch_search(&mode, &input, &history);
        let phase = (MAX_PERIOD - lag) as f32 % period;
        assert!(phase < 2.0 || phase > period - 2.0, "lag {lag}, phase {phase}");
    }
}
