//! Modified discrete cosine transform built on a half-length complex FFT.
//!
//! The forward transform maps `2N` time samples to `N` coefficients and is
//! scaled by `1/N`; the backward transform is unscaled. Windowing is left to
//! the caller, so a forward/backward pair followed by a power-complementary
//! overlap-add reproduces half of the original signal.

use alloc::vec;
use alloc::vec::Vec;
use core::f32::consts::PI;

use super::mini_kfft::{KissFftCpx, MiniKissFft};

#[derive(Clone, Debug)]
pub(crate) struct MdctLookup {
    n: usize,
    fft: MiniKissFft,
    pre_twiddle: Vec<KissFftCpx>,
    post_twiddle: Vec<KissFftCpx>,
}

impl MdctLookup {
    /// Plans an MDCT producing `n` coefficients. `n` must be even and `n/2`
    /// must factor into 2, 3 and 5.
    pub(crate) fn new(n: usize) -> Option<Self> {
        if n < 2 || n % 2 != 0 {
            return None;
        }
        let half = n / 2;
        let fft = MiniKissFft::new(half)?;
        let pre_twiddle = (0..half)
            .map(|j| KissFftCpx::expi(-PI * (j as f32 + 0.25) / n as f32))
            .collect();
        let post_twiddle = (0..half)
            .map(|k| KissFftCpx::expi(-PI * k as f32 / n as f32))
            .collect();
        Some(Self {
            n,
            fft,
            pre_twiddle,
            post_twiddle,
        })
    }

    pub(crate) fn size(&self) -> usize {
        self.n
    }

    /// `input` holds `2N` samples, `out` receives `N` coefficients.
    pub(crate) fn forward(&self, input: &[f32], out: &mut [f32]) {
        let n = self.n;
        debug_assert_eq!(input.len(), 2 * n);
        debug_assert_eq!(out.len(), n);
        let half = n / 2;
        let three_half = 3 * half;

        let mut folded = vec![0.0f32; n];
        for (j, slot) in folded.iter_mut().enumerate() {
            *slot = if j < half {
                -input[three_half - 1 - j] - input[three_half + j]
            } else {
                input[j - half] - input[three_half - 1 - j]
            };
        }

        self.dct4(&folded, out);
        let scale = 1.0 / n as f32;
        for x in out.iter_mut() {
            *x *= scale;
        }
    }

    /// `input` holds `N` coefficients, `out` receives `2N` aliased samples.
    pub(crate) fn backward(&self, input: &[f32], out: &mut [f32]) {
        let n = self.n;
        debug_assert_eq!(input.len(), n);
        debug_assert_eq!(out.len(), 2 * n);
        let half = n / 2;
        let three_half = 3 * half;

        let mut v = vec![0.0f32; n];
        self.dct4(input, &mut v);

        for (j, slot) in out.iter_mut().enumerate() {
            *slot = if j < half {
                v[j + half]
            } else if j < three_half {
                -v[three_half - 1 - j]
            } else {
                -v[j - three_half]
            };
        }
    }

    /// Unscaled DCT-IV: `out[k] = sum_j u[j] cos(pi/N (j + 1/2)(k + 1/2))`.
    fn dct4(&self, u: &[f32], out: &mut [f32]) {
        let n = self.n;
        let half = n / 2;

        let rotated: Vec<KissFftCpx> = self
            .pre_twiddle
            .iter()
            .enumerate()
            .map(|(j, &tw)| KissFftCpx::new(u[2 * j], u[n - 1 - 2 * j]) * tw)
            .collect();
        let mut spectrum = vec![KissFftCpx::default(); half];
        self.fft.process(&rotated, &mut spectrum);

        for (k, (&bin, &tw)) in spectrum.iter().zip(&self.post_twiddle).enumerate() {
            let c = bin * tw;
            out[2 * k] = c.r;
            out[n - 1 - 2 * k] = -c.i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::{cosf, sinf};

    fn basis(n: usize, j: usize, k: usize) -> f32 {
        let phase = PI / n as f32 * (j as f32 + 0.5 + n as f32 / 2.0) * (k as f32 + 0.5);
        cosf(phase)
    }

    fn signal(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| sinf(i as f32 * 0.37) + 0.25 * cosf(i as f32 * 1.9))
            .collect()
    }

    #[test]
    fn forward_matches_direct_sum() {
        for n in [8usize, 12, 20, 40, 64] {
            let input = signal(2 * n);
            let mdct = MdctLookup::new(n).unwrap();
            let mut out = vec![0.0; n];
            mdct.forward(&input, &mut out);
            for (k, &got) in out.iter().enumerate() {
                let want: f32 = input
                    .iter()
                    .enumerate()
                    .map(|(j, &x)| x * basis(n, j, k))
                    .sum::<f32>()
                    / n as f32;
                assert!((got - want).abs() < 1e-4, "n={n} k={k}: {got} vs {want}");
            }
        }
    }

    #[test]
    fn backward_matches_direct_sum() {
        for n in [8usize, 24, 60] {
            let coeffs = signal(n);
            let mdct = MdctLookup::new(n).unwrap();
            let mut out = vec![0.0; 2 * n];
            mdct.backward(&coeffs, &mut out);
            for (j, &got) in out.iter().enumerate() {
                let want: f32 = coeffs
                    .iter()
                    .enumerate()
                    .map(|(k, &x)| x * basis(n, j, k))
                    .sum();
                assert!((got - want).abs() < 2e-3, "n={n} j={j}: {got} vs {want}");
            }
        }
    }

    #[test]
    fn round_trip_leaves_time_domain_aliasing() {
        let n = 40;
        let input = signal(2 * n);
        let mdct = MdctLookup::new(n).unwrap();
        let mut coeffs = vec![0.0; n];
        let mut aliased = vec![0.0; 2 * n];
        mdct.forward(&input, &mut coeffs);
        mdct.backward(&coeffs, &mut aliased);

        for (j, &got) in aliased.iter().enumerate() {
            let want = if j < n {
                0.5 * (input[j] - input[n - 1 - j])
            } else {
                0.5 * (input[j] + input[3 * n - 1 - j])
            };
            assert!((got - want).abs() < 1e-4, "j={j}");
        }
    }

    #[test]
    fn rejects_unplannable_sizes() {
        assert!(MdctLookup::new(0).is_none());
        assert!(MdctLookup::new(7).is_none());
        assert!(MdctLookup::new(14).is_none());
        assert_eq!(MdctLookup::new(480).map(|m| m.size()), Some(480));
    }
}
