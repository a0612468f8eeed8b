//! Small mixed-radix complex FFT (radices 2, 3, 4 and 5).
//!
//! Only the forward transform is needed: the MDCT is built on a DCT-IV,
//! which is its own inverse up to scaling. Outputs are unscaled.

use alloc::vec;
use alloc::vec::Vec;
use core::f32::consts::PI;
use core::ops::{Add, Mul, Sub};

use libm::{cosf, sinf};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct KissFftCpx {
    pub(crate) r: f32,
    pub(crate) i: f32,
}

impl KissFftCpx {
    #[inline]
    pub(crate) const fn new(r: f32, i: f32) -> Self {
        Self { r, i }
    }

    /// Unit phasor `exp(i * phase)`.
    #[inline]
    pub(crate) fn expi(phase: f32) -> Self {
        Self::new(cosf(phase), sinf(phase))
    }

    #[inline]
    fn scale(self, s: f32) -> Self {
        Self::new(self.r * s, self.i * s)
    }

    /// Multiplies by `-i`.
    #[inline]
    fn rot_neg(self) -> Self {
        Self::new(self.i, -self.r)
    }
}

impl Add for KissFftCpx {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.i + rhs.i)
    }
}

impl Sub for KissFftCpx {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.r - rhs.r, self.i - rhs.i)
    }
}

impl Mul for KissFftCpx {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.r * rhs.r - self.i * rhs.i,
            self.r * rhs.i + self.i * rhs.r,
        )
    }
}

/// Forward FFT plan of a fixed length.
#[derive(Clone, Debug)]
pub(crate) struct MiniKissFft {
    nfft: usize,
    /// `(radix, remaining length)` for each decimation stage.
    stages: Vec<(usize, usize)>,
    twiddles: Vec<KissFftCpx>,
}

impl MiniKissFft {
    /// Builds a plan, or `None` when `nfft` has a prime factor above five.
    pub(crate) fn new(nfft: usize) -> Option<Self> {
        if nfft == 0 {
            return None;
        }
        let stages = factor(nfft)?;
        let twiddles = (0..nfft)
            .map(|k| KissFftCpx::expi(-2.0 * PI * k as f32 / nfft as f32))
            .collect();
        Some(Self {
            nfft,
            stages,
            twiddles,
        })
    }

    /// Whether a plan of length `nfft` can be built.
    pub(crate) fn supports(nfft: usize) -> bool {
        nfft > 0 && factor(nfft).is_some()
    }

    /// Computes `fout[k] = sum_n fin[n] * exp(-2*pi*i*n*k/nfft)`.
    pub(crate) fn process(&self, fin: &[KissFftCpx], fout: &mut [KissFftCpx]) {
        debug_assert_eq!(fin.len(), self.nfft);
        debug_assert_eq!(fout.len(), self.nfft);
        if self.stages.is_empty() {
            fout.copy_from_slice(fin);
            return;
        }
        self.work(fout, fin, 0, 1, 0);
    }

    fn work(
        &self,
        fout: &mut [KissFftCpx],
        fin: &[KissFftCpx],
        offset: usize,
        fstride: usize,
        stage: usize,
    ) {
        let (p, m) = self.stages[stage];
        if m == 1 {
            for (q, slot) in fout.iter_mut().enumerate().take(p) {
                *slot = fin[offset + q * fstride];
            }
        } else {
            for (q, chunk) in fout.chunks_mut(m).take(p).enumerate() {
                self.work(chunk, fin, offset + q * fstride, fstride * p, stage + 1);
            }
        }

        match p {
            2 => self.bfly2(fout, fstride, m),
            3 => self.bfly3(fout, fstride, m),
            4 => self.bfly4(fout, fstride, m),
            _ => self.bfly5(fout, fstride, m),
        }
    }

    fn bfly2(&self, fout: &mut [KissFftCpx], fstride: usize, m: usize) {
        for k in 0..m {
            let t = fout[m + k] * self.twiddles[k * fstride];
            fout[m + k] = fout[k] - t;
            fout[k] = fout[k] + t;
        }
    }

    fn bfly3(&self, fout: &mut [KissFftCpx], fstride: usize, m: usize) {
        let epi3 = self.twiddles[fstride * m];
        for k in 0..m {
            let s1 = fout[m + k] * self.twiddles[k * fstride];
            let s2 = fout[2 * m + k] * self.twiddles[2 * k * fstride];
            let sum = s1 + s2;
            let diff = (s1 - s2).scale(epi3.i);
            let base = fout[k] - sum.scale(0.5);

            fout[k] = fout[k] + sum;
            fout[m + k] = KissFftCpx::new(base.r - diff.i, base.i + diff.r);
            fout[2 * m + k] = KissFftCpx::new(base.r + diff.i, base.i - diff.r);
        }
    }

    fn bfly4(&self, fout: &mut [KissFftCpx], fstride: usize, m: usize) {
        for k in 0..m {
            let s0 = fout[m + k] * self.twiddles[k * fstride];
            let s1 = fout[2 * m + k] * self.twiddles[2 * k * fstride];
            let s2 = fout[3 * m + k] * self.twiddles[3 * k * fstride];

            let even_sum = fout[k] + s1;
            let even_diff = fout[k] - s1;
            let odd_sum = s0 + s2;
            let odd_diff = (s0 - s2).rot_neg();

            fout[k] = even_sum + odd_sum;
            fout[2 * m + k] = even_sum - odd_sum;
            fout[m + k] = even_diff + odd_diff;
            fout[3 * m + k] = even_diff - odd_diff;
        }
    }

    fn bfly5(&self, fout: &mut [KissFftCpx], fstride: usize, m: usize) {
        let ya = self.twiddles[fstride * m];
        let yb = self.twiddles[2 * fstride * m];
        for u in 0..m {
            let s0 = fout[u];
            let s1 = fout[m + u] * self.twiddles[u * fstride];
            let s2 = fout[2 * m + u] * self.twiddles[2 * u * fstride];
            let s3 = fout[3 * m + u] * self.twiddles[3 * u * fstride];
            let s4 = fout[4 * m + u] * self.twiddles[4 * u * fstride];

            let s7 = s1 + s4;
            let s10 = s1 - s4;
            let s8 = s2 + s3;
            let s9 = s2 - s3;

            fout[u] = s0 + s7 + s8;

            let s5 = s0 + s7.scale(ya.r) + s8.scale(yb.r);
            let s6 = KissFftCpx::new(
                s10.i * ya.i + s9.i * yb.i,
                -s10.r * ya.i - s9.r * yb.i,
            );
            fout[m + u] = s5 - s6;
            fout[4 * m + u] = s5 + s6;

            let s11 = s0 + s7.scale(yb.r) + s8.scale(ya.r);
            let s12 = KissFftCpx::new(
                s9.i * ya.i - s10.i * yb.i,
                s10.r * yb.i - s9.r * ya.i,
            );
            fout[2 * m + u] = s11 + s12;
            fout[3 * m + u] = s11 - s12;
        }
    }
}

/// Splits `n` into radix-4 stages first, then 2, 3 and 5.
fn factor(mut n: usize) -> Option<Vec<(usize, usize)>> {
    let mut stages = vec![];
    while n > 1 {
        let p = [4usize, 2, 3, 5].into_iter().find(|p| n % *p == 0)?;
        n /= p;
        stages.push((p, n));
    }
    Some(stages)
}
