//! Enumeration of pulse vectors.
//!
//! `V(n, k)` counts the integer vectors of dimension `n` whose absolute
//! values sum to exactly `k`. Each such vector maps to a unique index in
//! `0..V(n, k)`; coordinates are visited first to last and, for each, the
//! values are ordered `0, +1, -1, +2, -2, ...`.

use alloc::vec;
use alloc::vec::Vec;

use super::entdec::EcDec;
use super::entenc::EcEnc;

/// Table of `V(m, j)` for `m <= n` and `j <= k`, saturating at `u64::MAX`.
pub(crate) struct PulseTable {
    k: usize,
    values: Vec<u64>,
}

impl PulseTable {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        let stride = k + 1;
        let mut values = vec![0u64; (n + 1) * stride];
        values[0] = 1;
        for m in 1..=n {
            values[m * stride] = 1;
            for j in 1..=k {
                let up = values[(m - 1) * stride + j];
                let left = values[m * stride + j - 1];
                let diag = values[(m - 1) * stride + j - 1];
                values[m * stride + j] = up.saturating_add(left).saturating_add(diag);
            }
        }
        Self { k, values }
    }

    #[inline]
    pub(crate) fn get(&self, m: usize, j: usize) -> u64 {
        self.values[m * (self.k + 1) + j]
    }
}

/// `V(n, k)` computed without materialising the whole table.
pub(crate) fn ncwrs(n: usize, k: usize) -> u64 {
    let mut col = vec![1u64; n + 1];
    for _ in 0..k {
        let mut prev_diag = col[0];
        col[0] = 0;
        for m in 1..=n {
            let old = col[m];
            col[m] = old.saturating_add(col[m - 1]).saturating_add(prev_diag);
            prev_diag = old;
        }
    }
    col[n]
}

/// Index of `y` among all vectors of its dimension with `k` pulses.
pub(crate) fn icwrs(y: &[i32], k: usize, table: &PulseTable) -> u64 {
    let n = y.len();
    let mut index = 0u64;
    let mut left = k;
    for (p, &value) in y.iter().enumerate() {
        let rest = n - p - 1;
        let a = value.unsigned_abs() as usize;
        debug_assert!(a <= left);
        if a > 0 {
            index += table.get(rest, left);
            for b in 1..a {
                index += 2 * table.get(rest, left - b);
            }
            if value < 0 {
                index += table.get(rest, left - a);
            }
        }
        left -= a;
    }
    debug_assert_eq!(left, 0);
    index
}

/// Inverse of [`icwrs`].
pub(crate) fn cwrsi(n: usize, k: usize, mut index: u64, table: &PulseTable, y: &mut [i32]) {
    debug_assert_eq!(y.len(), n);
    let mut left = k;
    for (p, slot) in y.iter_mut().enumerate() {
        let rest = n - p - 1;
        let zero = table.get(rest, left);
        if index < zero || left == 0 {
            *slot = 0;
            continue;
        }
        index -= zero;
        let mut b = 1;
        loop {
            let half = table.get(rest, left - b);
            if index < 2 * half || b == left {
                let negative = index >= half;
                if negative {
                    index -= half;
                }
                *slot = if negative { -(b as i32) } else { b as i32 };
                left -= b;
                break;
            }
            index -= 2 * half;
            b += 1;
        }
    }
}

/// Codes the pulse vector `y` holding `k` pulses.
pub(crate) fn encode_pulses(y: &[i32], k: usize, enc: &mut EcEnc<'_>) {
    let table = PulseTable::new(y.len(), k);
    let total = table.get(y.len(), k);
    debug_assert!(total <= u64::from(u32::MAX));
    enc.enc_uint(icwrs(y, k, &table) as u32, total as u32);
}

/// Decodes a pulse vector of `y.len()` coordinates holding `k` pulses.
pub(crate) fn decode_pulses(y: &mut [i32], k: usize, dec: &mut EcDec<'_>) {
    let n = y.len();
    let table = PulseTable::new(n, k);
    let total = table.get(n, k);
    let index = dec.dec_uint(total as u32);
    cwrsi(n, k, u64::from(index), &table, y);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_vectors(n: usize, k: usize) -> Vec<Vec<i32>> {
        if n == 0 {
            return if k == 0 { vec![Vec::new()] } else { Vec::new() };
        }
        let mut out = Vec::new();
        for a in 0..=k as i32 {
            let signs: &[i32] = if a == 0 { &[1] } else { &[1, -1] };
            for &s in signs {
                for mut tail in all_vectors(n - 1, k - a as usize) {
                    tail.insert(0, s * a);
                    out.push(tail);
                }
            }
        }
        out
    }

    #[test]
    fn counts_match_closed_forms() {
        assert_eq!(ncwrs(1, 5), 2);
        assert_eq!(ncwrs(4, 0), 1);
        assert_eq!(ncwrs(3, 1), 6);
        // V(n, 2) = 2n^2
        assert_eq!(ncwrs(7, 2), 98);
        // V(2, k) = 4k
        assert_eq!(ncwrs(2, 9), 36);
        let table = PulseTable::new(6, 5);
        for m in 0..=6 {
            for j in 0..=5 {
                assert_eq!(table.get(m, j), ncwrs(m, j), "V({m},{j})");
            }
        }
    }

    #[test]
    fn enumeration_follows_value_order() {
        for &(n, k) in &[(1usize, 3usize), (2, 2), (3, 3), (4, 2), (5, 1)] {
            let vectors = all_vectors(n, k);
            let table = PulseTable::new(n, k);
            assert_eq!(vectors.len() as u64, table.get(n, k));
            for (expected, y) in vectors.iter().enumerate() {
                assert_eq!(icwrs(y, k, &table), expected as u64, "{y:?}");
                let mut back = vec![0; n];
                cwrsi(n, k, expected as u64, &table, &mut back);
                assert_eq!(&back, y);
            }
        }
    }

    #[test]
    fn large_counts_saturate() {
        assert_eq!(ncwrs(2000, 40), u64::MAX);
    }

    #[test]
    fn pulses_round_trip_through_the_range_coder() {
        let vectors: [&[i32]; 3] = [&[3, -1, 0, 0, 2, 0, 0, -1], &[0, 0, 0, -7], &[1, -1]];
        let mut buf = [0u8; 32];
        {
            let mut enc = EcEnc::new(&mut buf);
            for y in vectors {
                let k = y.iter().map(|v| v.unsigned_abs() as usize).sum();
                encode_pulses(y, k, &mut enc);
            }
            enc.enc_done();
            assert!(!enc.error());
        }
        let mut dec = EcDec::new(&buf);
        for y in vectors {
            let k = y.iter().map(|v| v.unsigned_abs() as usize).sum();
            let mut out = vec![0; y.len()];
            decode_pulses(&mut out, k, &mut dec);
            assert_eq!(out, y);
        }
    }
}
