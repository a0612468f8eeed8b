//! Vector quantisation of the per-band pitch gains.
//!
//! Gains are coded jointly as one index into a 128-entry codebook shared
//! by encoder and decoder. Entry 0 is the all-zero vector and doubles as
//! the "no prediction" signal, in which case no lag follows in the stream.

use alloc::vec::Vec;

use super::entdec::EcDec;
use super::entenc::EcEnc;
use super::types::CeltPGain;

/// Number of entries in the pitch-gain codebook.
pub(crate) const PITCH_CODEBOOK_SIZE: usize = 128;

const LEVELS: usize = 8;
const SLOPES: usize = 16;

/// Builds the codebook for `nbp` pitch bands, laid out entry-major.
///
/// Non-null entries combine one of eight base gains with one of sixteen
/// high-frequency roll-offs, from flat to fully decaying at the last band.
pub(crate) fn pitch_gain_codebook(nbp: usize) -> Vec<CeltPGain> {
    let mut book = alloc::vec![0.0; PITCH_CODEBOOK_SIZE * nbp];
    let span = nbp.saturating_sub(1).max(1) as f32;
    for (k, entry) in book.chunks_exact_mut(nbp.max(1)).enumerate().skip(1) {
        let level = (k - 1) / SLOPES;
        let slope = ((k - 1) % SLOPES) as f32 / (SLOPES - 1) as f32;
        let base = 0.15 + 0.8 * (level + 1) as f32 / LEVELS as f32;
        for (b, gain) in entry.iter_mut().enumerate() {
            *gain = base * (1.0 - slope * b as f32 / span);
        }
    }
    book
}

fn nearest_entry(gains: &[CeltPGain], book: &[CeltPGain]) -> usize {
    let nbp = gains.len();
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (k, entry) in book.chunks_exact(nbp).enumerate() {
        let dist: f32 = entry
            .iter()
            .zip(gains)
            .map(|(&q, &g)| (q - g) * (q - g))
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = k;
        }
    }
    best
}

/// Quantises `gains` in place and codes the chosen index.
///
/// Returns whether any gain is non-zero, i.e. whether a pitch lag follows.
pub(crate) fn quant_pitch(gains: &mut [CeltPGain], book: &[CeltPGain], enc: &mut EcEnc<'_>) -> bool {
    let index = nearest_entry(gains, book);
    let nbp = gains.len();
    gains.copy_from_slice(&book[index * nbp..(index + 1) * nbp]);
    enc.enc_uint(index as u32, PITCH_CODEBOOK_SIZE as u32);
    index != 0
}

/// Decodes the gain index and writes the matching gains.
pub(crate) fn unquant_pitch(gains: &mut [CeltPGain], book: &[CeltPGain], dec: &mut EcDec<'_>) -> bool {
    let index = dec.dec_uint(PITCH_CODEBOOK_SIZE as u32) as usize;
    let nbp = gains.len();
    gains.copy_from_slice(&book[index * nbp..(index + 1) * nbp]);
    index != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn codebook_shape() {
        let nbp = 6;
        let book = pitch_gain_codebook(nbp);
        assert_eq!(book.len(), PITCH_CODEBOOK_SIZE * nbp);
        assert!(book[..nbp].iter().all(|&g| g == 0.0));
        for entry in book.chunks_exact(nbp).skip(1) {
            assert!(entry[0] > 0.0 && entry[0] < 1.0);
            assert!(entry.windows(2).all(|w| w[1] <= w[0]));
            assert!(entry.iter().all(|&g| g >= 0.0));
        }
        // Flat entry at the highest level.
        let top = &book[(1 + 7 * SLOPES) * nbp..(2 + 7 * SLOPES) * nbp];
        assert!(top.iter().all(|&g| (g - 0.95).abs() < 1e-6));
    }

    #[test]
    fn single_band_codebook_is_finite() {
        let book = pitch_gain_codebook(1);
        assert_eq!(book.len(), PITCH_CODEBOOK_SIZE);
        assert!(book.iter().all(|g| g.is_finite()));
    }

    #[test]
    fn zero_gains_select_the_null_entry() {
        let book = pitch_gain_codebook(4);
        let mut buf = [0u8; 8];
        let mut enc = EcEnc::new(&mut buf);
        let mut gains = [0.0, 0.0, 0.01, 0.0];
        assert!(!quant_pitch(&mut gains, &book, &mut enc));
        assert_eq!(gains, [0.0; 4]);
    }

    #[test]
    fn quantised_gains_round_trip() {
        let nbp = 5;
        let book = pitch_gain_codebook(nbp);
        let inputs = [
            vec![0.9, 0.85, 0.7, 0.5, 0.3],
            vec![0.4, 0.4, 0.4, 0.4, 0.4],
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.99, 0.1, 0.0, 0.0, 0.0],
        ];

        let mut buf = [0u8; 16];
        let mut coded = Vec::new();
        let mut flags = Vec::new();
        {
            let mut enc = EcEnc::new(&mut buf);
            for input in &inputs {
                let mut gains = input.clone();
                flags.push(quant_pitch(&mut gains, &book, &mut enc));
                coded.push(gains);
            }
            enc.enc_done();
            assert!(!enc.error());
        }
        assert_eq!(flags, [true, true, false, true]);

        let mut dec = EcDec::new(&buf);
        for (expected, &flag) in coded.iter().zip(&flags) {
            let mut gains = vec![1.0; nbp];
            assert_eq!(unquant_pitch(&mut gains, &book, &mut dec), flag);
            assert_eq!(&gains, expected);
        }
    }
}
