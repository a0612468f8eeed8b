//! Laplace-distributed integer coding for band energy deltas.
//!
//! The distribution is described by the probability of zero (`fs`, out of
//! 32768) and a geometric `decay` (Q14) applied to each further magnitude.
//! Magnitudes whose modelled probability underflows are coded with a flat
//! minimum probability, so every integer stays representable.

use core::cmp::min;

use crate::celt::entdec::EcDec;
use crate::celt::entenc::EcEnc;

const LAPLACE_LOG_MINP: u32 = 0;
const LAPLACE_MINP: u32 = 1 << LAPLACE_LOG_MINP;
/// Guaranteed number of magnitudes with at least `LAPLACE_MINP` probability.
const LAPLACE_NMIN: u32 = 16;
const TOTAL_BITS: u32 = 15;
const TOTAL_FREQ: u32 = 1 << TOTAL_BITS;

/// Probability mass (out of `TOTAL_FREQ`) of magnitude one.
fn first_step_freq(fs0: u32, decay: u32) -> u32 {
    let ft = TOTAL_FREQ - LAPLACE_MINP * (2 * LAPLACE_NMIN) - fs0;
    ((u64::from(ft) * u64::from(16_384u32.saturating_sub(decay))) >> 15) as u32
}

/// Encodes `*value`, clamping it in place if it falls beyond the coder's
/// representable range. The caller must use the clamped value afterwards.
pub(crate) fn ec_laplace_encode(enc: &mut EcEnc<'_>, value: &mut i32, mut fs: u32, decay: u32) {
    let mut fl = 0u32;
    let val = *value;
    if val != 0 {
        let negative = val < 0;
        let magnitude = val.unsigned_abs() as i32;
        let mut i = 1i32;
        fl = fs;
        fs = first_step_freq(fs, decay);
        while fs > 0 && i < magnitude {
            fs *= 2;
            fl += fs + 2 * LAPLACE_MINP;
            fs = ((u64::from(fs) * u64::from(decay)) >> 15) as u32;
            i += 1;
        }
        if fs == 0 {
            let sign_bit = i32::from(negative);
            let ndi_max = (((TOTAL_FREQ - fl + LAPLACE_MINP - 1) >> LAPLACE_LOG_MINP) as i32
                - sign_bit)
                >> 1;
            let di = min(magnitude - i, ndi_max - 1);
            fl += ((2 * di + 1 + sign_bit) as u32) * LAPLACE_MINP;
            fs = min(LAPLACE_MINP, TOTAL_FREQ - fl);
            let clamped = i + di;
            *value = if negative { -clamped } else { clamped };
        } else {
            fs += LAPLACE_MINP;
            if !negative {
                fl += fs;
            }
        }
        debug_assert!(fl + fs <= TOTAL_FREQ);
        debug_assert!(fs > 0);
    }
    enc.encode_bin(fl, min(fl + fs, TOTAL_FREQ), TOTAL_BITS);
}

pub(crate) fn ec_laplace_decode(dec: &mut EcDec<'_>, mut fs: u32, decay: u32) -> i32 {
    let mut val = 0i32;
    let mut fl = 0u32;
    let fm = dec.decode_bin(TOTAL_BITS);
    if fm >= fs {
        val += 1;
        fl = fs;
        fs = first_step_freq(fs, decay) + LAPLACE_MINP;
        while fs > LAPLACE_MINP && fm >= fl + 2 * fs {
            fs *= 2;
            fl += fs;
            fs = ((u64::from(fs - 2 * LAPLACE_MINP) * u64::from(decay)) >> 15) as u32;
            fs += LAPLACE_MINP;
            val += 1;
        }
        if fs <= LAPLACE_MINP {
            let di = ((fm - fl) >> (LAPLACE_LOG_MINP + 1)) as i32;
            val += di;
            fl += 2 * di as u32 * LAPLACE_MINP;
        }
        if fm < fl + fs {
            val = -val;
        } else {
            fl += fs;
        }
    }
    dec.update(fl, min(fl + fs, TOTAL_FREQ), TOTAL_FREQ);
    val
}
