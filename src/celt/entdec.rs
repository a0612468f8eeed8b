//! Range decoder reading a borrowed frame.
//!
//! Reads past the end of the frame yield zero bytes, so arbitrary input
//! decodes to *some* symbol sequence without panicking.

use core::cmp::min;

use crate::celt::entcode::{
    EC_BITS_CHUNK, EC_CODE_BITS, EC_CODE_BOT, EC_CODE_EXTRA, EC_CODE_TOP, EC_SYM_BITS, EC_SYM_MAX,
    EC_UINT_BITS, EcState, ec_ilog,
};

/// Range decoder over an immutable byte slice.
#[derive(Debug)]
pub(crate) struct EcDec<'a> {
    buf: &'a [u8],
    st: EcState,
}

impl<'a> EcDec<'a> {
    #[must_use]
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        let storage = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let mut dec = Self {
            buf,
            st: EcState {
                storage,
                nbits_total: EC_CODE_BITS as i32 + 1
                    - ((EC_CODE_BITS - EC_CODE_EXTRA) / EC_SYM_BITS * EC_SYM_BITS) as i32,
                rng: 1 << EC_CODE_EXTRA,
                ..EcState::default()
            },
        };
        dec.st.rem = i32::from(dec.read_byte());
        dec.st.val = dec.st.rng - 1 - ((dec.st.rem as u32) >> (EC_SYM_BITS - EC_CODE_EXTRA));
        dec.normalize();
        dec
    }

    /// Bits consumed so far; matches the encoder's count symbol for symbol.
    #[must_use]
    pub(crate) fn tell(&self) -> i32 {
        self.st.tell()
    }

    /// Set when an out-of-range integer was decoded.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn error(&self) -> bool {
        self.st.error
    }

    fn read_byte(&mut self) -> u8 {
        if self.st.offs < self.st.storage {
            let byte = self.buf[self.st.offs as usize];
            self.st.offs += 1;
            byte
        } else {
            0
        }
    }

    fn normalize(&mut self) {
        while self.st.rng <= EC_CODE_BOT {
            self.st.nbits_total += EC_SYM_BITS as i32;
            self.st.rng <<= EC_SYM_BITS;
            let prev = self.st.rem as u32;
            self.st.rem = i32::from(self.read_byte());
            let sym = ((prev << EC_SYM_BITS) | self.st.rem as u32) >> (EC_SYM_BITS - EC_CODE_EXTRA);
            self.st.val = ((self.st.val << EC_SYM_BITS) + (EC_SYM_MAX & !sym)) & (EC_CODE_TOP - 1);
        }
    }

    /// Returns the cumulative frequency of the next symbol out of `ft`.
    ///
    /// Must be followed by [`EcDec::update`] with the symbol's interval.
    #[must_use]
    pub(crate) fn decode(&mut self, ft: u32) -> u32 {
        self.st.ext = self.st.rng / ft;
        let s = self.st.val / self.st.ext;
        ft - min(s + 1, ft)
    }

    /// Same as [`EcDec::decode`] with `ft == 1 << bits`.
    #[must_use]
    pub(crate) fn decode_bin(&mut self, bits: u32) -> u32 {
        self.st.ext = self.st.rng >> bits;
        let s = self.st.val / self.st.ext;
        (1u32 << bits) - min(s + 1, 1u32 << bits)
    }

    /// Consumes the symbol occupying `[fl, fh)` out of `ft`.
    pub(crate) fn update(&mut self, fl: u32, fh: u32, ft: u32) {
        let s = self.st.ext.wrapping_mul(ft - fh);
        self.st.val = self.st.val.wrapping_sub(s);
        self.st.rng = if fl > 0 {
            self.st.ext.wrapping_mul(fh - fl)
        } else {
            self.st.rng.wrapping_sub(s)
        };
        self.normalize();
    }

    /// Decodes an integer uniformly distributed over `[0, ft)`.
    ///
    /// A corrupt tail that decodes past `ft - 1` sets the error flag and
    /// yields `ft - 1`.
    #[must_use]
    pub(crate) fn dec_uint(&mut self, ft: u32) -> u32 {
        debug_assert!(ft > 1, "dec_uint needs at least two symbols");
        let ft = ft - 1;
        let ftb = ec_ilog(ft) as u32;
        if ftb > EC_UINT_BITS {
            let ftb = ftb - EC_UINT_BITS;
            let head = (ft >> ftb) + 1;
            let s = self.decode(head);
            self.update(s, s + 1, head);
            let t = (s << ftb) | self.dec_bits(ftb);
            if t <= ft {
                return t;
            }
            self.st.error = true;
            ft
        } else {
            let ft = ft + 1;
            let s = self.decode(ft);
            self.update(s, s + 1, ft);
            s
        }
    }

    /// Decoder counterpart of [`EcEnc::enc_bits`](crate::celt::entenc::EcEnc::enc_bits).
    #[must_use]
    pub(crate) fn dec_bits(&mut self, bits: u32) -> u32 {
        let mut remaining = bits;
        let mut value = 0;
        while remaining > 0 {
            let chunk = remaining.min(EC_BITS_CHUNK);
            remaining -= chunk;
            let sym = self.decode_bin(chunk);
            self.update(sym, sym + 1, 1u32 << chunk);
            value = (value << chunk) | sym;
        }
        value
    }
}
