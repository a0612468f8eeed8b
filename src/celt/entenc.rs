//! Range encoder writing directly into the caller's frame buffer.
//!
//! Every symbol, including the uniform tails of wide integers, goes through
//! the one range-coded stream growing from the front of the buffer, so the
//! last symbols coded are the last bits of the frame. [`EcEnc::enc_done`]
//! zero-fills whatever follows the stream so a frame is always exactly
//! `buf.len()` bytes long.

use crate::celt::entcode::{
    EC_BITS_CHUNK, EC_CODE_BITS, EC_CODE_BOT, EC_CODE_SHIFT, EC_CODE_TOP, EC_SYM_BITS, EC_SYM_MAX,
    EC_UINT_BITS, EcState, ec_ilog,
};

/// Range encoder backed by a mutable byte slice.
#[derive(Debug)]
pub(crate) struct EcEnc<'a> {
    buf: &'a mut [u8],
    st: EcState,
}

impl<'a> EcEnc<'a> {
    /// Creates an encoder that will fill exactly `buf.len()` bytes.
    #[must_use]
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        let storage = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        Self {
            buf,
            st: EcState {
                storage,
                nbits_total: EC_CODE_BITS as i32 + 1,
                rng: EC_CODE_TOP,
                rem: -1,
                ..EcState::default()
            },
        }
    }

    /// Bits used so far; see [`EcState::tell`].
    #[must_use]
    pub(crate) fn tell(&self) -> i32 {
        self.st.tell()
    }

    /// Set once any write ran past the end of the frame.
    #[must_use]
    pub(crate) fn error(&self) -> bool {
        self.st.error
    }

    fn write_byte(&mut self, value: u32) {
        if self.st.offs >= self.st.storage {
            self.st.error = true;
        } else {
            self.buf[self.st.offs as usize] = value as u8;
            self.st.offs += 1;
        }
    }

    /// Emits the top symbol of `val`, holding back runs of `0xFF` until the
    /// carry into them is known.
    fn carry_out(&mut self, c: i32) {
        if c as u32 == EC_SYM_MAX {
            self.st.ext += 1;
            return;
        }
        let carry = c >> EC_SYM_BITS;
        if self.st.rem >= 0 {
            self.write_byte((self.st.rem + carry) as u32);
        }
        if self.st.ext > 0 {
            let sym = (EC_SYM_MAX + carry as u32) & EC_SYM_MAX;
            while self.st.ext > 0 {
                self.write_byte(sym);
                self.st.ext -= 1;
            }
        }
        self.st.rem = c & EC_SYM_MAX as i32;
    }

    fn normalize(&mut self) {
        while self.st.rng <= EC_CODE_BOT {
            self.carry_out((self.st.val >> EC_CODE_SHIFT) as i32);
            self.st.val = (self.st.val << EC_SYM_BITS) & (EC_CODE_TOP - 1);
            self.st.rng <<= EC_SYM_BITS;
            self.st.nbits_total += EC_SYM_BITS as i32;
        }
    }

    /// Encodes the symbol occupying `[fl, fh)` out of a total of `ft`.
    pub(crate) fn encode(&mut self, fl: u32, fh: u32, ft: u32) {
        let r = self.st.rng / ft;
        if fl > 0 {
            self.st.val = self.st.val.wrapping_add(self.st.rng - r * (ft - fl));
            self.st.rng = r * (fh - fl);
        } else {
            self.st.rng -= r * (ft - fh);
        }
        self.normalize();
    }

    /// Same as [`EcEnc::encode`] with `ft == 1 << bits`.
    pub(crate) fn encode_bin(&mut self, fl: u32, fh: u32, bits: u32) {
        let r = self.st.rng >> bits;
        let ft = 1u32 << bits;
        if fl > 0 {
            self.st.val = self.st.val.wrapping_add(self.st.rng - r * (ft - fl));
            self.st.rng = r * (fh - fl);
        } else {
            self.st.rng -= r * (ft - fh);
        }
        self.normalize();
    }

    /// Encodes `fl` uniformly distributed over `[0, ft)`.
    ///
    /// Values wider than eight bits code their top bits with the exact head
    /// alphabet and the rest with [`EcEnc::enc_bits`].
    pub(crate) fn enc_uint(&mut self, fl: u32, ft: u32) {
        debug_assert!(ft > 1, "enc_uint needs at least two symbols");
        debug_assert!(fl < ft);
        let ft = ft - 1;
        let ftb = ec_ilog(ft) as u32;
        if ftb > EC_UINT_BITS {
            let ftb = ftb - EC_UINT_BITS;
            let head = (ft >> ftb) + 1;
            let fl_head = fl >> ftb;
            self.encode(fl_head, fl_head + 1, head);
            self.enc_bits(fl & ((1u32 << ftb) - 1), ftb);
        } else {
            self.encode(fl, fl + 1, ft + 1);
        }
    }

    /// Codes the low `bits` bits of `fl` as uniform binary symbols.
    ///
    /// Costs `bits` whole bits (one less per chunk at worst) and stays in the
    /// range-coded stream.
    pub(crate) fn enc_bits(&mut self, fl: u32, bits: u32) {
        debug_assert!(bits > 0 && bits <= 24);
        let mut remaining = bits;
        while remaining > 0 {
            let chunk = remaining.min(EC_BITS_CHUNK);
            remaining -= chunk;
            let sym = (fl >> remaining) & ((1u32 << chunk) - 1);
            self.encode_bin(sym, sym + 1, chunk);
        }
    }

    /// Flushes the coder, leaving the frame fully written.
    ///
    /// Emits the fewest bits that identify the final interval and zero-fills
    /// the rest of the frame.
    pub(crate) fn enc_done(&mut self) {
        let mut l = EC_CODE_BITS as i32 - ec_ilog(self.st.rng);
        let mut msk = (EC_CODE_TOP - 1) >> l;
        let mut end = self.st.val.wrapping_add(msk) & !msk;
        if (end | msk) >= self.st.val.wrapping_add(self.st.rng) {
            l += 1;
            msk >>= 1;
            end = self.st.val.wrapping_add(msk) & !msk;
        }
        while l > 0 {
            self.carry_out((end >> EC_CODE_SHIFT) as i32);
            end = (end << EC_SYM_BITS) & (EC_CODE_TOP - 1);
            l -= EC_SYM_BITS as i32;
        }
        if self.st.rem >= 0 || self.st.ext > 0 {
            self.carry_out(0);
        }
        if !self.st.error {
            self.buf[self.st.offs as usize..].fill(0);
        }
    }
}
