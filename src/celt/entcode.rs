//! Shared range coder definitions.
//!
//! The encoder and decoder keep identical register sets; [`EcState`] holds
//! them while the byte buffer stays with the owning coder so the decoder can
//! work on a shared borrow.

/// Number of bits output at a time.
pub(crate) const EC_SYM_BITS: u32 = 8;

/// Total number of bits in each state register.
pub(crate) const EC_CODE_BITS: u32 = 32;

/// Largest symbol emitted by the coder.
pub(crate) const EC_SYM_MAX: u32 = (1 << EC_SYM_BITS) - 1;

/// Bits to shift by to move a symbol into the high-order position.
pub(crate) const EC_CODE_SHIFT: u32 = EC_CODE_BITS - EC_SYM_BITS - 1;

/// Carry bit of the high-order range symbol.
pub(crate) const EC_CODE_TOP: u32 = 1 << (EC_CODE_BITS - 1);

/// Low-order bit of the high-order range symbol.
pub(crate) const EC_CODE_BOT: u32 = EC_CODE_TOP >> EC_SYM_BITS;

/// Number of bits available for the last, partial symbol in the code field.
pub(crate) const EC_CODE_EXTRA: u32 = ((EC_CODE_BITS - 2) % EC_SYM_BITS) + 1;

/// Unsigned integers wider than this are split into a head coded with their
/// true alphabet and a uniform tail.
pub(crate) const EC_UINT_BITS: u32 = 8;

/// Widest uniform chunk coded in one binary symbol. Keeping `rng >> bits`
/// well above the discarded remainder keeps every chunk value equally likely.
pub(crate) const EC_BITS_CHUNK: u32 = 8;

/// Register file of the range coder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EcState {
    /// Size of the frame in bytes.
    pub(crate) storage: u32,
    /// Total bits consumed so far, before subtracting the unused range.
    pub(crate) nbits_total: i32,
    /// Bytes of range-coded data processed from the front of the frame.
    pub(crate) offs: u32,
    pub(crate) rng: u32,
    pub(crate) val: u32,
    /// Pending carry count (encoder) or saved scale (decoder).
    pub(crate) ext: u32,
    /// Buffered byte awaiting carry resolution (encoder) or last byte read.
    pub(crate) rem: i32,
    pub(crate) error: bool,
}

impl EcState {
    /// Whole bits used so far, rounded up.
    ///
    /// The value is identical on the encoder and decoder side after the same
    /// sequence of symbols, which is what the frame budget logic relies on.
    #[must_use]
    pub(crate) fn tell(&self) -> i32 {
        self.nbits_total - ec_ilog(self.rng)
    }
}

/// Number of significant bits in `v` (0 for 0).
#[must_use]
pub(crate) fn ec_ilog(v: u32) -> i32 {
    (u32::BITS - v.leading_zeros()) as i32
}
