//! Error codes reported by the encoder, the decoder, and mode construction.

use core::fmt;

/// Failures surfaced by [`CeltMode`](crate::CeltMode),
/// [`CeltEncoder`](crate::CeltEncoder) and [`CeltDecoder`](crate::CeltDecoder).
///
/// The discriminants keep the numeric codes of the C-style API so callers that
/// forward errors across an FFI boundary can use [`CeltError::code`] directly.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CeltError {
    /// A caller-supplied buffer or parameter does not match the mode.
    BadArgument = -1,
    /// The mode geometry or its tables are malformed.
    InvalidMode = -2,
    /// The range coder produced more bytes than the frame allows.
    InternalError = -3,
    /// The trailing integrity pattern of a frame did not match.
    CorruptedData = -4,
}

impl CeltError {
    /// Returns the numeric error code corresponding to this variant.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Converts a raw error code back into a [`CeltError`].
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::BadArgument),
            -2 => Some(Self::InvalidMode),
            -3 => Some(Self::InternalError),
            -4 => Some(Self::CorruptedData),
            _ => None,
        }
    }
}

impl fmt::Display for CeltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadArgument => f.write_str("invalid argument"),
            Self::InvalidMode => f.write_str("invalid mode"),
            Self::InternalError => f.write_str("internal error: frame budget overflow"),
            Self::CorruptedData => f.write_str("corrupted or desynchronised frame"),
        }
    }
}

impl core::error::Error for CeltError {}
