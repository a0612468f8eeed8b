//! Non-fatal diagnostics raised while coding a frame.
//!
//! Encoders and decoders report unusual but recoverable situations through a
//! [`DiagnosticSink`]. Reporting never changes what the codec returns; a sink
//! that drops everything is as valid as one that logs.

use core::fmt;

use log::warn;

/// A condition worth surfacing that does not abort the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// The encoder finished a frame with a large share of its budget unused.
    UnusedBits {
        /// Bits left before the integrity padding was appended.
        unused: usize,
    },
    /// The range coder needed more room than the frame allows.
    TooManyBytes {
        /// Bytes the coder would have needed.
        produced: usize,
        /// Bytes available in the frame.
        budget: usize,
    },
    /// The decoder found a symbol that broke the alternating trailer.
    CorruptedTrailer {
        /// Bit position at which the mismatch was detected.
        position: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnusedBits { unused } => write!(f, "many unused bits: {unused}"),
            Self::TooManyBytes { produced, budget } => {
                write!(f, "got too many bytes: {produced} (budget {budget})")
            }
            Self::CorruptedTrailer { position } => {
                write!(f, "decode error: trailer mismatch at bit {position}")
            }
        }
    }
}

/// Receiver for [`Diagnostic`] events.
pub trait DiagnosticSink {
    /// Records a diagnostic.
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&Diagnostic),
{
    fn report(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

/// Default sink that forwards every diagnostic to [`log::warn!`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        warn!("{diagnostic}");
    }
}
