#![no_std]

//! Low-latency transform codec core.
//!
//! Audio is coded in fixed-size frames of `B` MDCTs of size `N` with a short
//! overlap. Each frame carries band energies, an optional long-term (pitch)
//! prediction from previously synthesised audio, and a pulse-coded residual
//! per band. Frames always fill the byte budget they are given; the unused
//! tail is padded with an alternating bit pattern that the decoder checks.
//!
//! ```
//! use tonos::{CeltDecoder, CeltEncoder, CeltMode};
//!
//! let mode = CeltMode::new(48_000, 1, 256, 1, 128)?;
//! let mut encoder = CeltEncoder::new(&mode)?;
//! let mut decoder = CeltDecoder::new(&mode)?;
//!
//! let mut pcm = vec![0i16; mode.frame_size()];
//! let mut frame = [0u8; 64];
//! encoder.encode(&mut pcm, &mut frame)?;
//!
//! let mut out = vec![0i16; mode.frame_size()];
//! decoder.decode(Some(&frame[..]), &mut out)?;
//! decoder.decode(None, &mut out)?; // lost frame
//! # Ok::<(), tonos::CeltError>(())
//! ```

extern crate alloc;

mod celt;
mod diagnostics;
mod error;

pub use celt::{CeltDecoder, CeltEncoder, CeltMode, MAX_CHANNELS, MAX_PERIOD};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use error::CeltError;
