//! Codec core.
//!
//! The frame pipeline lives in `celt_encoder` and `celt_decoder`; the other
//! modules are the stages they drive: range coding, the MDCT, band
//! normalisation, pitch prediction and the quantisers.

mod bands;
mod celt;
mod celt_decoder;
mod celt_encoder;
mod cwrs;
mod entcode;
mod entdec;
mod entenc;
mod float_cast;
mod history;
mod laplace;
mod math;
mod mdct;
mod mini_kfft;
mod modes;
mod pitch;
mod quant_bands;
mod quant_pitch;
mod rate;
mod types;
mod vq;

pub use celt::{MAX_CHANNELS, MAX_PERIOD};
pub use celt_decoder::CeltDecoder;
pub use celt_encoder::CeltEncoder;
pub use modes::CeltMode;
