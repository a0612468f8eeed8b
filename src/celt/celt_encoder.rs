//! Frame encoder.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use super::bands::{
    MixDirection, compute_band_energies, compute_pitch_gain, denormalise_bands, normalise_bands,
    pitch_quant_bands, quant_bands, renormalise_bands, stereo_mix,
};
use super::celt::{
    MAX_BYTES, MAX_PERIOD, compute_inv_mdcts, compute_mdcts, deemphasis, preemphasis,
};
use super::entenc::EcEnc;
use super::history::RollingHistory;
use super::modes::CeltMode;
use super::pitch::pitch_search;
use super::quant_bands::quant_energy;
use super::quant_pitch::{PITCH_CODEBOOK_SIZE, quant_pitch};
use super::types::CeltSig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::CeltError;

/// The pitch candidate must carry more than this share of the frame energy.
const PITCH_ADMISSION_RATIO: f32 = 0.1;
/// Additive margin of the admission test, in the 1/16-scaled energy domain.
const PITCH_ADMISSION_MARGIN: f32 = 10_000.0 / 256.0;

/// Encoder state for one stream.
///
/// Each call to [`CeltEncoder::encode`] consumes exactly one frame of
/// `frame_size() * channels()` interleaved samples and produces a frame of
/// exactly the requested byte length.
pub struct CeltEncoder<'mode> {
    mode: &'mode CeltMode,
    preemph_mem_e: Vec<CeltSig>,
    preemph_mem_d: Vec<CeltSig>,
    in_mem: Vec<CeltSig>,
    mdct_overlap: Vec<CeltSig>,
    out_mem: RollingHistory,
    old_band_e: Vec<f32>,
    diagnostics: Box<dyn DiagnosticSink + Send>,
}

impl<'mode> CeltEncoder<'mode> {
    /// Creates an encoder with silent history for `mode`.
    pub fn new(mode: &'mode CeltMode) -> Result<Self, CeltError> {
        mode.check()?;
        let channels = mode.channels();
        let overlap = mode.overlap();
        Ok(Self {
            mode,
            preemph_mem_e: vec![0.0; channels],
            preemph_mem_d: vec![0.0; channels],
            in_mem: vec![0.0; channels * overlap],
            mdct_overlap: vec![0.0; channels * overlap],
            out_mem: RollingHistory::new(MAX_PERIOD, channels),
            old_band_e: vec![0.0; channels * mode.nb_ebands()],
            diagnostics: Box::new(LogSink),
        })
    }

    /// Replaces the sink receiving non-fatal diagnostics.
    pub fn set_diagnostics<S>(&mut self, sink: S)
    where
        S: DiagnosticSink + Send + 'static,
    {
        self.diagnostics = Box::new(sink);
    }

    #[must_use]
    pub fn mode(&self) -> &'mode CeltMode {
        self.mode
    }

    /// Samples per channel in one frame.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.mode.frame_size()
    }

    #[must_use]
    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    /// Encodes one frame of interleaved PCM into `compressed`.
    ///
    /// The whole of `compressed` is always written: unused capacity carries an
    /// alternating bit pattern the decoder checks. On return `pcm` holds the
    /// encoder's own reconstruction, which is what a decoder fed the same
    /// bytes outputs. Returns the number of bytes written, always
    /// `compressed.len()`.
    pub fn encode(&mut self, pcm: &mut [i16], compressed: &mut [u8]) -> Result<usize, CeltError> {
        self.mode.check()?;
        let mode = self.mode;
        let channels = mode.channels();
        let frame = mode.frame_size();
        let nb_bytes = compressed.len();
        if pcm.len() != channels * frame || nb_bytes == 0 || nb_bytes > MAX_BYTES {
            return Err(CeltError::BadArgument);
        }
        let total_bits = (nb_bytes * 8) as i32;
        let span = mode.analysis_len();

        let input = preemphasis(
            pcm,
            channels,
            mode.overlap(),
            &mut self.preemph_mem_e,
            &mut self.in_mem,
        );
        let pitch_index = pitch_search(mode, &input, &self.out_mem);

        let mut freq = vec![0.0; channels * frame];
        let curr_power = compute_mdcts(mode, &input, &mut freq);

        let mut band_e = vec![0.0; channels * mode.nb_ebands()];
        let mut x = vec![0.0; channels * frame];
        compute_band_energies(mode, &freq, &mut band_e);
        normalise_bands(mode, &freq, &mut x, &band_e);

        let mut pitch_input = vec![0.0; channels * span];
        self.out_mem.copy_segment(pitch_index, span, &mut pitch_input);
        let pitch_power = compute_mdcts(mode, &pitch_input, &mut freq);

        let mut enc = EcEnc::new(compressed);
        quant_energy(mode, &mut band_e, &mut self.old_band_e, total_bits / 3, &mut enc);

        if channels == 2 {
            stereo_mix(mode, &mut x, &band_e, MixDirection::Forward);
        }

        let mut p = vec![0.0; channels * frame];
        let mut gains = vec![0.0; mode.nb_pbands()];
        if PITCH_ADMISSION_RATIO * curr_power + PITCH_ADMISSION_MARGIN < pitch_power {
            let mut pitch_band_e = vec![0.0; channels * mode.nb_ebands()];
            compute_band_energies(mode, &freq, &mut pitch_band_e);
            normalise_bands(mode, &freq, &mut p, &pitch_band_e);
            if channels == 2 {
                stereo_mix(mode, &mut p, &band_e, MixDirection::Forward);
            }
            compute_pitch_gain(mode, &x, &p, &mut gains);
            let has_pitch = quant_pitch(&mut gains, mode.pitch_codebook(), &mut enc);
            if has_pitch {
                enc.enc_uint(pitch_index as u32, (MAX_PERIOD - span) as u32);
            }
            log::trace!("pitch admitted: lag {pitch_index}, coded {has_pitch}");
        } else {
            enc.enc_uint(0, PITCH_CODEBOOK_SIZE as u32);
            log::trace!("pitch rejected: {pitch_power} vs frame {curr_power}");
        }

        pitch_quant_bands(mode, &mut p, &gains);
        for (xv, &pv) in x.iter_mut().zip(&p) {
            *xv -= pv;
        }
        quant_bands(mode, &mut x, &p, total_bits, &mut enc);

        if channels == 2 {
            stereo_mix(mode, &mut x, &band_e, MixDirection::Inverse);
            renormalise_bands(mode, &mut x);
        }
        denormalise_bands(mode, &x, &mut freq, &band_e);

        self.out_mem.advance(frame);
        compute_inv_mdcts(mode, &freq, &mut self.out_mem, &mut self.mdct_overlap);
        deemphasis(&self.out_mem, channels, &mut self.preemph_mem_d, pcm);

        let tell = enc.tell();
        if tell < total_bits - 7 {
            self.diagnostics.report(&Diagnostic::UnusedBits {
                unused: (total_bits - tell) as usize,
            });
        }
        log::trace!("frame coded in {tell} of {total_bits} bits");

        let mut val = 0;
        while enc.tell() < total_bits {
            enc.enc_uint(val, 2);
            val = 1 - val;
        }
        let used = enc.tell();
        enc.enc_done();

        if enc.error() || used > total_bits {
            self.diagnostics.report(&Diagnostic::TooManyBytes {
                produced: (used.max(0) as usize).div_ceil(8),
                budget: nb_bytes,
            });
            return Err(CeltError::InternalError);
        }
        Ok(nb_bytes)
    }
}

impl fmt::Debug for CeltEncoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CeltEncoder")
            .field("mode", self.mode)
            .field("old_band_e", &self.old_band_e)
            .finish_non_exhaustive()
    }
}
