//! Frame decoder and packet loss concealment.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use super::bands::{
    MixDirection, compute_band_energies, denormalise_bands, normalise_bands, pitch_quant_bands,
    renormalise_bands, stereo_mix, unquant_bands,
};
use super::celt::{MAX_BYTES, MAX_PERIOD, compute_inv_mdcts, compute_mdcts, deemphasis};
use super::entdec::EcDec;
use super::history::RollingHistory;
use super::modes::CeltMode;
use super::quant_bands::unquant_energy;
use super::quant_pitch::unquant_pitch;
use super::types::CeltSig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::CeltError;

/// Decoder state for one stream.
pub struct CeltDecoder<'mode> {
    mode: &'mode CeltMode,
    preemph_mem_d: Vec<CeltSig>,
    mdct_overlap: Vec<CeltSig>,
    out_mem: RollingHistory,
    old_band_e: Vec<f32>,
    last_pitch_index: usize,
    diagnostics: Box<dyn DiagnosticSink + Send>,
}

impl<'mode> CeltDecoder<'mode> {
    /// Creates a decoder with silent history for `mode`.
    pub fn new(mode: &'mode CeltMode) -> Result<Self, CeltError> {
        mode.check()?;
        let channels = mode.channels();
        Ok(Self {
            mode,
            preemph_mem_d: vec![0.0; channels],
            mdct_overlap: vec![0.0; channels * mode.overlap()],
            out_mem: RollingHistory::new(MAX_PERIOD, channels),
            old_band_e: vec![0.0; channels * mode.nb_ebands()],
            last_pitch_index: 0,
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

    /// Decodes one frame into `pcm` (`frame_size() * channels()` samples).
    ///
    /// `None` or an empty slice marks the frame as lost and synthesises a
    /// replacement from the history instead. A frame whose trailing padding
    /// does not match the expected pattern yields
    /// [`CeltError::CorruptedData`]; the output and the decoder state have
    /// already been updated by then.
    pub fn decode(&mut self, data: Option<&[u8]>, pcm: &mut [i16]) -> Result<(), CeltError> {
        self.mode.check()?;
        let mode = self.mode;
        let channels = mode.channels();
        let frame = mode.frame_size();
        if pcm.len() != channels * frame {
            return Err(CeltError::BadArgument);
        }
        let data = match data {
            Some(data) if !data.is_empty() => data,
            _ => {
                self.conceal(pcm);
                return Ok(());
            }
        };
        if data.len() > MAX_BYTES {
            return Err(CeltError::BadArgument);
        }
        let total_bits = (data.len() * 8) as i32;
        let span = mode.analysis_len();

        let mut dec = EcDec::new(data);
        let mut band_e = vec![0.0; channels * mode.nb_ebands()];
        unquant_energy(mode, &mut band_e, &mut self.old_band_e, total_bits / 3, &mut dec);

        let mut gains = vec![0.0; mode.nb_pbands()];
        let has_pitch = unquant_pitch(&mut gains, mode.pitch_codebook(), &mut dec);

        let mut freq = vec![0.0; channels * frame];
        let mut p = vec![0.0; channels * frame];
        if has_pitch {
            let pitch_index = dec.dec_uint((MAX_PERIOD - span) as u32) as usize;
            self.last_pitch_index = pitch_index;

            let mut pitch_input = vec![0.0; channels * span];
            self.out_mem.copy_segment(pitch_index, span, &mut pitch_input);
            compute_mdcts(mode, &pitch_input, &mut freq);

            let mut pitch_band_e = vec![0.0; channels * mode.nb_ebands()];
            compute_band_energies(mode, &freq, &mut pitch_band_e);
            normalise_bands(mode, &freq, &mut p, &pitch_band_e);
            if channels == 2 {
                stereo_mix(mode, &mut p, &band_e, MixDirection::Forward);
            }
            log::trace!("pitch lag {pitch_index}");
        }
        pitch_quant_bands(mode, &mut p, &gains);

        let mut x = vec![0.0; channels * frame];
        unquant_bands(mode, &mut x, &p, total_bits, &mut dec);

        if channels == 2 {
            stereo_mix(mode, &mut x, &band_e, MixDirection::Inverse);
            renormalise_bands(mode, &mut x);
        }
        denormalise_bands(mode, &x, &mut freq, &band_e);

        self.synthesise(&freq, pcm);

        let mut val = 0;
        while dec.tell() < total_bits {
            let position = dec.tell();
            if dec.dec_uint(2) != val {
                self.diagnostics.report(&Diagnostic::CorruptedTrailer {
                    position: position as usize,
                });
                return Err(CeltError::CorruptedData);
            }
            val = 1 - val;
        }
        Ok(())
    }

    /// Repeats the waveform found at the last decoded pitch lag.
    fn conceal(&mut self, pcm: &mut [i16]) {
        let mode = self.mode;
        let channels = mode.channels();
        let span = mode.analysis_len();
        log::debug!("frame lost, extrapolating from lag {}", self.last_pitch_index);

        let mut segment = vec![0.0; channels * span];
        self.out_mem
            .copy_segment(self.last_pitch_index, span, &mut segment);
        let mut freq = vec![0.0; channels * mode.frame_size()];
        compute_mdcts(mode, &segment, &mut freq);

        self.synthesise(&freq, pcm);
    }

    fn synthesise(&mut self, freq: &[CeltSig], pcm: &mut [i16]) {
        let mode = self.mode;
        self.out_mem.advance(mode.frame_size());
        compute_inv_mdcts(mode, freq, &mut self.out_mem, &mut self.mdct_overlap);
        deemphasis(&self.out_mem, mode.channels(), &mut self.preemph_mem_d, pcm);
    }
}

impl fmt::Debug for CeltDecoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CeltDecoder")
            .field("mode", self.mode)
            .field("old_band_e", &self.old_band_e)
            .field("last_pitch_index", &self.last_pitch_index)
            .finish_non_exhaustive()
    }
}
