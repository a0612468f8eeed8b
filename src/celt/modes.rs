//! Immutable codec configuration shared by encoders and decoders.
//!
//! A [`CeltMode`] fixes the frame geometry (block size, block count, overlap,
//! channel count) and owns every table derived from it: the energy band
//! layout, the pitch band layout, the power-complementary window, the MDCT
//! plan and the pitch-gain codebook. Modes are validated once when built and
//! again at the top of every encode or decode call.

use alloc::vec::Vec;
use core::f32::consts::FRAC_PI_2;

use libm::sinf;

use super::celt::{MAX_CHANNELS, MAX_PERIOD};
use super::mdct::MdctLookup;
use super::mini_kfft::MiniKissFft;
use super::quant_pitch::{PITCH_CODEBOOK_SIZE, pitch_gain_codebook};
use super::types::{CeltCoef, CeltPGain};
use crate::error::CeltError;

/// Energy band edges in Hz, roughly following the Bark scale.
const BARK_EDGES_HZ: [u32; 25] = [
    0, 100, 200, 300, 400, 510, 630, 770, 920, 1080, 1270, 1480, 1720, 2000, 2320, 2700, 3150,
    3700, 4400, 5300, 6400, 7700, 9500, 12000, 15500,
];

/// Pitch band edges in Hz.
const PITCH_EDGES_HZ: [u32; 9] = [0, 400, 800, 1200, 1600, 2400, 3600, 5200, 8000];

/// Narrowest energy band produced by the default layout, in bins.
const MIN_EBAND_WIDTH: usize = 2;

const MIN_SAMPLE_RATE: u32 = 8_000;
const MAX_SAMPLE_RATE: u32 = 96_000;

#[derive(Clone, Debug)]
pub struct CeltMode {
    sample_rate: u32,
    channels: usize,
    block_size: usize,
    nb_blocks: usize,
    overlap: usize,
    e_bands: Vec<usize>,
    p_bands: Vec<usize>,
    window: Vec<CeltCoef>,
    pub(crate) mdct: MdctLookup,
    pitch_codebook: Vec<CeltPGain>,
}

impl CeltMode {
    /// Builds a mode with the default band layouts for `sample_rate`.
    ///
    /// `block_size` is the MDCT size N, `nb_blocks` the number of MDCTs per
    /// frame B, and `overlap` the length of the windowed region shared by
    /// consecutive blocks.
    pub fn new(
        sample_rate: u32,
        channels: usize,
        block_size: usize,
        nb_blocks: usize,
        overlap: usize,
    ) -> Result<Self, CeltError> {
        check_geometry(sample_rate, channels, block_size, nb_blocks, overlap)?;
        let e_bands = default_energy_bands(sample_rate, block_size);
        let p_bands = default_pitch_bands(sample_rate, block_size);
        Self::with_bands(
            sample_rate,
            channels,
            block_size,
            nb_blocks,
            overlap,
            e_bands,
            p_bands,
        )
    }

    /// Builds a mode from explicit band tables.
    ///
    /// `e_bands` must rise strictly from 0 to `block_size`; `p_bands` must
    /// rise strictly within `0..=block_size` and hold at least two edges.
    pub fn with_bands(
        sample_rate: u32,
        channels: usize,
        block_size: usize,
        nb_blocks: usize,
        overlap: usize,
        e_bands: Vec<usize>,
        p_bands: Vec<usize>,
    ) -> Result<Self, CeltError> {
        check_geometry(sample_rate, channels, block_size, nb_blocks, overlap)?;
        check_bands(&e_bands, &p_bands, block_size)?;

        let mdct = MdctLookup::new(block_size).ok_or(CeltError::InvalidMode)?;
        let window = power_complementary_window(overlap);
        let pitch_codebook = pitch_gain_codebook(p_bands.len() - 1);

        let mode = Self {
            sample_rate,
            channels,
            block_size,
            nb_blocks,
            overlap,
            e_bands,
            p_bands,
            window,
            mdct,
            pitch_codebook,
        };
        mode.check()?;
        log::debug!(
            "mode: {} Hz, {} ch, {}x{} samples, overlap {}, {} energy bands, {} pitch bands",
            mode.sample_rate,
            mode.channels,
            mode.nb_blocks,
            mode.block_size,
            mode.overlap,
            mode.nb_ebands(),
            mode.nb_pbands()
        );
        Ok(mode)
    }

    /// Verifies that every derived table is consistent with the geometry.
    pub fn check(&self) -> Result<(), CeltError> {
        check_geometry(
            self.sample_rate,
            self.channels,
            self.block_size,
            self.nb_blocks,
            self.overlap,
        )?;
        check_bands(&self.e_bands, &self.p_bands, self.block_size)?;
        if self.window.len() != self.overlap
            || self.mdct.size() != self.block_size
            || self.pitch_codebook.len() != PITCH_CODEBOOK_SIZE * self.nb_pbands()
        {
            return Err(CeltError::InvalidMode);
        }
        Ok(())
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub fn nb_blocks(&self) -> usize {
        self.nb_blocks
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Samples per channel consumed or produced by one call.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.block_size * self.nb_blocks
    }

    /// Samples per channel spanned by the MDCT input of one frame.
    #[must_use]
    pub(crate) fn analysis_len(&self) -> usize {
        self.frame_size() + self.overlap
    }

    /// Energy band edges, in bins of a single block.
    #[must_use]
    pub fn e_bands(&self) -> &[usize] {
        &self.e_bands
    }

    /// Pitch band edges, in bins of a single block.
    #[must_use]
    pub fn p_bands(&self) -> &[usize] {
        &self.p_bands
    }

    #[must_use]
    pub fn window(&self) -> &[CeltCoef] {
        &self.window
    }

    #[must_use]
    pub fn nb_ebands(&self) -> usize {
        self.e_bands.len() - 1
    }

    #[must_use]
    pub fn nb_pbands(&self) -> usize {
        self.p_bands.len() - 1
    }

    pub(crate) fn pitch_codebook(&self) -> &[CeltPGain] {
        &self.pitch_codebook
    }
}

fn check_geometry(
    sample_rate: u32,
    channels: usize,
    block_size: usize,
    nb_blocks: usize,
    overlap: usize,
) -> Result<(), CeltError> {
    let valid = (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate)
        && (1..=MAX_CHANNELS).contains(&channels)
        && block_size >= 4
        && block_size % 4 == 0
        && MiniKissFft::supports(block_size / 2)
        && nb_blocks >= 1
        && overlap <= block_size
        && (block_size - overlap) % 2 == 0
        && nb_blocks
            .checked_mul(block_size)
            .and_then(|frame| frame.checked_add(overlap))
            .is_some_and(|span| span + 2 <= MAX_PERIOD);
    if valid {
        Ok(())
    } else {
        Err(CeltError::InvalidMode)
    }
}

fn check_bands(e_bands: &[usize], p_bands: &[usize], block_size: usize) -> Result<(), CeltError> {
    let increasing = |edges: &[usize]| edges.windows(2).all(|w| w[0] < w[1]);
    let e_ok = e_bands.len() >= 2
        && e_bands.first() == Some(&0)
        && e_bands.last() == Some(&block_size)
        && increasing(e_bands);
    let p_ok = p_bands.len() >= 2
        && p_bands.last().is_some_and(|&last| last <= block_size)
        && increasing(p_bands);
    if e_ok && p_ok {
        Ok(())
    } else {
        Err(CeltError::InvalidMode)
    }
}

/// Index of the MDCT bin whose lower edge is closest to `hz`.
fn hz_to_bin(hz: u32, sample_rate: u32, block_size: usize) -> usize {
    let num = u64::from(hz) * 2 * block_size as u64 + u64::from(sample_rate / 2);
    (num / u64::from(sample_rate)) as usize
}

fn default_energy_bands(sample_rate: u32, block_size: usize) -> Vec<usize> {
    let mut bands = alloc::vec![0usize];
    for &hz in &BARK_EDGES_HZ[1..] {
        let bin = hz_to_bin(hz, sample_rate, block_size);
        let last = bands.last().copied().unwrap_or(0);
        if bin >= last + MIN_EBAND_WIDTH && bin + MIN_EBAND_WIDTH <= block_size {
            bands.push(bin);
        }
    }
    bands.push(block_size);
    bands
}

fn default_pitch_bands(sample_rate: u32, block_size: usize) -> Vec<usize> {
    let mut bands = alloc::vec![0usize];
    for &hz in &PITCH_EDGES_HZ[1..] {
        let bin = hz_to_bin(hz, sample_rate, block_size).min(block_size);
        if bands.last().is_some_and(|&last| bin > last) {
            bands.push(bin);
        }
    }
    bands
}

/// `w[i] = sin(pi/2 * sin^2(pi/2 * (i + 1/2) / overlap))`, which satisfies
/// `w[i]^2 + w[overlap - 1 - i]^2 = 1`.
fn power_complementary_window(overlap: usize) -> Vec<CeltCoef> {
    (0..overlap)
        .map(|i| {
            let s = sinf(FRAC_PI_2 * (i as f32 + 0.5) / overlap as f32);
            sinf(FRAC_PI_2 * s * s)
        })
        .collect()
}
