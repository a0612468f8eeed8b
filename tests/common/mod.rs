#![allow(dead_code)]

use std::f32::consts::PI;
use std::sync::{Arc, Mutex};

use tonos::{CeltDecoder, CeltEncoder, CeltError, CeltMode, Diagnostic};

/// Layouts exercised by the integration tests: (rate, channels, N, B, overlap).
pub const LAYOUTS: &[(u32, usize, usize, usize, usize)] = &[
    (48_000, 1, 256, 1, 128),
    (48_000, 2, 128, 2, 64),
    (44_100, 1, 64, 3, 32),
    (32_000, 2, 160, 1, 80),
];

pub fn mode(layout: (u32, usize, usize, usize, usize)) -> CeltMode {
    let (rate, channels, n, b, overlap) = layout;
    CeltMode::new(rate, channels, n, b, overlap).expect("valid layout")
}

/// One interleaved frame of a sine starting at sample `offset`. The right
/// channel, if any, runs at half amplitude.
pub fn sine(mode: &CeltMode, offset: usize, period: f32, amplitude: f32) -> Vec<i16> {
    let channels = mode.channels();
    let frame = mode.frame_size();
    (0..frame * channels)
        .map(|k| {
            let t = (offset + k / channels) as f32;
            let gain = if k % channels == 0 { 1.0 } else { 0.5 };
            (gain * amplitude * (2.0 * PI * t / period).sin()) as i16
        })
        .collect()
}

/// Deterministic pseudo-random PCM for property tests.
pub struct Noise(u32);

impl Noise {
    pub fn new(seed: u32) -> Self {
        Self(seed ^ 0x9E37_79B9)
    }

    pub fn next_sample(&mut self, amplitude: i32) -> i16 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let unit = (self.0 >> 8) as i32 % (2 * amplitude + 1);
        (unit - amplitude) as i16
    }

    pub fn frame(&mut self, mode: &CeltMode, amplitude: i32) -> Vec<i16> {
        (0..mode.frame_size() * mode.channels())
            .map(|_| self.next_sample(amplitude))
            .collect()
    }
}

/// Signal-to-noise ratio in dB of `got` against `want`.
pub fn snr_db(want: &[f32], got: &[f32]) -> f32 {
    let signal: f32 = want.iter().map(|v| v * v).sum();
    let noise: f32 = want.iter().zip(got).map(|(a, b)| (a - b) * (a - b)).sum();
    10.0 * (signal / noise.max(1e-9)).log10()
}

/// Shared list of every diagnostic a codec reported.
#[derive(Clone, Default)]
pub struct Collected(Arc<Mutex<Vec<Diagnostic>>>);

impl Collected {
    pub fn sink(&self) -> impl FnMut(&Diagnostic) + Send + 'static {
        let events = Arc::clone(&self.0);
        move |d: &Diagnostic| events.lock().expect("sink lock").push(*d)
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.0.lock().expect("sink lock").clone()
    }
}

/// Encodes `pcm` in place and returns the frame, or the encoder error.
pub fn encode_frame(
    enc: &mut CeltEncoder<'_>,
    pcm: &mut [i16],
    bytes: usize,
) -> Result<Vec<u8>, CeltError> {
    let mut out = vec![0u8; bytes];
    let written = enc.encode(pcm, &mut out)?;
    assert_eq!(written, bytes);
    Ok(out)
}

pub fn decode_frame(
    dec: &mut CeltDecoder<'_>,
    data: Option<&[u8]>,
) -> Result<Vec<i16>, CeltError> {
    let mut pcm = vec![0i16; dec.frame_size() * dec.channels()];
    dec.decode(data, &mut pcm)?;
    Ok(pcm)
}
