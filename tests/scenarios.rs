mod common;

use common::{Collected, LAYOUTS, Noise, decode_frame, encode_frame, mode, sine, snr_db};
use tonos::{CeltDecoder, CeltEncoder, CeltError, CeltMode, Diagnostic};

const MONO: (u32, usize, usize, usize, usize) = (48_000, 1, 256, 1, 128);

#[test]
fn silence_decodes_to_silence() {
    for &layout in LAYOUTS {
        let mode = mode(layout);
        let mut enc = CeltEncoder::new(&mode).unwrap();
        let mut dec = CeltDecoder::new(&mode).unwrap();
        for _ in 0..4 {
            let mut pcm = vec![0i16; mode.frame_size() * mode.channels()];
            let frame = encode_frame(&mut enc, &mut pcm, 64).unwrap();
            assert!(pcm.iter().all(|&s| s == 0));
            let out = decode_frame(&mut dec, Some(&frame)).unwrap();
            assert!(out.iter().all(|&s| s == 0), "{layout:?}");
        }
    }
}

#[test]
fn sinusoid_survives_a_generous_budget() {
    let mode = mode(MONO);
    let frame = mode.frame_size();
    let overlap = mode.overlap();
    let mut enc = CeltEncoder::new(&mode).unwrap();
    let mut dec = CeltDecoder::new(&mode).unwrap();

    let mut input = Vec::new();
    let mut output = Vec::new();
    for i in 0..20 {
        let mut pcm = sine(&mode, i * frame, 96.0, 8000.0);
        input.extend(pcm.iter().map(|&s| f32::from(s)));
        let bytes = encode_frame(&mut enc, &mut pcm, 400).unwrap();
        let out = decode_frame(&mut dec, Some(&bytes)).unwrap();
        assert_eq!(out, pcm);
        output.extend(out.iter().map(|&s| f32::from(s)));
    }

    let start = 4 * frame;
    let want = &input[start - overlap..input.len() - overlap];
    let got = &output[start..];
    let snr = snr_db(want, got);
    assert!(snr > 6.0, "snr {snr} dB");
}

#[test]
fn flipped_trailer_is_reported_as_corruption() {
    let mode = mode(MONO);
    let mut enc = CeltEncoder::new(&mode).unwrap();
    let mut dec = CeltDecoder::new(&mode).unwrap();
    let seen = Collected::default();
    dec.set_diagnostics(seen.sink());

    let mut pcm = vec![0i16; mode.frame_size()];
    let mut frame = encode_frame(&mut enc, &mut pcm, 128).unwrap();
    for byte in &mut frame[80..] {
        *byte ^= 0xFF;
    }
    assert_eq!(
        decode_frame(&mut dec, Some(&frame)),
        Err(CeltError::CorruptedData)
    );
    assert!(
        seen.events()
            .iter()
            .any(|d| matches!(d, Diagnostic::CorruptedTrailer { .. }))
    );
}

#[test]
fn damaged_tail_of_busy_frames_is_caught() {
    for &layout in LAYOUTS {
        let mode = mode(layout);
        let mut enc = CeltEncoder::new(&mode).unwrap();
        let mut clean = CeltDecoder::new(&mode).unwrap();
        let mut damaged = CeltDecoder::new(&mode).unwrap();
        let mut noise = Noise::new(layout.0 ^ layout.2 as u32);
        for i in 0..12 {
            let mut pcm = noise.frame(&mode, 300);
            let mut frame = encode_frame(&mut enc, &mut pcm, 200).unwrap();
            assert_eq!(decode_frame(&mut clean, Some(&frame)), Ok(pcm));

            // The final few bytes rather than one: a change smaller than the
            // last coded interval is undetectable.
            for byte in &mut frame[197..] {
                *byte ^= 0xFF;
            }
            assert_eq!(
                decode_frame(&mut damaged, Some(&frame)),
                Err(CeltError::CorruptedData),
                "{layout:?} frame {i}"
            );
        }
    }
}

#[test]
fn pitch_bands_above_bin_zero_stay_in_sync() {
    let mode =
        CeltMode::with_bands(48_000, 1, 64, 1, 32, vec![0, 8, 16, 32, 64], vec![16, 32]).unwrap();
    let mut enc = CeltEncoder::new(&mode).unwrap();
    let mut dec = CeltDecoder::new(&mode).unwrap();
    for i in 0..30 {
        let mut pcm = sine(&mode, i * 64, 40.0, 8000.0);
        let frame = encode_frame(&mut enc, &mut pcm, 100).unwrap();
        assert_eq!(decode_frame(&mut dec, Some(&frame)), Ok(pcm), "frame {i}");
    }
}

#[test]
fn frame_boundaries_are_seamless() {
    let mode = mode(MONO);
    let frame = mode.frame_size();
    let mut enc = CeltEncoder::new(&mode).unwrap();
    let mut dec = CeltDecoder::new(&mode).unwrap();
    let mut output = Vec::new();
    for i in 0..16 {
        let mut pcm = sine(&mode, i * frame, 96.0, 8000.0);
        let bytes = encode_frame(&mut enc, &mut pcm, 400).unwrap();
        output.extend(decode_frame(&mut dec, Some(&bytes)).unwrap());
    }

    let step = |t: usize| (i32::from(output[t]) - i32::from(output[t - 1])).abs();
    let warm = 4 * frame;
    let interior = (warm..output.len())
        .filter(|t| t % frame != 0)
        .map(step)
        .max()
        .unwrap();
    let boundary = (warm..output.len())
        .step_by(frame)
        .map(step)
        .max()
        .unwrap();
    assert!(boundary <= 2 * interior, "boundary step {boundary}, interior {interior}");
}

#[test]
fn concealment_runs_through_long_losses() {
    let mode = mode(MONO);
    let frame = mode.frame_size();
    let mut enc = CeltEncoder::new(&mode).unwrap();
    let mut dec = CeltDecoder::new(&mode).unwrap();

    for i in 0..8 {
        let mut pcm = sine(&mode, i * frame, 120.0, 6000.0);
        let bytes = encode_frame(&mut enc, &mut pcm, 300).unwrap();
        decode_frame(&mut dec, Some(&bytes)).unwrap();
    }

    let first = decode_frame(&mut dec, None).unwrap();
    assert!(first.iter().any(|&s| s != 0));
    let empty: &[u8] = &[];
    for _ in 0..40 {
        decode_frame(&mut dec, Some(empty)).unwrap();
        decode_frame(&mut dec, None).unwrap();
    }

    // The stream resumes once frames arrive again.
    for i in 8..12 {
        let mut pcm = sine(&mode, i * frame, 120.0, 6000.0);
        let bytes = encode_frame(&mut enc, &mut pcm, 300).unwrap();
        assert!(decode_frame(&mut dec, Some(&bytes)).is_ok());
    }
}

#[test]
fn stereo_decoder_tracks_encoder_synthesis() {
    for &layout in LAYOUTS.iter().filter(|l| l.1 == 2) {
        let mode = mode(layout);
        let frame = mode.frame_size();
        let mut enc = CeltEncoder::new(&mode).unwrap();
        let mut dec = CeltDecoder::new(&mode).unwrap();
        for (i, bytes) in [48usize, 96, 200, 500, 96, 48].into_iter().enumerate() {
            let mut pcm = sine(&mode, i * frame, 70.0, 10_000.0);
            let data = encode_frame(&mut enc, &mut pcm, bytes).unwrap();
            assert_eq!(decode_frame(&mut dec, Some(&data)), Ok(pcm), "{layout:?}");
        }
    }
}

#[test]
fn unused_budget_is_reported() {
    let mode = mode(MONO);
    let mut enc = CeltEncoder::new(&mode).unwrap();
    let seen = Collected::default();
    enc.set_diagnostics(seen.sink());
    let mut pcm = vec![0i16; mode.frame_size()];
    encode_frame(&mut enc, &mut pcm, 1000).unwrap();
    assert!(matches!(
        seen.events().as_slice(),
        [Diagnostic::UnusedBits { unused }] if *unused > 7000
    ));
}

#[test]
fn invalid_layouts_are_rejected() {
    for &(rate, channels, n, b, overlap) in &[
        (48_000u32, 0usize, 256usize, 1usize, 128usize),
        (48_000, 3, 256, 1, 128),
        (48_000, 1, 254, 1, 128),
        (48_000, 1, 256, 1, 300),
        (48_000, 1, 256, 4, 128),
        (4_000, 1, 64, 1, 32),
        (48_000, 1, 64, 0, 32),
    ] {
        assert_eq!(
            CeltMode::new(rate, channels, n, b, overlap).err(),
            Some(CeltError::InvalidMode),
            "{rate} {channels} {n} {b} {overlap}"
        );
    }
    assert_eq!(
        CeltMode::with_bands(48_000, 1, 64, 1, 32, vec![0, 40, 30, 64], vec![0, 8, 16]).err(),
        Some(CeltError::InvalidMode)
    );
}

#[test]
fn mismatched_buffers_are_bad_arguments() {
    let mode = mode(LAYOUTS[1]);
    let mut enc = CeltEncoder::new(&mode).unwrap();
    let mut dec = CeltDecoder::new(&mode).unwrap();
    let len = mode.frame_size() * mode.channels();

    let mut short = vec![0i16; len - 1];
    assert_eq!(
        enc.encode(&mut short, &mut [0u8; 64]),
        Err(CeltError::BadArgument)
    );
    assert_eq!(dec.decode(None, &mut short), Err(CeltError::BadArgument));

    let mut pcm = vec![0i16; len];
    let oversized = vec![0u8; 1276];
    assert_eq!(
        dec.decode(Some(oversized.as_slice()), &mut pcm),
        Err(CeltError::BadArgument)
    );
}
