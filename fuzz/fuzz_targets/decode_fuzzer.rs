#![no_main]

use libfuzzer_sys::fuzz_target;
use tonos::{CeltDecoder, CeltMode};

const SETUP_BYTE_COUNT: usize = 4;
const MAX_DECODES: usize = 16;

/// Geometries the first input byte selects from.
const MODES: [(u32, usize, usize, usize, usize); 4] = [
    (48_000, 1, 256, 1, 128),
    (48_000, 2, 256, 2, 128),
    (32_000, 2, 160, 2, 64),
    (16_000, 1, 120, 3, 40),
];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (rate, channels, n, b, overlap) = MODES[usize::from(data[0]) % MODES.len()];
    let Ok(mode) = CeltMode::new(rate, channels, n, b, overlap) else {
        return;
    };
    let Ok(mut decoder) = CeltDecoder::new(&mode) else {
        return;
    };
    let mut pcm = vec![0i16; mode.frame_size() * channels];

    // Each record is a big-endian u16 length, one flag byte and one spare
    // byte, followed by the frame. A zero length decodes a lost frame.
    let mut i = 1usize;
    let mut num_decodes = 0usize;
    while i + SETUP_BYTE_COUNT <= data.len() && num_decodes < MAX_DECODES {
        num_decodes += 1;
        let len = usize::from(u16::from_be_bytes([data[i], data[i + 1]]));
        let start = i + SETUP_BYTE_COUNT;
        let Some(end) = start.checked_add(len).filter(|&end| end <= data.len()) else {
            break;
        };
        let lost = data[i + 2] & 1 != 0;
        let frame = if lost { None } else { Some(&data[start..end]) };
        let _ = decoder.decode(frame, &mut pcm);
        i = end;
    }
});
