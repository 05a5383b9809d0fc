//! Placeholder audio synthesis
//!
//! Renders a layered sine patch (fundamental plus detuned partials under a
//! slow amplitude envelope) to a 16-bit stereo WAV payload. The only contract
//! is a decodable payload of the requested duration; no signal processing
//! beyond that is intended.

use crate::error::{Error, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f32::consts::PI;
use std::io::Cursor;

/// Working sample rate (44.1 kHz)
const SAMPLE_RATE: u32 = 44100;

/// Partials relative to the fundamental: (frequency ratio, amplitude)
const PARTIALS: [(f32, f32); 4] = [
    (1.0, 0.50),
    (1.5, 0.22),
    (2.01, 0.14),
    (3.0, 0.06),
];

/// Synthesize a sine-based WAV payload of the given duration
pub fn synthesize_wav(duration_secs: u32, fundamental_hz: f32) -> Result<Vec<u8>> {
    if duration_secs == 0 {
        return Err(Error::Generation("Duration must be positive".to_string()));
    }

    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| Error::Generation(format!("WAV encoding failed: {}", e)))?;

        let total_frames = SAMPLE_RATE as u64 * duration_secs as u64;
        for frame in 0..total_frames {
            let t = frame as f32 / SAMPLE_RATE as f32;

            // Slow tremolo so the tone does not sit at constant level
            let envelope = 0.75 + 0.25 * (2.0 * PI * 0.25 * t).sin();

            let mut sample = 0.0f32;
            for (ratio, amplitude) in PARTIALS {
                sample += amplitude * (2.0 * PI * fundamental_hz * ratio * t).sin();
            }
            sample *= 0.25 * envelope;

            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            for _ in 0..2 {
                writer
                    .write_sample(value)
                    .map_err(|e| Error::Generation(format!("WAV encoding failed: {}", e)))?;
            }
        }

        writer
            .finalize()
            .map_err(|e| Error::Generation(format!("WAV encoding failed: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

/// Fundamental frequency for a musical key ("C".."B", optional "m" suffix)
pub fn key_frequency(musical_key: &str) -> f32 {
    // Fourth-octave fundamentals; minor keys reuse the tonic
    match musical_key.trim_end_matches('m') {
        "C" => 261.63,
        "D" => 293.66,
        "E" => 329.63,
        "F" => 349.23,
        "G" => 392.00,
        "A" => 440.00,
        "B" => 493.88,
        _ => 440.00,
    }
}
