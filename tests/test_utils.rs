//! Shared utilities for integration tests
#![allow(dead_code)]

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;

/// A WAV file parsed by hound, split into channels
pub struct ParsedWav {
    pub spec: WavSpec,
    pub channels: Vec<Vec<i16>>,
}

impl ParsedWav {
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Channel `c` mapped back to [-1.0, 1.0] with the encoder's asymmetric scale
    pub fn channel_f32(&self, c: usize) -> Vec<f32> {
        self.channels[c]
            .iter()
            .map(|&v| {
                if v >= 0 {
                    v as f32 / 32767.0
                } else {
                    v as f32 / 32768.0
                }
            })
            .collect()
    }
}

/// Parse 16-bit WAV bytes with hound, independent of the crate's own decoder
pub fn parse_wav(bytes: &[u8]) -> Result<ParsedWav, String> {
    let reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| format!("Failed to parse WAV: {}", e))?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(format!(
            "Expected 16-bit integer PCM, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        ));
    }

    let samples: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<_, _>>()
        .map_err(|e| format!("Failed to read samples: {}", e))?;

    let channel_count = spec.channels as usize;
    let mut channels = vec![Vec::new(); channel_count];
    for (i, sample) in samples.into_iter().enumerate() {
        channels[i % channel_count].push(sample);
    }

    Ok(ParsedWav { spec, channels })
}

/// Write interleaved 32-bit float samples as a WAV file using hound
pub fn write_float_wav(path: &Path, sample_rate: u32, channels: u16, interleaved: &[f32]) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).expect("create wav");
    for &sample in interleaved {
        writer.write_sample(sample).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Write interleaved 16-bit samples as a WAV file using hound
pub fn write_i16_wav(path: &Path, sample_rate: u32, channels: u16, interleaved: &[i16]) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("create wav");
    for &sample in interleaved {
        writer.write_sample(sample).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}
