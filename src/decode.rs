//! WAV decoding into planar PCM
//!
//! Stands in for the platform audio decoder: turns raw file bytes into a
//! [`PcmBuffer`]. Integer samples are normalised with the inverse of
//! [`crate::wav::sample_to_i16`] (positive values over `2^(b-1) - 1`, negative
//! over `2^(b-1)`), so files written by the encoder come back within half a
//! quantisation step.

use crate::buffer::{BufferError, PcmBuffer};
use hound::{SampleFormat, WavReader};
use snafu::{ResultExt, Snafu};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

#[derive(Debug, Snafu)]
pub enum DecodeError {
    #[snafu(display("failed to read '{}': {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Not a parseable WAV stream
    #[snafu(display("unable to decode audio data: {source}"))]
    Format { source: hound::Error },

    #[snafu(display("decoded audio is malformed: {source}"))]
    Buffer { source: BufferError },

    #[snafu(display("decode task failed: {source}"))]
    Join { source: tokio::task::JoinError },
}

/// Decode a complete WAV file held in memory
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<PcmBuffer, DecodeError> {
    let reader = WavReader::new(Cursor::new(bytes)).context(FormatSnafu)?;
    let spec = reader.spec();

    // WavReader::new has already rejected bit depths it cannot read
    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            let positive_scale = ((1i64 << (bits - 1)) - 1) as f64;
            let negative_scale = (1i64 << (bits - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        let scale = if v >= 0 { positive_scale } else { negative_scale };
                        (v as f64 / scale) as f32
                    })
                })
                .collect::<Result<_, _>>()
                .context(FormatSnafu)?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .context(FormatSnafu)?,
    };

    let buffer = PcmBuffer::from_interleaved(spec.sample_rate, spec.channels as usize, &samples)
        .context(BufferSnafu)?;

    debug!(
        sample_rate = buffer.sample_rate(),
        channels = buffer.channel_count(),
        frames = buffer.frame_count(),
        bits = spec.bits_per_sample,
        "decoded wav"
    );

    Ok(buffer)
}

/// Read and decode a WAV file without blocking the async runtime
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn decode_file(path: &Path) -> Result<PcmBuffer, DecodeError> {
    let bytes = tokio::fs::read(path).await.context(ReadSnafu { path })?;

    tokio::task::spawn_blocking(move || decode_wav_bytes(&bytes))
        .await
        .context(JoinSnafu)?
}
