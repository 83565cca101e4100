//! WAV File Generation
//!
//! Serializes a floating-point [`PcmBuffer`] into a canonical RIFF/WAVE file.
//!
//! **WAV Format**:
//! - 44-byte header, no extra chunks
//! - 16-bit PCM (signed little-endian integer samples)
//! - Any channel count, interleaved frame by frame
//!
//! Samples outside [-1.0, 1.0] are saturated, never wrapped.

use crate::buffer::{PcmBuffer, WavBytes};
use snafu::{ensure, ResultExt, Snafu};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Size of the RIFF + fmt + data chunk headers
pub const HEADER_LEN: usize = 44;

const BYTES_PER_SAMPLE: usize = 2;

#[derive(Debug, Snafu)]
pub enum WavError {
    /// Buffer cannot be represented as 16-bit PCM WAV
    #[snafu(display("invalid buffer: {reason}"))]
    InvalidBuffer { reason: String },

    #[snafu(display("failed to write '{}': {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// WAV file header structure (44 bytes for 16-bit PCM)
struct WavHeader {
    sample_rate: u32,
    num_channels: u16,
    block_align: u16,
    byte_rate: u32,
    data_size: u32,
}

impl WavHeader {
    fn for_buffer(buffer: &PcmBuffer) -> Result<Self, WavError> {
        ensure!(
            buffer.channel_count() >= 1,
            InvalidBufferSnafu {
                reason: "channel_count must be at least 1",
            }
        );
        ensure!(
            buffer.sample_rate() > 0,
            InvalidBufferSnafu {
                reason: "sample_rate must be positive",
            }
        );

        let channel_count = buffer.channel_count();
        let too_many_channels = || {
            InvalidBufferSnafu {
                reason: format!("{channel_count} channels exceed the WAV limit"),
            }
            .build()
        };
        // BlockAlign is a 16-bit field
        let block_align = channel_count
            .checked_mul(BYTES_PER_SAMPLE)
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(too_many_channels)?;
        let num_channels = block_align / BYTES_PER_SAMPLE as u16;
        let byte_rate = buffer
            .sample_rate()
            .checked_mul(block_align as u32)
            .ok_or_else(|| {
                InvalidBufferSnafu {
                    reason: format!("sample_rate {} is too high", buffer.sample_rate()),
                }
                .build()
            })?;

        // ChunkSize covers everything after byte 8 and must fit in 32 bits
        let data_size = buffer
            .frame_count()
            .checked_mul(block_align as usize)
            .filter(|&len| len <= (u32::MAX - (HEADER_LEN as u32 - 8)) as usize);
        let Some(data_size) = data_size else {
            return InvalidBufferSnafu {
                reason: format!("{} frames do not fit a WAV file", buffer.frame_count()),
            }
            .fail();
        };

        Ok(Self {
            sample_rate: buffer.sample_rate(),
            num_channels,
            block_align,
            byte_rate,
            data_size: data_size as u32,
        })
    }

    /// Generate the 44-byte WAV header
    fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        let chunk_size = self.data_size + (HEADER_LEN as u32 - 8); // total length - 8

        // RIFF chunk descriptor
        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");

        // fmt sub-chunk
        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&16u32.to_le_bytes()); // Subchunk1Size (16 for PCM)
        header[20..22].copy_from_slice(&1u16.to_le_bytes()); // AudioFormat (1 = PCM)
        header[22..24].copy_from_slice(&self.num_channels.to_le_bytes());
        header[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        header[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        header[34..36].copy_from_slice(&16u16.to_le_bytes()); // BitsPerSample

        // data sub-chunk
        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&self.data_size.to_le_bytes());

        header
    }
}

/// Convert a floating-point sample to 16-bit PCM
///
/// Clamps to [-1.0, 1.0], then scales positive values by 32767 and negative
/// values by 32768 so both ends of the i16 range are reachable. NaN maps to 0.
pub fn sample_to_i16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    // f32 products near .5 can round up before round() sees them
    let clamped = f64::from(sample).clamp(-1.0, 1.0);
    let scaled = if clamped >= 0.0 {
        clamped * 32767.0
    } else {
        clamped * 32768.0
    };

    scaled.round() as i16
}

/// Encode a PCM buffer as a 16-bit WAV file
///
/// The header follows the canonical 44-byte layout; sample data is written
/// frame by frame, channel 0 first.
///
/// # Example
/// ```
/// use mixdown::{wav, PcmBuffer};
///
/// let buffer = PcmBuffer::silent(44100, 2, 4);
/// let wav_bytes = wav::encode(&buffer)?;
/// assert_eq!(wav_bytes.len(), 44 + 4 * 2 * 2);
/// # Ok::<(), wav::WavError>(())
/// ```
#[instrument(level = "debug", skip(buffer), fields(
    channels = buffer.channel_count(),
    frames = buffer.frame_count(),
    sample_rate = buffer.sample_rate()
))]
pub fn encode(buffer: &PcmBuffer) -> Result<WavBytes, WavError> {
    let header = WavHeader::for_buffer(buffer)?;
    let total_len = HEADER_LEN + header.data_size as usize;

    let mut wav_data = Vec::with_capacity(total_len);
    wav_data.extend_from_slice(&header.to_bytes());

    let channels = buffer.channels();
    for i in 0..buffer.frame_count() {
        for channel in channels {
            wav_data.extend_from_slice(&sample_to_i16(channel[i]).to_le_bytes());
        }
    }

    debug!(bytes = wav_data.len(), "wav encoded");
    Ok(WavBytes::from_vec(wav_data))
}

/// Encode `buffer` and write it to `path`
///
/// # Example
/// ```no_run
/// use mixdown::{wav, PcmBuffer};
///
/// let buffer = PcmBuffer::silent(44100, 2, 44100);
/// wav::write_wav_file("output.wav", &buffer)?;
/// # Ok::<(), wav::WavError>(())
/// ```
pub fn write_wav_file(path: impl AsRef<Path>, buffer: &PcmBuffer) -> Result<(), WavError> {
    let path = path.as_ref();
    let wav_bytes = encode(buffer)?;

    std::fs::write(path, wav_bytes.as_bytes()).context(IoSnafu { path })?;

    Ok(())
}
