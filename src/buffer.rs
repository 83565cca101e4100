//! PCM buffer types shared by the decoder, mixer and WAV encoder
//!
//! Samples are planar `f32` (one `Vec` per channel), nominally in [-1.0, 1.0].
//! Every channel of a buffer holds the same number of frames.

use snafu::{ensure, Snafu};

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum BufferError {
    /// Channel arrays differ in length
    #[snafu(display("channel {channel} has {len} frames, expected {expected}"))]
    RaggedChannels {
        channel: usize,
        len: usize,
        expected: usize,
    },

    #[snafu(display("channel_count must be at least 1"))]
    NoChannels,
}

/// Planar floating-point PCM audio
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

/// Output of [`crate::mixer::mix`]: always two channels.
pub type MixedBuffer = PcmBuffer;

impl PcmBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// An empty channel list is accepted; the mixer and encoder reject it with
    /// their own errors.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, BufferError> {
        if let Some(first) = channels.first() {
            let expected = first.len();
            for (channel, data) in channels.iter().enumerate() {
                ensure!(
                    data.len() == expected,
                    RaggedChannelsSnafu {
                        channel,
                        len: data.len(),
                        expected,
                    }
                );
            }
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Caller guarantees every channel has the same length.
    pub(crate) fn from_equal_channels(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        debug_assert!(channels.windows(2).all(|w| w[0].len() == w[1].len()));
        Self {
            sample_rate,
            channels,
        }
    }

    /// A buffer of `frame_count` zero samples on each channel
    pub fn silent(sample_rate: u32, channel_count: usize, frame_count: usize) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; frame_count]; channel_count],
        }
    }

    /// De-interleave `samples` into `channel_count` channels.
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(
        sample_rate: u32,
        channel_count: usize,
        samples: &[f32],
    ) -> Result<Self, BufferError> {
        ensure!(channel_count > 0, NoChannelsSnafu);

        let frame_count = samples.len() / channel_count;
        let mut channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|_| Vec::with_capacity(frame_count))
            .collect();
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Playback length in seconds, 0.0 for a zero sample rate
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// A decoded track and the gain applied to it before summing
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInput {
    pub buffer: PcmBuffer,
    pub gain: f32,
}

impl TrackInput {
    /// Track at unity gain
    pub fn new(buffer: PcmBuffer) -> Self {
        Self { buffer, gain: 1.0 }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.buffer.frame_count()
    }
}

/// A finished RIFF/WAVE file.
///
/// The bytes cannot be modified once encoded; [`WavBytes::into_vec`] hands
/// them over to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavBytes(Vec<u8>);

impl WavBytes {
    pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for WavBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
