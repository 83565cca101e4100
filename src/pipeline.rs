//! Decode → mix → encode
//!
//! Both inputs are decoded concurrently and joined before the synchronous mix
//! step starts. Any failure aborts the whole render; nothing is written unless
//! every stage succeeded.

use crate::buffer::{PcmBuffer, TrackInput, WavBytes};
use crate::decode::{decode_file, DecodeError};
use crate::mixer::{self, MixerError};
use crate::wav::{self, WavError};
use snafu::{ResultExt, Snafu};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// File name used when no output path is given
pub const DEFAULT_OUTPUT: &str = "mixed_audio.wav";

/// Which input a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Vocals,
    Beat,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Vocals => f.write_str("vocals"),
            Track::Beat => f.write_str("beat"),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum PipelineError {
    #[snafu(display("Please upload both vocals and beat files first."))]
    MissingTracks,

    #[snafu(display("could not decode {track} file: {source}"))]
    Decode { track: Track, source: DecodeError },

    #[snafu(display("{source}"))]
    Mix { source: MixerError },

    #[snafu(display("{source}"))]
    Encode { source: WavError },

    #[snafu(display("failed to save '{}': {source}", path.display()))]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Configuration for one mix-and-save run
#[derive(Debug, Clone)]
pub struct MixConfig {
    /// Linear gain applied to the vocals track
    pub vocals_gain: f32,
    /// Linear gain applied to the beat track
    pub beat_gain: f32,
    /// Fixed output length in frames; the longer input when `None`
    pub frame_count: Option<usize>,
    /// Where [`render_to_file`] saves the result
    pub output_path: PathBuf,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            vocals_gain: 1.0,
            beat_gain: 1.0,
            frame_count: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

/// Mix two decoded buffers and encode the result as 16-bit WAV
pub fn mix_and_encode(
    vocals: PcmBuffer,
    beat: PcmBuffer,
    config: &MixConfig,
) -> Result<WavBytes, PipelineError> {
    let tracks = [
        TrackInput::new(vocals).with_gain(config.vocals_gain),
        TrackInput::new(beat).with_gain(config.beat_gain),
    ];

    let mixed = mixer::mix(&tracks, config.frame_count).context(MixSnafu)?;
    wav::encode(&mixed).context(EncodeSnafu)
}

/// Decode both files, then mix and encode them
///
/// Either path may be `None` when the user has not picked that file yet.
#[instrument(level = "info", skip_all)]
pub async fn mix_files(
    vocals: Option<&Path>,
    beat: Option<&Path>,
    config: &MixConfig,
) -> Result<WavBytes, PipelineError> {
    let (Some(vocals_path), Some(beat_path)) = (vocals, beat) else {
        return MissingTracksSnafu.fail();
    };

    let (vocals, beat) = tokio::try_join!(
        async {
            decode_file(vocals_path)
                .await
                .context(DecodeSnafu { track: Track::Vocals })
        },
        async {
            decode_file(beat_path)
                .await
                .context(DecodeSnafu { track: Track::Beat })
        }
    )?;

    info!(
        vocals_frames = vocals.frame_count(),
        beat_frames = beat.frame_count(),
        sample_rate = vocals.sample_rate(),
        "inputs decoded"
    );

    mix_and_encode(vocals, beat, config)
}

/// Mix two files and save the WAV at `config.output_path`
///
/// The bytes go to a `.part` file next to the output first and are renamed
/// into place, so a failed write never leaves a truncated WAV behind.
pub async fn render_to_file(
    vocals: Option<&Path>,
    beat: Option<&Path>,
    config: &MixConfig,
) -> Result<PathBuf, PipelineError> {
    let wav_bytes = mix_files(vocals, beat, config).await?;
    let path = config.output_path.clone();
    let partial = partial_path(&path);

    let saved = match tokio::fs::write(&partial, wav_bytes.as_bytes()).await {
        Ok(()) => tokio::fs::rename(&partial, &path).await,
        Err(e) => Err(e),
    };
    if let Err(source) = saved {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(source).context(WriteOutputSnafu { path: &path });
    }

    info!(path = %path.display(), bytes = wav_bytes.len(), "mix saved");
    Ok(path)
}

/// Sibling of `path` that holds the bytes until they are complete
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| DEFAULT_OUTPUT.into(), |n| n.to_os_string());
    let mut partial = std::ffi::OsString::from(".");
    partial.push(name);
    partial.push(".part");
    path.with_file_name(partial)
}
