//! Two-track offline mixer
//!
//! Sums two decoded tracks into a stereo buffer as long as the longer input.
//! Each output channel `c` reads input channel `min(c, channel_count - 1)`, so a
//! mono track feeds both sides and extra input channels are ignored. Frames
//! past the end of a track contribute silence.
//!
//! No clipping is applied here: sums may leave [-1.0, 1.0] and are saturated
//! by the WAV encoder.

use crate::buffer::{MixedBuffer, PcmBuffer, TrackInput};
use snafu::{ensure, Snafu};
use tracing::{debug, instrument, warn};

/// Channel count of every mixed buffer
pub const OUTPUT_CHANNELS: usize = 2;

/// Number of tracks a mix takes (vocals, beat)
pub const TRACK_COUNT: usize = 2;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum MixerError {
    /// Missing or malformed track
    #[snafu(display("invalid mixer input: {reason}"))]
    InvalidInput { reason: String },
}

/// Mix exactly two tracks into a stereo buffer.
///
/// `frame_count` fixes the output length; when `None` it is the longer of the
/// two tracks. The sample rate is taken from the first track.
#[instrument(level = "debug", skip(tracks), fields(track_count = tracks.len()))]
pub fn mix(tracks: &[TrackInput], frame_count: Option<usize>) -> Result<MixedBuffer, MixerError> {
    ensure!(
        tracks.len() == TRACK_COUNT,
        InvalidInputSnafu {
            reason: format!("expected {TRACK_COUNT} tracks, got {}", tracks.len()),
        }
    );
    for (index, track) in tracks.iter().enumerate() {
        validate_track(index, track)?;
    }

    let sample_rate = tracks[0].buffer.sample_rate();
    for track in &tracks[1..] {
        if track.buffer.sample_rate() != sample_rate {
            // Not resampled; the second track plays at the wrong speed.
            warn!(
                expected = sample_rate,
                actual = track.buffer.sample_rate(),
                "track sample rates differ"
            );
        }
    }

    let frame_count = match frame_count {
        Some(0) => {
            return InvalidInputSnafu {
                reason: "requested frame_count is 0",
            }
            .fail()
        }
        Some(n) => n,
        None => tracks.iter().map(TrackInput::frame_count).max().unwrap_or(0),
    };

    let mut output = vec![vec![0.0f32; frame_count]; OUTPUT_CHANNELS];
    for track in tracks {
        for (c, out) in output.iter_mut().enumerate() {
            add_channel(out, track, c);
        }
    }

    debug!(
        frame_count,
        sample_rate,
        peak = %peak(&output),
        "mix complete"
    );

    Ok(PcmBuffer::from_equal_channels(sample_rate, output))
}

fn validate_track(index: usize, track: &TrackInput) -> Result<(), MixerError> {
    let buffer = &track.buffer;
    ensure!(
        buffer.channel_count() > 0,
        InvalidInputSnafu {
            reason: format!("track {index} has no channels"),
        }
    );
    ensure!(
        buffer.frame_count() > 0,
        InvalidInputSnafu {
            reason: format!("track {index} has no frames"),
        }
    );
    ensure!(
        buffer.sample_rate() > 0,
        InvalidInputSnafu {
            reason: format!("track {index} has a sample rate of 0"),
        }
    );
    ensure!(
        track.gain.is_finite(),
        InvalidInputSnafu {
            reason: format!("track {index} gain {} is not finite", track.gain),
        }
    );
    Ok(())
}

/// Accumulate `track` (scaled by its gain) into output channel `c`
fn add_channel(out: &mut [f32], track: &TrackInput, c: usize) {
    let buffer = &track.buffer;
    let source = c.min(buffer.channel_count() - 1);
    let Some(samples) = buffer.channel(source) else {
        return;
    };

    for (o, &s) in out.iter_mut().zip(samples) {
        *o += track.gain * s;
    }
}

fn peak(channels: &[Vec<f32>]) -> f32 {
    channels
        .iter()
        .flatten()
        .fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: &[f32]) -> TrackInput {
        TrackInput::new(PcmBuffer::new(44100, vec![samples.to_vec()]).unwrap())
    }

    fn stereo(left: &[f32], right: &[f32]) -> TrackInput {
        TrackInput::new(PcmBuffer::new(44100, vec![left.to_vec(), right.to_vec()]).unwrap())
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "expected {e}, got {a}");
        }
    }

    #[test]
    fn test_mix_two_mono_equal_length() {
        let mixed = mix(&[mono(&[0.5; 4]), mono(&[0.25; 4])], None).unwrap();

        assert_eq!(mixed.channel_count(), 2);
        assert_eq!(mixed.sample_rate(), 44100);
        assert_eq!(mixed.frame_count(), 4);
        assert_eq!(mixed.channel(0).unwrap(), &[0.75; 4]);
        assert_eq!(mixed.channel(1).unwrap(), &[0.75; 4]);
    }

    #[test]
    fn test_mix_pads_shorter_track_with_silence() {
        let mixed = mix(&[mono(&[1.0; 2]), mono(&[1.0; 4])], None).unwrap();

        assert_eq!(mixed.frame_count(), 4);
        assert_eq!(mixed.channel(0).unwrap(), &[2.0, 2.0, 1.0, 1.0]);
        assert_eq!(mixed.channel(1).unwrap(), &[2.0, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_mix_does_not_clip() {
        let mixed = mix(&[mono(&[0.9, -0.9]), mono(&[0.9, -0.9])], None).unwrap();
        assert_eq!(mixed.channel(0).unwrap(), &[1.8, -1.8]);
    }

    #[test]
    fn test_mix_stereo_keeps_sides_apart() {
        let mixed = mix(
            &[stereo(&[0.1, 0.2], &[-0.1, -0.2]), mono(&[0.5, 0.5])],
            None,
        )
        .unwrap();

        assert_close(mixed.channel(0).unwrap(), &[0.6, 0.7]);
        assert_close(mixed.channel(1).unwrap(), &[0.4, 0.3]);
    }

    #[test]
    fn test_mix_surround_input_uses_first_two_channels() {
        let quad = TrackInput::new(
            PcmBuffer::new(44100, vec![vec![0.1], vec![0.2], vec![0.3], vec![0.4]]).unwrap(),
        );
        let mixed = mix(&[quad, mono(&[0.0])], None).unwrap();

        assert_eq!(mixed.channel(0).unwrap(), &[0.1]);
        assert_eq!(mixed.channel(1).unwrap(), &[0.2]);
    }

    #[test]
    fn test_mix_applies_gain() {
        let mixed = mix(
            &[mono(&[0.5; 3]).with_gain(0.5), mono(&[0.5; 3]).with_gain(-1.0)],
            None,
        )
        .unwrap();

        assert_eq!(mixed.channel(0).unwrap(), &[-0.25; 3]);
    }

    #[test]
    fn test_mix_explicit_frame_count() {
        let longer = mix(&[mono(&[0.5; 2]), mono(&[0.25; 2])], Some(4)).unwrap();
        assert_eq!(longer.channel(0).unwrap(), &[0.75, 0.75, 0.0, 0.0]);

        let shorter = mix(&[mono(&[0.5; 4]), mono(&[0.25; 4])], Some(1)).unwrap();
        assert_eq!(shorter.channel(1).unwrap(), &[0.75]);
    }

    #[test]
    fn test_mix_takes_first_sample_rate() {
        let a = TrackInput::new(PcmBuffer::new(48000, vec![vec![0.0; 2]]).unwrap());
        let b = TrackInput::new(PcmBuffer::new(44100, vec![vec![0.0; 2]]).unwrap());
        assert_eq!(mix(&[a, b], None).unwrap().sample_rate(), 48000);
    }

    #[test]
    fn test_mix_rejects_wrong_track_count() {
        let err = mix(&[mono(&[0.5])], None).unwrap_err();
        assert!(err.to_string().contains("expected 2 tracks, got 1"));

        let err = mix(&[mono(&[0.5]), mono(&[0.5]), mono(&[0.5])], None).unwrap_err();
        assert!(matches!(err, MixerError::InvalidInput { .. }));
    }

    #[test]
    fn test_mix_rejects_empty_tracks() {
        let no_channels = TrackInput::new(PcmBuffer::new(44100, vec![]).unwrap());
        let err = mix(&[mono(&[0.5]), no_channels], None).unwrap_err();
        assert!(err.to_string().contains("track 1 has no channels"));

        let no_frames = TrackInput::new(PcmBuffer::silent(44100, 2, 0));
        let err = mix(&[no_frames, mono(&[0.5])], None).unwrap_err();
        assert!(err.to_string().contains("track 0 has no frames"));
    }

    #[test]
    fn test_mix_rejects_bad_gain_and_zero_length() {
        let err = mix(&[mono(&[0.5]).with_gain(f32::NAN), mono(&[0.5])], None).unwrap_err();
        assert!(matches!(err, MixerError::InvalidInput { .. }));

        let err = mix(&[mono(&[0.5]), mono(&[0.5])], Some(0)).unwrap_err();
        assert!(matches!(err, MixerError::InvalidInput { .. }));
    }
}
