//! Two-track audio mixdown: decode, sum with per-track gain, export 16-bit WAV.

pub mod buffer;
pub mod decode;
pub mod mixer;
pub mod pipeline;
pub mod tracing_init;
pub mod wav;

pub use buffer::{BufferError, MixedBuffer, PcmBuffer, TrackInput, WavBytes};
pub use decode::{decode_file, decode_wav_bytes, DecodeError};
pub use mixer::{mix, MixerError};
pub use pipeline::{mix_and_encode, mix_files, render_to_file, MixConfig, PipelineError};
pub use wav::{encode, WavError};
