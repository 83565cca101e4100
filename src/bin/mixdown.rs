//! Mix a vocals track and a beat into one stereo 16-bit WAV
//!
//! Usage:
//!   mixdown [OPTIONS] <VOCALS> <BEAT>
//!
//! Examples:
//!   # Unity gain, writes mixed_audio.wav
//!   mixdown vocals.wav beat.wav
//!
//!   # Pull the beat down and choose the output name
//!   mixdown --beat-gain 0.6 -o take3.wav vocals.wav beat.wav

use clap::Parser;
use mixdown::pipeline::{self, MixConfig, DEFAULT_OUTPUT};
use mixdown::tracing_init::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "mixdown", version, about = "Mix vocals and a beat into a stereo WAV file")]
struct Args {
    /// Vocals track (WAV)
    vocals: PathBuf,

    /// Beat track (WAV)
    beat: PathBuf,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Linear gain for the vocals track
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    vocals_gain: f32,

    /// Linear gain for the beat track
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    beat_gain: f32,

    /// Output length in frames (default: the longer input)
    #[arg(long)]
    frames: Option<usize>,
}

impl From<&Args> for MixConfig {
    fn from(args: &Args) -> Self {
        MixConfig {
            vocals_gain: args.vocals_gain,
            beat_gain: args.beat_gain,
            frame_count: args.frames,
            output_path: args.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let config = MixConfig::from(&args);

    println!(
        "Mixing {} + {} → {}",
        args.vocals.display(),
        args.beat.display(),
        config.output_path.display()
    );

    let rendered =
        pipeline::render_to_file(Some(args.vocals.as_path()), Some(args.beat.as_path()), &config)
            .await;
    match rendered {
        Ok(path) => {
            println!("Done! Saved {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error mixing files: {e}");
            ExitCode::FAILURE
        }
    }
}
