//! Offline stimulus rendering to WAV files.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use oido_engine::{Engine, Placement, SessionSpec, SweepCurve};
use oido_synth::{NoiseColor, Waveform};
use std::path::PathBuf;

/// Waveform names for the CLI.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliWaveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl From<CliWaveform> for Waveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => Waveform::Sine,
            CliWaveform::Square => Waveform::Square,
            CliWaveform::Sawtooth => Waveform::Sawtooth,
            CliWaveform::Triangle => Waveform::Triangle,
        }
    }
}

/// Noise color names for the CLI.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliNoiseColor {
    #[default]
    White,
    Pink,
    Brown,
}

impl From<CliNoiseColor> for NoiseColor {
    fn from(c: CliNoiseColor) -> Self {
        match c {
            CliNoiseColor::White => NoiseColor::White,
            CliNoiseColor::Pink => NoiseColor::Pink,
            CliNoiseColor::Brown => NoiseColor::Brown,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    #[command(subcommand)]
    command: RenderCommand,

    /// Tuning file (defaults to the standard location)
    #[arg(long, global = true)]
    tuning: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long, global = true, default_value = "48000")]
    sample_rate: u32,

    /// Output gain (0-1)
    #[arg(long, global = true, default_value = "0.8")]
    gain: f32,
}

#[derive(Subcommand)]
enum RenderCommand {
    /// A steady tone
    Tone {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Frequency in Hz
        #[arg(long, default_value = "440.0")]
        freq: f32,

        /// Waveform
        #[arg(long, value_enum, default_value_t = CliWaveform::Sine)]
        waveform: CliWaveform,

        /// Duration in seconds
        #[arg(long, default_value = "2.0")]
        duration: f32,

        /// Stereo pan, -1 (left) to 1 (right)
        #[arg(long, default_value = "0.0")]
        pan: f32,
    },

    /// Looped colored noise
    Noise {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Noise color
        #[arg(long, value_enum, default_value_t = CliNoiseColor::Pink)]
        color: CliNoiseColor,

        /// Duration in seconds
        #[arg(long, default_value = "5.0")]
        duration: f32,
    },

    /// A binaural beat pair
    Binaural {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Left-ear frequency in Hz
        #[arg(long, default_value = "200.0")]
        left: f32,

        /// Right-ear frequency in Hz
        #[arg(long, default_value = "210.0")]
        right: f32,

        /// Duration in seconds
        #[arg(long, default_value = "10.0")]
        duration: f32,
    },

    /// An exponential frequency sweep
    Sweep {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Start frequency in Hz
        #[arg(long, default_value = "22000.0")]
        start: f32,

        /// End frequency in Hz
        #[arg(long, default_value = "8000.0")]
        end: f32,

        /// Duration in seconds
        #[arg(long, default_value = "15.0")]
        duration: f32,

        /// Use a linear curve instead of exponential
        #[arg(long)]
        linear: bool,
    },
}

pub fn run(args: RenderArgs) -> Result<()> {
    let tuning = super::load_tuning(args.tuning.as_ref())?;
    let mut engine = super::ready_engine(args.sample_rate as f32, &tuning)?;

    let (output, duration_s) = match &args.command {
        RenderCommand::Tone {
            output,
            freq,
            waveform,
            duration,
            pan,
        } => {
            let spec = SessionSpec::tone(*freq)
                .with_waveform((*waveform).into())
                .with_gain(args.gain)
                .with_placement(Placement::Pan(pan.clamp(-1.0, 1.0)));
            engine.start_session(spec)?;
            (output.clone(), *duration)
        }
        RenderCommand::Noise {
            output,
            color,
            duration,
        } => {
            let spec = SessionSpec::noise((*color).into()).with_gain(args.gain);
            engine.start_session(spec)?;
            (output.clone(), *duration)
        }
        RenderCommand::Binaural {
            output,
            left,
            right,
            duration,
        } => {
            let spec = SessionSpec::binaural(*left, *right).with_gain(args.gain);
            engine.start_session(spec)?;
            (output.clone(), *duration)
        }
        RenderCommand::Sweep {
            output,
            start,
            end,
            duration,
            linear,
        } => {
            let spec = SessionSpec::tone(*start).with_gain(args.gain);
            let id = engine.start_session(spec)?;
            let curve = if *linear {
                SweepCurve::Linear
            } else {
                SweepCurve::Exponential
            };
            engine.start_sweep(id, *start, *end, f64::from(*duration) * 1000.0, curve, 0.0)?;
            (output.clone(), *duration)
        }
    };

    let frames = (duration_s * args.sample_rate as f32) as usize;
    let mut buffer = vec![0.0f32; frames * 2];
    engine.render(&mut buffer);

    write_stereo_wav(&output, &buffer, args.sample_rate)?;
    println!("wrote {} ({:.1}s)", output.display(), duration_s);
    Ok(())
}

/// Write interleaved stereo f32 samples as a 16-bit WAV file.
fn write_stereo_wav(path: &PathBuf, interleaved: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in interleaved {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;
    Ok(())
}
