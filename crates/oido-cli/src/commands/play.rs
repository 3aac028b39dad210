//! Live playback through the output device.

use anyhow::{Context, Result};
use clap::Args;
use oido_core::{Clock, SystemClock};
use oido_engine::{SessionSpec, SweepCurve};
use oido_io::{BackendStreamConfig, CpalBackend, OutputBackend};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Args)]
pub struct PlayArgs {
    /// Frequency in Hz (start frequency when sweeping)
    #[arg(long, default_value = "440.0")]
    freq: f32,

    /// Sweep to this frequency
    #[arg(long)]
    sweep_to: Option<f32>,

    /// Sweep duration in seconds
    #[arg(long, default_value = "15.0")]
    sweep_duration: f32,

    /// Output gain (0-1)
    #[arg(long, default_value = "0.5")]
    gain: f32,

    /// Output device name (substring match)
    #[arg(long)]
    device: Option<String>,

    /// Tuning file (defaults to the standard location)
    #[arg(long)]
    tuning: Option<PathBuf>,
}

pub fn run(args: PlayArgs) -> Result<()> {
    let tuning = super::load_tuning(args.tuning.as_ref())?;
    let backend = CpalBackend::new();

    let stream_config = BackendStreamConfig {
        device_name: args.device.clone(),
        ..BackendStreamConfig::default()
    };
    let sample_rate = backend.actual_sample_rate(&stream_config);

    let engine = Arc::new(Mutex::new(super::ready_engine(
        sample_rate as f32,
        &tuning,
    )?));

    let render_engine = Arc::clone(&engine);
    let _stream = backend
        .build_output_stream(
            &stream_config,
            Box::new(move |buffer| {
                if let Ok(mut engine) = render_engine.lock() {
                    engine.render(buffer);
                }
            }),
            Box::new(|err| tracing::error!(error = err, "output stream error")),
        )
        .context("failed to open output stream")?;

    let clock = SystemClock::new();
    let id = {
        let mut engine = engine.lock().unwrap_or_else(|e| e.into_inner());
        let spec = SessionSpec::tone(args.freq).with_gain(args.gain);
        let id = engine.start_session(spec)?;
        if let Some(end) = args.sweep_to {
            engine.start_sweep(
                id,
                args.freq,
                end,
                f64::from(args.sweep_duration) * 1000.0,
                SweepCurve::Exponential,
                clock.now_ms(),
            )?;
            engine.on_sweep_tick(
                id,
                Box::new(|value| {
                    print!("\r{value:>8.0} Hz");
                    let _ = std::io::Write::flush(&mut std::io::stdout());
                }),
            );
        }
        id
    };

    let running = Arc::new(AtomicBool::new(true));
    let ctrlc_running = Arc::clone(&running);
    ctrlc::set_handler(move || ctrlc_running.store(false, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;

    println!("playing - press Ctrl-C to stop");
    while running.load(Ordering::SeqCst) {
        // Display-side frame tick: recompute sweep values, fire observers,
        // and stop when the sweep (if any) completes.
        let mut engine = engine.lock().unwrap_or_else(|e| e.into_inner());
        engine.tick(clock.now_ms());
        if engine.current_session().is_none() {
            break;
        }
        drop(engine);
        std::thread::sleep(std::time::Duration::from_millis(16));
    }

    let mut engine = engine.lock().unwrap_or_else(|e| e.into_inner());
    engine.stop_session(id);
    // Let the teardown guard ramp drain through the device before the
    // stream handle drops.
    drop(engine);
    std::thread::sleep(std::time::Duration::from_millis(100));
    println!();
    Ok(())
}
