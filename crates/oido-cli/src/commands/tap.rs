//! Terminal tap-tempo measurement.

use anyhow::Result;
use clap::Args;
use oido_core::{Clock, ScoreBand, SystemClock};
use oido_timing::{ResponseTimingEngine, Stability};
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Args)]
pub struct TapArgs {
    /// Target tempo in BPM for accuracy scoring
    #[arg(long)]
    target: Option<f64>,

    /// Tuning file (defaults to the standard location)
    #[arg(long)]
    tuning: Option<PathBuf>,
}

pub fn run(args: TapArgs) -> Result<()> {
    let tuning = super::load_tuning(args.tuning.as_ref())?;
    let mut engine = ResponseTimingEngine::with_config(tuning.tap_config());
    engine.set_target_tempo(args.target);

    println!("press Enter to tap (Ctrl-D to finish)");
    let clock = SystemClock::new();
    let stdin = std::io::stdin();

    for line in stdin.lock().lines() {
        line?;
        let snapshot = engine.record_tap(clock.now_ms());

        match (snapshot.bpm, snapshot.jitter_ms) {
            (Some(bpm), Some(jitter)) => {
                let label = match snapshot.stability {
                    Some(Stability::Metronomic) => "metronomic",
                    Some(Stability::Solid) => "solid",
                    _ => "drifting",
                };
                match snapshot.accuracy {
                    Some(accuracy) => println!(
                        "{bpm:>4} bpm  jitter {jitter:>5.1} ms  {label}  accuracy {accuracy:>5.1}"
                    ),
                    None => println!("{bpm:>4} bpm  jitter {jitter:>5.1} ms  {label}"),
                }
            }
            (Some(bpm), None) => println!("{bpm:>4} bpm"),
            _ => println!("   - bpm (keep tapping)"),
        }
    }

    // Final summary: raw tempo plus its 0-100 band when a target was set.
    let snapshot = engine.snapshot();
    if let (Some(bpm), Some(target)) = (snapshot.bpm, args.target) {
        let band = ScoreBand::new(target - 50.0, target);
        println!(
            "final: {bpm} bpm (target {target}), score {:.0}/100",
            band.normalize(f64::from(bpm))
        );
    }
    Ok(())
}
