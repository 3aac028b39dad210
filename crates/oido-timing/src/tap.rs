//! Tap series capture and tempo statistics.
//!
//! The engine keeps one series of tap timestamps. A tap arriving more than
//! the reset gap after the previous one starts a fresh series - the old
//! data is discarded, never averaged in. The retained window is bounded;
//! statistics are recomputed over it on every tap.

use oido_core::{interval_mean, interval_stddev};
use std::collections::VecDeque;

/// Tuning constants of the tap engine.
///
/// These are product-tuning values with no derivation from first
/// principles; they are kept as data so deployments can adjust them
/// without touching the measurement code.
#[derive(Debug, Clone)]
pub struct TapConfig {
    /// A gap larger than this starts a new series, in milliseconds.
    pub reset_gap_ms: f64,
    /// Maximum retained tap events.
    pub window: usize,
    /// Jitter below this is labeled metronomic, in milliseconds.
    pub jitter_metronomic_ms: f64,
    /// Jitter below this (and above metronomic) is labeled solid.
    pub jitter_solid_ms: f64,
    /// Accuracy penalty in points per BPM of error from the target.
    pub accuracy_penalty_per_bpm: f64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            reset_gap_ms: 2500.0,
            window: 30,
            jitter_metronomic_ms: 10.0,
            jitter_solid_ms: 30.0,
            accuracy_penalty_per_bpm: 2.0,
        }
    }
}

/// Qualitative tempo-stability label derived from jitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stability {
    /// Jitter below the metronomic threshold.
    Metronomic,
    /// Jitter below the solid threshold.
    Solid,
    /// Everything looser.
    Drifting,
}

impl Stability {
    fn from_jitter(jitter_ms: f64, config: &TapConfig) -> Self {
        if jitter_ms < config.jitter_metronomic_ms {
            Stability::Metronomic
        } else if jitter_ms < config.jitter_solid_ms {
            Stability::Solid
        } else {
            Stability::Drifting
        }
    }
}

/// One captured tap event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: f64,
    /// Interval since the previous tap in the same series. `None` for the
    /// first tap of a series.
    pub interval_ms: Option<f64>,
}

/// Immutable statistics snapshot over the retained tap window.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    /// Number of taps in the current series window.
    pub tap_count: usize,
    /// Timestamp of the newest tap, if any.
    pub last_timestamp_ms: Option<f64>,
    /// Mean inter-tap interval. Needs at least two taps.
    pub mean_interval_ms: Option<f64>,
    /// Tempo derived from the mean interval, rounded to whole BPM.
    pub bpm: Option<u32>,
    /// Sample standard deviation of the intervals. Needs at least three
    /// taps (two intervals).
    pub jitter_ms: Option<f64>,
    /// Stability label for the jitter, when jitter is defined.
    pub stability: Option<Stability>,
    /// 0-100 accuracy against the target tempo, when one is set and a
    /// tempo is defined.
    pub accuracy: Option<f64>,
}

impl SeriesSnapshot {
    fn empty() -> Self {
        Self {
            tap_count: 0,
            last_timestamp_ms: None,
            mean_interval_ms: None,
            bpm: None,
            jitter_ms: None,
            stability: None,
            accuracy: None,
        }
    }
}

/// Observer invoked with every new snapshot.
pub type TapListener = Box<dyn FnMut(&SeriesSnapshot) + Send>;

/// Captures taps and derives tempo/jitter/accuracy statistics.
///
/// # Example
///
/// ```rust
/// use oido_timing::ResponseTimingEngine;
///
/// let mut engine = ResponseTimingEngine::new();
/// engine.record_tap(0.0);
/// engine.record_tap(500.0);
/// let snapshot = engine.record_tap(1000.0);
///
/// assert_eq!(snapshot.bpm, Some(120));
/// ```
pub struct ResponseTimingEngine {
    config: TapConfig,
    taps: VecDeque<Tap>,
    target_bpm: Option<f64>,
    listeners: Vec<TapListener>,
}

impl ResponseTimingEngine {
    /// Create an engine with default tuning.
    pub fn new() -> Self {
        Self::with_config(TapConfig::default())
    }

    /// Create an engine with explicit tuning.
    pub fn with_config(config: TapConfig) -> Self {
        Self {
            config,
            taps: VecDeque::new(),
            target_bpm: None,
            listeners: Vec::new(),
        }
    }

    /// The active tuning.
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// Set or clear the target tempo for accuracy scoring.
    pub fn set_target_tempo(&mut self, bpm: Option<f64>) {
        self.target_bpm = bpm;
    }

    /// Register an observer for new snapshots.
    ///
    /// Observers are registered on this engine specifically; there is no
    /// global event bus to subscribe through.
    pub fn subscribe(&mut self, listener: TapListener) {
        self.listeners.push(listener);
    }

    /// Record a tap at `now_ms` and return the updated snapshot.
    ///
    /// A gap beyond the reset threshold discards the previous series
    /// entirely: the new series starts with this single tap, and tempo is
    /// undefined again until it has two.
    pub fn record_tap(&mut self, now_ms: f64) -> SeriesSnapshot {
        let interval = match self.taps.back() {
            Some(last) => {
                let gap = now_ms - last.timestamp_ms;
                if gap > self.config.reset_gap_ms {
                    tracing::debug!(gap_ms = gap, "tap gap exceeded reset threshold");
                    self.taps.clear();
                    None
                } else {
                    Some(gap)
                }
            }
            None => None,
        };

        self.taps.push_back(Tap {
            timestamp_ms: now_ms,
            interval_ms: interval,
        });
        while self.taps.len() > self.config.window {
            self.taps.pop_front();
        }

        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
        snapshot
    }

    /// Discard the current series.
    pub fn reset(&mut self) {
        self.taps.clear();
    }

    /// The retained tap window, oldest first.
    pub fn taps(&self) -> impl Iterator<Item = &Tap> {
        self.taps.iter()
    }

    /// Compute the statistics snapshot over the retained window.
    pub fn snapshot(&self) -> SeriesSnapshot {
        if self.taps.is_empty() {
            return SeriesSnapshot::empty();
        }

        let intervals: Vec<f64> = self.taps.iter().filter_map(|t| t.interval_ms).collect();
        let mean = interval_mean(&intervals);
        let jitter = interval_stddev(&intervals);

        let bpm = mean.map(|m| (60_000.0 / m).round() as u32);
        let stability = jitter.map(|j| Stability::from_jitter(j, &self.config));
        let accuracy = match (bpm, self.target_bpm) {
            (Some(bpm), Some(target)) => {
                let error = (f64::from(bpm) - target).abs();
                Some((100.0 - self.config.accuracy_penalty_per_bpm * error).clamp(0.0, 100.0))
            }
            _ => None,
        };

        SeriesSnapshot {
            tap_count: self.taps.len(),
            last_timestamp_ms: self.taps.back().map(|t| t.timestamp_ms),
            mean_interval_ms: mean,
            bpm,
            jitter_ms: jitter,
            stability,
            accuracy,
        }
    }
}

impl Default for ResponseTimingEngine {
    fn default() -> Self {
        Self::new()
    }
}
