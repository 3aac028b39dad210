//! Timed trial sequencing: countdown, stimulus, response.
//!
//! Reaction-style tests share one state machine:
//!
//! ```text
//! Idle -> Armed -> Counting(3) -> Counting(2) -> Counting(1)
//!      -> Go -> AwaitingResponse -> Resolved | Aborted
//! ```
//!
//! Countdown steps are deadline-driven: the caller ticks the sequencer
//! from its frame loop with the current monotonic time, and each step that
//! comes due fires a cue through the registered [`CueSink`]. The `Go` cue
//! starts the latency clock; the first qualifying response resolves the
//! trial with the measured latency. Abort is reachable from every state
//! and cancels all pending deadlines - nothing fires after it.

/// Audio/visual cue emitted by the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialCue {
    /// A countdown step: 3, 2, 1.
    Count(u8),
    /// The stimulus cue that starts the latency clock.
    Go,
}

/// Receiver for trial cues.
///
/// Implemented for any `FnMut(TrialCue)` closure.
pub trait CueSink: Send {
    /// Handle one cue.
    fn cue(&mut self, cue: TrialCue);
}

impl<F: FnMut(TrialCue) + Send> CueSink for F {
    fn cue(&mut self, cue: TrialCue) {
        self(cue);
    }
}

/// Tuning of the countdown.
#[derive(Debug, Clone)]
pub struct TrialConfig {
    /// Number of countdown steps before the Go cue.
    pub countdown_steps: u8,
    /// Interval between countdown steps, in milliseconds.
    pub step_ms: f64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            countdown_steps: 3,
            step_ms: 1000.0,
        }
    }
}

/// Phase of a timed trial.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TrialPhase {
    /// Nothing scheduled.
    #[default]
    Idle,
    /// Armed; the countdown starts on the next tick.
    Armed,
    /// Counting down; the payload is the number about to be shown.
    Counting(u8),
    /// The Go cue just fired; the latency clock is running.
    Go,
    /// Waiting for the first qualifying input.
    AwaitingResponse,
    /// Terminal: the trial measured a response latency in milliseconds.
    Resolved {
        /// Response timestamp minus Go timestamp.
        latency_ms: f64,
    },
    /// Terminal: cancelled; all deadlines were discarded.
    Aborted,
}

/// Deadline-driven trial sequencer.
///
/// # Example
///
/// ```rust
/// use oido_timing::{TrialPhase, TrialSequencer};
///
/// let mut trial = TrialSequencer::new();
/// trial.arm(0.0);
///
/// trial.tick(0.0);      // Counting(3)
/// trial.tick(1000.0);   // Counting(2)
/// trial.tick(2000.0);   // Counting(1)
/// trial.tick(3000.0);   // Go - latency clock starts
///
/// let latency = trial.respond(3240.0).unwrap();
/// assert_eq!(latency, 240.0);
/// assert_eq!(trial.phase(), TrialPhase::Resolved { latency_ms: 240.0 });
/// ```
pub struct TrialSequencer {
    config: TrialConfig,
    phase: TrialPhase,
    cue_sink: Option<Box<dyn CueSink>>,
    next_deadline_ms: Option<f64>,
    go_at_ms: Option<f64>,
}

impl TrialSequencer {
    /// Create a sequencer with the default 3-step, 1-second countdown.
    pub fn new() -> Self {
        Self::with_config(TrialConfig::default())
    }

    /// Create a sequencer with explicit tuning.
    pub fn with_config(config: TrialConfig) -> Self {
        Self {
            config,
            phase: TrialPhase::Idle,
            cue_sink: None,
            next_deadline_ms: None,
            go_at_ms: None,
        }
    }

    /// Register the cue receiver.
    pub fn set_cue_sink(&mut self, sink: Box<dyn CueSink>) {
        self.cue_sink = Some(sink);
    }

    /// Current phase.
    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    /// The measured latency, once resolved.
    pub fn latency_ms(&self) -> Option<f64> {
        match self.phase {
            TrialPhase::Resolved { latency_ms } => Some(latency_ms),
            _ => None,
        }
    }

    /// Arm the trial: the countdown begins at the next tick at or after
    /// `now_ms`. Only valid from `Idle`; anything else is ignored.
    pub fn arm(&mut self, now_ms: f64) {
        if self.phase != TrialPhase::Idle {
            return;
        }
        self.phase = TrialPhase::Armed;
        self.next_deadline_ms = Some(now_ms);
    }

    /// Advance the state machine to `now_ms`, firing any cues that came
    /// due. Late ticks fire every missed step in order, so a janky frame
    /// loop skews cue timing but never drops a transition.
    pub fn tick(&mut self, now_ms: f64) {
        while let Some(deadline) = self.next_deadline_ms {
            if now_ms < deadline {
                return;
            }
            match self.phase {
                TrialPhase::Armed => {
                    let first = self.config.countdown_steps;
                    self.phase = TrialPhase::Counting(first);
                    self.emit(TrialCue::Count(first));
                    self.next_deadline_ms = Some(deadline + self.config.step_ms);
                }
                TrialPhase::Counting(n) if n > 1 => {
                    self.phase = TrialPhase::Counting(n - 1);
                    self.emit(TrialCue::Count(n - 1));
                    self.next_deadline_ms = Some(deadline + self.config.step_ms);
                }
                TrialPhase::Counting(_) => {
                    // The latency clock starts at the Go cue itself.
                    self.phase = TrialPhase::Go;
                    self.emit(TrialCue::Go);
                    self.go_at_ms = Some(now_ms);
                    self.next_deadline_ms = None;
                }
                _ => {
                    self.next_deadline_ms = None;
                }
            }
        }

        // Go is momentary: one tick later the trial is formally waiting.
        if self.phase == TrialPhase::Go && self.go_at_ms.is_some_and(|go| now_ms > go) {
            self.phase = TrialPhase::AwaitingResponse;
        }
    }

    /// Record a qualifying input at `now_ms`.
    ///
    /// Resolves the trial and returns the measured latency when the
    /// stimulus has fired; inputs during the countdown are ignored and
    /// return `None`.
    pub fn respond(&mut self, now_ms: f64) -> Option<f64> {
        match self.phase {
            TrialPhase::Go | TrialPhase::AwaitingResponse => {
                let go = self.go_at_ms?;
                let latency_ms = now_ms - go;
                self.phase = TrialPhase::Resolved { latency_ms };
                self.next_deadline_ms = None;
                tracing::info!(latency_ms, "trial resolved");
                Some(latency_ms)
            }
            _ => None,
        }
    }

    /// Abort from any state.
    ///
    /// Cancels every pending deadline; later ticks and responses are
    /// no-ops. Idempotent.
    pub fn abort(&mut self) {
        self.phase = TrialPhase::Aborted;
        self.next_deadline_ms = None;
        self.go_at_ms = None;
    }

    /// Return a terminal trial to `Idle` for the next run.
    pub fn reset(&mut self) {
        if matches!(self.phase, TrialPhase::Resolved { .. } | TrialPhase::Aborted) {
            self.phase = TrialPhase::Idle;
            self.next_deadline_ms = None;
            self.go_at_ms = None;
        }
    }

    fn emit(&mut self, cue: TrialCue) {
        if let Some(sink) = &mut self.cue_sink {
            sink.cue(cue);
        }
    }
}

impl Default for TrialSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn cue_recorder() -> (Arc<Mutex<Vec<TrialCue>>>, Box<dyn CueSink>) {
        let cues = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&cues);
        let boxed: Box<dyn CueSink> = Box::new(move |cue| sink.lock().unwrap().push(cue));
        (cues, boxed)
    }

    #[test]
    fn full_countdown_fires_cues_in_order() {
        let (cues, sink) = cue_recorder();
        let mut trial = TrialSequencer::new();
        trial.set_cue_sink(sink);

        trial.arm(0.0);
        trial.tick(0.0);
        assert_eq!(trial.phase(), TrialPhase::Counting(3));
        trial.tick(1000.0);
        assert_eq!(trial.phase(), TrialPhase::Counting(2));
        trial.tick(2000.0);
        assert_eq!(trial.phase(), TrialPhase::Counting(1));
        trial.tick(3000.0);
        assert_eq!(trial.phase(), TrialPhase::Go);

        assert_eq!(
            *cues.lock().unwrap(),
            vec![
                TrialCue::Count(3),
                TrialCue::Count(2),
                TrialCue::Count(1),
                TrialCue::Go,
            ]
        );
    }

    #[test]
    fn latency_is_response_minus_go() {
        let mut trial = TrialSequencer::new();
        trial.arm(500.0);
        for t in [500.0, 1500.0, 2500.0, 3500.0] {
            trial.tick(t);
        }
        assert_eq!(trial.phase(), TrialPhase::Go);

        let latency = trial.respond(3789.5).unwrap();
        assert!((latency - 289.5).abs() < 1e-9);
        assert_eq!(trial.latency_ms(), Some(latency));
    }

    #[test]
    fn go_becomes_awaiting_on_next_tick() {
        let mut trial = TrialSequencer::new();
        trial.arm(0.0);
        for t in [0.0, 1000.0, 2000.0, 3000.0] {
            trial.tick(t);
        }
        trial.tick(3016.0);
        assert_eq!(trial.phase(), TrialPhase::AwaitingResponse);

        // Still responds fine from AwaitingResponse.
        assert!(trial.respond(3200.0).is_some());
    }

    #[test]
    fn late_ticks_fire_missed_steps_in_order() {
        let (cues, sink) = cue_recorder();
        let mut trial = TrialSequencer::new();
        trial.set_cue_sink(sink);

        trial.arm(0.0);
        // One very late tick: every step fires, ending at Go.
        trial.tick(5000.0);
        assert_eq!(trial.phase(), TrialPhase::Go);
        assert_eq!(cues.lock().unwrap().len(), 4);
    }

    #[test]
    fn early_response_is_ignored() {
        let mut trial = TrialSequencer::new();
        trial.arm(0.0);
        trial.tick(0.0);
        assert_eq!(trial.respond(100.0), None);
        assert_eq!(trial.phase(), TrialPhase::Counting(3));
    }

    #[test]
    fn abort_cancels_pending_deadlines() {
        let (cues, sink) = cue_recorder();
        let mut trial = TrialSequencer::new();
        trial.set_cue_sink(sink);

        trial.arm(0.0);
        trial.tick(0.0);
        trial.abort();
        assert_eq!(trial.phase(), TrialPhase::Aborted);

        // No cue fires after abort, no matter how far time advances.
        trial.tick(10_000.0);
        assert_eq!(cues.lock().unwrap().len(), 1);
        assert_eq!(trial.respond(10_000.0), None);
        assert_eq!(trial.phase(), TrialPhase::Aborted);
    }

    #[test]
    fn abort_is_reachable_from_every_state() {
        for advance_ticks in 0..5 {
            let mut trial = TrialSequencer::new();
            trial.arm(0.0);
            for i in 0..advance_ticks {
                trial.tick(i as f64 * 1000.0);
            }
            trial.abort();
            assert_eq!(trial.phase(), TrialPhase::Aborted);
        }
    }

    #[test]
    fn reset_returns_terminal_trials_to_idle() {
        let mut trial = TrialSequencer::new();
        trial.arm(0.0);
        for t in [0.0, 1000.0, 2000.0, 3000.0] {
            trial.tick(t);
        }
        trial.respond(3100.0);
        trial.reset();
        assert_eq!(trial.phase(), TrialPhase::Idle);

        // And the machine runs again.
        trial.arm(10_000.0);
        trial.tick(10_000.0);
        assert_eq!(trial.phase(), TrialPhase::Counting(3));
    }

    #[test]
    fn configurable_countdown_length() {
        let mut trial = TrialSequencer::with_config(TrialConfig {
            countdown_steps: 5,
            step_ms: 200.0,
        });
        trial.arm(0.0);
        trial.tick(0.0);
        assert_eq!(trial.phase(), TrialPhase::Counting(5));
        trial.tick(1000.0);
        assert_eq!(trial.phase(), TrialPhase::Go);
    }
}
