//! Audio sessions: one active output instance per test module.
//!
//! A session owns its stimulus source, its placement, and a master gain
//! ramp. The render path is a straight line per frame - sweep automation,
//! source sample, placement, gain - with no allocation, locking, or
//! fallible calls, so nothing can panic or block on the audio thread.

use crate::spatial::Placement;
use crate::sweep::SweepState;
use crate::visualizer::ScopeBuffer;
use oido_core::LinearRamp;
use oido_synth::{BinauralPair, NoiseColor, NoisePlayer, Oscillator, Waveform};

/// Opaque identifier of a session owned by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub(crate) u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed but not yet attached to the device.
    #[default]
    Uninitialized,
    /// Waiting for the device to be unlocked by a user gesture.
    Suspended,
    /// Producing audio.
    Running,
    /// Stopped; the teardown gain ramp may still be draining, after which
    /// the device path is released entirely.
    Stopped,
}

/// What a session plays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SourceSpec {
    /// A single oscillator.
    Oscillator {
        /// Waveform shape.
        waveform: Waveform,
        /// Frequency in Hz.
        frequency_hz: f32,
    },
    /// A looped noise buffer.
    Noise {
        /// Spectral color.
        color: NoiseColor,
    },
    /// Two oscillators routed hard-left/hard-right.
    Binaural {
        /// Left-ear frequency in Hz.
        left_hz: f32,
        /// Right-ear frequency in Hz.
        right_hz: f32,
    },
}

impl SourceSpec {
    /// The highest frequency the spec asks the device to reproduce, if
    /// the source is frequency-addressed at all.
    pub fn max_frequency_hz(&self) -> Option<f32> {
        match *self {
            SourceSpec::Oscillator { frequency_hz, .. } => Some(frequency_hz),
            SourceSpec::Noise { .. } => None,
            SourceSpec::Binaural { left_hz, right_hz } => Some(left_hz.max(right_hz)),
        }
    }

    /// Every explicit frequency in the spec, for validation.
    pub(crate) fn frequencies(&self) -> impl Iterator<Item = f32> {
        let pair = match *self {
            SourceSpec::Oscillator { frequency_hz, .. } => [Some(frequency_hz), None],
            SourceSpec::Noise { .. } => [None, None],
            SourceSpec::Binaural { left_hz, right_hz } => [Some(left_hz), Some(right_hz)],
        };
        pair.into_iter().flatten()
    }
}

/// Full description of a session to start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSpec {
    /// The stimulus source.
    pub source: SourceSpec,
    /// Output amplitude in [0, 1].
    pub gain: f32,
    /// Stereo placement. Ignored for binaural sources, which are always
    /// hard-left/hard-right.
    pub placement: Placement,
}

impl SessionSpec {
    /// A sine tone at the given frequency.
    pub fn tone(frequency_hz: f32) -> Self {
        Self {
            source: SourceSpec::Oscillator {
                waveform: Waveform::Sine,
                frequency_hz,
            },
            gain: 1.0,
            placement: Placement::default(),
        }
    }

    /// A noise stimulus of the given color.
    pub fn noise(color: NoiseColor) -> Self {
        Self {
            source: SourceSpec::Noise { color },
            gain: 1.0,
            placement: Placement::default(),
        }
    }

    /// A binaural pair with the given ear frequencies.
    pub fn binaural(left_hz: f32, right_hz: f32) -> Self {
        Self {
            source: SourceSpec::Binaural { left_hz, right_hz },
            gain: 1.0,
            placement: Placement::default(),
        }
    }

    /// Override the waveform of an oscillator spec.
    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        if let SourceSpec::Oscillator { waveform: w, .. } = &mut self.source {
            *w = waveform;
        }
        self
    }

    /// Override the output gain, clamped to [0, 1].
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain.clamp(0.0, 1.0);
        self
    }

    /// Override the placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// The instantiated stimulus source behind a session.
enum Source {
    Oscillator(Oscillator),
    Noise(NoisePlayer),
    Binaural(BinauralPair),
}

impl Source {
    fn from_spec(spec: &SourceSpec, sample_rate: f32, noise_seed: u32, noise_ms: f32) -> Self {
        match *spec {
            SourceSpec::Oscillator {
                waveform,
                frequency_hz,
            } => {
                let mut osc = Oscillator::new(sample_rate, frequency_hz);
                osc.set_waveform(waveform);
                Source::Oscillator(osc)
            }
            SourceSpec::Noise { color } => {
                Source::Noise(NoisePlayer::new(color, sample_rate, noise_ms, noise_seed))
            }
            SourceSpec::Binaural { left_hz, right_hz } => {
                Source::Binaural(BinauralPair::new(sample_rate, left_hz, right_hz))
            }
        }
    }

    /// Next raw (left, right) frame, before placement and gain.
    #[inline]
    fn advance(&mut self) -> (f32, f32) {
        match self {
            Source::Oscillator(osc) => {
                let s = osc.advance();
                (s, s)
            }
            Source::Noise(player) => {
                let s = player.advance();
                (s, s)
            }
            Source::Binaural(pair) => pair.advance(),
        }
    }
}

/// One active output instance.
pub struct AudioSession {
    id: SessionId,
    state: SessionState,
    source: Source,
    placement: Placement,
    gain: LinearRamp,
    target_gain: f32,
    sweep: Option<SweepState>,
    /// Audio-clock origin of the active sweep, in rendered samples.
    sweep_start_sample: u64,
    /// Audio-clock origin of the active orbit, in rendered samples.
    orbit_start_sample: u64,
    samples_rendered: u64,
    sample_rate: f32,
    scope: ScopeBuffer,
}

impl AudioSession {
    pub(crate) fn new(
        id: SessionId,
        spec: &SessionSpec,
        sample_rate: f32,
        noise_seed: u32,
        noise_ms: f32,
        scope_frames: usize,
    ) -> Self {
        Self {
            id,
            state: SessionState::Uninitialized,
            source: Source::from_spec(&spec.source, sample_rate, noise_seed, noise_ms),
            placement: spec.placement,
            gain: LinearRamp::hold(0.0),
            target_gain: spec.gain.clamp(0.0, 1.0),
            sweep: None,
            sweep_start_sample: 0,
            orbit_start_sample: 0,
            samples_rendered: 0,
            sample_rate,
            scope: ScopeBuffer::new(scope_frames),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current (ramped) gain.
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    /// Active placement.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// The active sweep, if one is attached.
    pub fn sweep(&self) -> Option<&SweepState> {
        self.sweep.as_ref()
    }

    /// Milliseconds of audio rendered so far (the session's sample clock).
    pub fn rendered_ms(&self) -> f64 {
        self.samples_rendered as f64 * 1000.0 / f64::from(self.sample_rate)
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Start producing audio, fading in over the guard interval.
    pub(crate) fn activate(&mut self, guard_ms: f32) {
        self.state = SessionState::Running;
        self.gain.ramp_to(self.target_gain, guard_ms, self.sample_rate);
    }

    /// Begin teardown: transition to `Stopped` and ramp gain to zero over
    /// the guard interval. The source stays connected until the ramp
    /// drains. Idempotent.
    pub(crate) fn begin_stop(&mut self, guard_ms: f32) {
        if self.state == SessionState::Stopped {
            return;
        }
        tracing::debug!(session = %self.id, "session stopping");
        self.state = SessionState::Stopped;
        self.gain.ramp_to(0.0, guard_ms, self.sample_rate);
    }

    /// Whether the teardown ramp has fully drained, making the session
    /// eligible for disconnection.
    pub(crate) fn is_drained(&self) -> bool {
        self.state == SessionState::Stopped && self.gain.is_complete()
    }

    /// Change the gain target with a short smoothing ramp.
    pub(crate) fn set_gain(&mut self, gain: f32, ramp_ms: f32) {
        self.target_gain = gain.clamp(0.0, 1.0);
        if self.state == SessionState::Running {
            self.gain.ramp_to(self.target_gain, ramp_ms, self.sample_rate);
        }
    }

    /// Glide the oscillator (or both binaural ears, scaled) to a new
    /// frequency. No-op for noise sources.
    pub(crate) fn glide_frequency(&mut self, frequency_hz: f32) {
        match &mut self.source {
            Source::Oscillator(osc) => osc.set_frequency(frequency_hz),
            Source::Binaural(pair) => {
                // Preserve the beat while moving the carrier.
                let beat = pair.right_hz() - pair.left_hz();
                pair.set_frequencies(frequency_hz, frequency_hz + beat);
            }
            Source::Noise(_) => {}
        }
    }

    /// Swap the noise color, regenerating only on change. No-op for other
    /// sources.
    pub(crate) fn set_noise_color(&mut self, color: NoiseColor) {
        if let Source::Noise(player) = &mut self.source {
            player.set_color(color);
        }
    }

    pub(crate) fn set_placement(&mut self, placement: Placement) {
        if let Placement::Orbit(_) = placement {
            self.orbit_start_sample = self.samples_rendered;
        }
        self.placement = placement;
    }

    pub(crate) fn attach_sweep(&mut self, sweep: SweepState) {
        self.sweep_start_sample = self.samples_rendered;
        self.sweep = Some(sweep);
    }

    pub(crate) fn sweep_mut(&mut self) -> Option<&mut SweepState> {
        self.sweep.as_mut()
    }

    /// Whether the source is an oscillator (the only sweepable source).
    pub(crate) fn is_sweepable(&self) -> bool {
        matches!(self.source, Source::Oscillator(_))
    }

    /// Read-only view of the scope ring for the visualizer.
    pub(crate) fn scope(&self) -> &ScopeBuffer {
        &self.scope
    }

    /// Render and mix `out.len() / 2` frames of interleaved stereo into
    /// `out`, advancing the session's sample clock.
    ///
    /// Suspended and drained sessions contribute silence. A sweep that
    /// reaches its full duration auto-stops the session; an orbit that
    /// exceeds its maximum duration does the same.
    pub(crate) fn render(&mut self, out: &mut [f32], guard_ms: f32) {
        if self.state == SessionState::Suspended || self.state == SessionState::Uninitialized {
            return;
        }

        let sample_period_ms = 1000.0 / f64::from(self.sample_rate);

        for frame in out.chunks_exact_mut(2) {
            // Sweep automation, evaluated on the audio clock.
            let mut sweep_complete = false;
            let mut sweep_freq = None;
            if let Some(sweep) = &self.sweep {
                let elapsed_ms =
                    (self.samples_rendered - self.sweep_start_sample) as f64 * sample_period_ms;
                if sweep.is_complete_at_elapsed(elapsed_ms) {
                    sweep_complete = true;
                } else {
                    sweep_freq = Some(sweep.value_at_elapsed(elapsed_ms));
                }
            }
            if sweep_complete {
                self.begin_stop(guard_ms);
            } else if let Some(freq) = sweep_freq
                && let Source::Oscillator(osc) = &mut self.source
            {
                osc.set_frequency_immediate(freq);
            }

            // Orbit expiry, also on the audio clock.
            let orbit_elapsed_ms =
                (self.samples_rendered - self.orbit_start_sample) as f64 * sample_period_ms;
            if let Placement::Orbit(orbit) = self.placement
                && orbit.is_expired(orbit_elapsed_ms)
            {
                self.begin_stop(guard_ms);
            }

            let (raw_l, raw_r) = self.source.advance();
            // Binaural pairs own their hard-left/hard-right routing;
            // everything else goes through the placement.
            let (placed_l, placed_r) = if matches!(self.source, Source::Binaural(_)) {
                (raw_l, raw_r)
            } else {
                self.placement.apply(raw_l, orbit_elapsed_ms)
            };

            let gain = self.gain.advance();
            let (l, r) = (placed_l * gain, placed_r * gain);

            frame[0] += l;
            frame[1] += r;
            self.scope.push((l + r) * 0.5);
            self.samples_rendered += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(spec: SessionSpec) -> AudioSession {
        AudioSession::new(SessionId(1), &spec, 48000.0, 7, 2000.0, 256)
    }

    #[test]
    fn new_session_is_uninitialized_and_silent() {
        let mut s = session(SessionSpec::tone(440.0));
        let mut out = vec![0.0f32; 64];
        s.render(&mut out, 50.0);
        assert_eq!(s.state(), SessionState::Uninitialized);
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn activated_session_produces_audio() {
        let mut s = session(SessionSpec::tone(440.0));
        s.activate(5.0);
        assert_eq!(s.state(), SessionState::Running);

        let mut out = vec![0.0f32; 48_000];
        s.render(&mut out, 50.0);
        assert!(out.iter().any(|&x| x.abs() > 0.1));
    }

    #[test]
    fn stop_ramps_then_drains() {
        let mut s = session(SessionSpec::tone(440.0));
        s.activate(0.0);

        // Let the fade-in settle.
        let mut out = vec![0.0f32; 2048];
        s.render(&mut out, 50.0);

        s.begin_stop(50.0);
        assert_eq!(s.state(), SessionState::Stopped);
        assert!(!s.is_drained(), "guard ramp must outlive the stop call");

        // 50 ms at 48 kHz = 2400 frames.
        let mut out = vec![0.0f32; 2 * 2400];
        s.render(&mut out, 50.0);
        assert!(s.is_drained());
        assert_eq!(s.gain(), 0.0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut s = session(SessionSpec::tone(440.0));
        s.activate(0.0);
        s.begin_stop(50.0);
        s.begin_stop(50.0);
        assert_eq!(s.state(), SessionState::Stopped);
    }

    #[test]
    fn binaural_bypasses_placement() {
        let spec = SessionSpec::binaural(200.0, 210.0).with_placement(Placement::Pan(-1.0));
        let mut s = session(spec);
        s.activate(0.0);

        let mut out = vec![0.0f32; 2 * 4800];
        s.render(&mut out, 50.0);

        // Hard-left pan would have silenced the right channel; binaural
        // routing must not.
        let right_energy: f32 = out.chunks_exact(2).map(|f| f[1] * f[1]).sum();
        assert!(right_energy > 1.0);
    }

    #[test]
    fn sample_clock_tracks_rendered_frames() {
        let mut s = session(SessionSpec::tone(1000.0));
        s.activate(0.0);

        let mut out = vec![0.0f32; 2 * 4800]; // 100 ms
        s.render(&mut out, 50.0);
        assert!((s.rendered_ms() - 100.0).abs() < 1e-6);
    }
}
