//! Session orchestration and the render entry point.
//!
//! The engine owns the device handle and enforces the shared-resource
//! policy: at most one session is `Running` at any time. Starting a new
//! session stops the previous one first, and the stopped session keeps its
//! device path only until its teardown gain ramp drains, at which point it
//! is disconnected and dropped.
//!
//! The render side ([`Engine::render`]) is wired to the platform's output
//! callback; the display side ([`Engine::tick`]) is driven by the caller's
//! frame clock and only reads time to recompute sweep display values.

use crate::device::{AudioDeviceHandle, DeviceState};
use crate::error::{EngineError, Result};
use crate::session::{AudioSession, SessionId, SessionSpec, SessionState};
use crate::spatial::{Channel, OrbitParams, Placement};
use crate::sweep::{SweepCurve, SweepState};
use oido_synth::NoiseColor;

/// Tunable constants of the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Teardown/startup gain guard ramp in milliseconds. Cancellation and
    /// stop always ramp gain over at least this interval before the
    /// source is disconnected.
    pub guard_ramp_ms: f32,
    /// Smoothing ramp for routine gain changes, in milliseconds.
    pub gain_ramp_ms: f32,
    /// Seed for noise buffer generation.
    pub noise_seed: u32,
    /// Noise buffer length in milliseconds.
    pub noise_buffer_ms: f32,
    /// Scope ring capacity in frames, sized for the visualizer FFT.
    pub scope_frames: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            guard_ramp_ms: 50.0,
            gain_ramp_ms: 10.0,
            noise_seed: 0x0D10,
            noise_buffer_ms: 2000.0,
            scope_frames: 2048,
        }
    }
}

/// Callback invoked with the current sweep display value on each tick.
pub type SweepTickFn = Box<dyn FnMut(f32) + Send>;

/// The stimulus/response engine.
///
/// # Example
///
/// ```rust
/// use oido_engine::{AudioDeviceHandle, Engine, SessionSpec, SessionState};
///
/// let mut device = AudioDeviceHandle::new(48000.0);
/// device.unlock().unwrap();
/// let mut engine = Engine::new(device);
///
/// let id = engine.start_session(SessionSpec::tone(440.0)).unwrap();
/// assert_eq!(engine.session_state(id), Some(SessionState::Running));
///
/// let mut buffer = vec![0.0f32; 512];
/// engine.render(&mut buffer);
/// engine.stop_session(id);
/// ```
pub struct Engine {
    device: AudioDeviceHandle,
    config: EngineConfig,
    active: Option<AudioSession>,
    draining: Vec<AudioSession>,
    next_id: u64,
    sweep_observers: Vec<(SessionId, SweepTickFn)>,
}

impl Engine {
    /// Create an engine with default tuning.
    pub fn new(device: AudioDeviceHandle) -> Self {
        Self::with_config(device, EngineConfig::default())
    }

    /// Create an engine with explicit tuning.
    pub fn with_config(device: AudioDeviceHandle, config: EngineConfig) -> Self {
        Self {
            device,
            config,
            active: None,
            draining: Vec::new(),
            next_id: 1,
            sweep_observers: Vec::new(),
        }
    }

    /// The device handle the engine schedules against.
    pub fn device(&self) -> &AudioDeviceHandle {
        &self.device
    }

    /// Unlock the device after a user gesture and resume any session that
    /// was started while the device was still gated.
    pub fn unlock(&mut self) -> Result<()> {
        self.device.unlock()?;
        if let Some(session) = &mut self.active
            && session.state() == SessionState::Suspended
        {
            session.activate(self.config.guard_ramp_ms);
            tracing::info!(session = %session.id(), "suspended session resumed");
        }
        Ok(())
    }

    /// Start a session, stopping any session that is already running.
    ///
    /// The previous session transitions to `Stopped` before the new one
    /// becomes `Running`; there is never an instant with two running
    /// sessions. Frequencies are validated against the device up front:
    /// non-positive values are rejected as out of range, and values the
    /// device's sample rate cannot reproduce fail the sample-rate
    /// precondition.
    pub fn start_session(&mut self, spec: SessionSpec) -> Result<SessionId> {
        if self.device.state() == DeviceState::Closed {
            return Err(EngineError::DeviceUnavailable("device closed".to_string()));
        }
        for hz in spec.source.frequencies() {
            if hz <= 0.0 {
                return Err(EngineError::FrequencyOutOfRange {
                    requested_hz: hz,
                    nyquist_hz: self.device.nyquist_hz(),
                });
            }
        }
        if let Some(max_hz) = spec.source.max_frequency_hz() {
            self.device.ensure_supports(max_hz)?;
        }

        // Stop-before-start: the previous session must be stopped (and its
        // teardown ramp scheduled) before the new one can run.
        if let Some(previous) = self.active.take() {
            self.retire(previous);
        }

        let id = SessionId(self.next_id);
        self.next_id += 1;

        let mut session = AudioSession::new(
            id,
            &spec,
            self.device.sample_rate(),
            self.config.noise_seed,
            self.config.noise_buffer_ms,
            self.config.scope_frames,
        );

        match self.device.state() {
            DeviceState::Ready => session.activate(self.config.guard_ramp_ms),
            DeviceState::Uninitialized => session.set_state(SessionState::Suspended),
            DeviceState::Closed => unreachable!("checked above"),
        }

        debug_assert!(
            !self
                .draining
                .iter()
                .any(|s| s.state() == SessionState::Running),
            "{}",
            EngineError::SessionConflict
        );

        tracing::info!(session = %id, ?spec.source, "session started");
        self.active = Some(session);
        Ok(id)
    }

    /// Stop a session. Idempotent: stopping an unknown or already-stopped
    /// session is a no-op, not an error.
    pub fn stop_session(&mut self, id: SessionId) {
        if let Some(session) = self.active.take_if(|s| s.id() == id) {
            self.retire(session);
        }
        self.sweep_observers.retain(|(sid, _)| *sid != id);
    }

    /// Stop whatever is playing.
    pub fn stop_all(&mut self) {
        if let Some(session) = self.active.take() {
            self.retire(session);
        }
        self.sweep_observers.clear();
    }

    /// Lifecycle state of a session, `None` once it has fully drained and
    /// been disconnected.
    pub fn session_state(&self, id: SessionId) -> Option<SessionState> {
        self.find(id).map(AudioSession::state)
    }

    /// The currently running (or suspended) session, if any.
    pub fn current_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(AudioSession::id)
    }

    /// Glide a live session's frequency to a new value.
    pub fn update_frequency(&mut self, id: SessionId, frequency_hz: f32) -> Result<()> {
        self.device.validate_frequency(frequency_hz)?;
        let session = self.find_live_mut(id)?;
        session.glide_frequency(frequency_hz);
        Ok(())
    }

    /// Change a live session's gain, smoothed over the gain ramp.
    pub fn update_gain(&mut self, id: SessionId, gain: f32) -> Result<()> {
        let ramp_ms = self.config.gain_ramp_ms;
        let session = self.find_live_mut(id)?;
        session.set_gain(gain, ramp_ms);
        Ok(())
    }

    /// Swap a live noise session's color. Regenerates the buffer only when
    /// the color actually changes.
    pub fn set_noise_color(&mut self, id: SessionId, color: NoiseColor) -> Result<()> {
        let session = self.find_live_mut(id)?;
        session.set_noise_color(color);
        Ok(())
    }

    /// Set a live session's stereo pan.
    pub fn set_pan(&mut self, id: SessionId, pan: f32) -> Result<()> {
        let session = self.find_live_mut(id)?;
        session.set_placement(Placement::Pan(pan.clamp(-1.0, 1.0)));
        Ok(())
    }

    /// Set one channel's polarity on a live session.
    pub fn set_polarity(&mut self, id: SessionId, channel: Channel, inverted: bool) -> Result<()> {
        let session = self.find_live_mut(id)?;
        let mut placement = session.placement();
        placement.set_polarity(channel, inverted);
        session.set_placement(placement);
        Ok(())
    }

    /// Start an orbiting placement on a live session.
    ///
    /// The orbit is a bounded resource: it hard-stops the session after
    /// `max_duration_s`.
    pub fn start_orbit(
        &mut self,
        id: SessionId,
        radius: f32,
        angular_velocity: f32,
        max_duration_s: f32,
    ) -> Result<()> {
        let session = self.find_live_mut(id)?;
        session.set_placement(Placement::Orbit(OrbitParams {
            radius,
            angular_velocity,
            max_duration_ms: f64::from(max_duration_s) * 1000.0,
        }));
        Ok(())
    }

    /// Attach a frequency sweep to a live oscillator session.
    ///
    /// `now_ms` anchors the display clock; the audio side anchors itself
    /// to the session's sample clock at the same moment.
    pub fn start_sweep(
        &mut self,
        id: SessionId,
        start_hz: f32,
        end_hz: f32,
        duration_ms: f64,
        curve: SweepCurve,
        now_ms: f64,
    ) -> Result<()> {
        for hz in [start_hz, end_hz] {
            if hz <= 0.0 {
                return Err(EngineError::FrequencyOutOfRange {
                    requested_hz: hz,
                    nyquist_hz: self.device.nyquist_hz(),
                });
            }
        }
        self.device.ensure_supports(start_hz.max(end_hz))?;

        let session = self.find_live_mut(id)?;
        if !session.is_sweepable() {
            return Err(EngineError::UnknownSession(id.0));
        }
        session.attach_sweep(SweepState::new(
            start_hz, end_hz, duration_ms, now_ms, curve,
        ));
        tracing::info!(session = %id, start_hz, end_hz, duration_ms, "sweep started");
        Ok(())
    }

    /// Cancel a sweep mid-flight.
    ///
    /// Freezes the display value, then stops the session: gain ramps to
    /// zero over the guard interval before the source is disconnected.
    /// Idempotent, including on sessions that no longer exist.
    pub fn cancel_sweep(&mut self, id: SessionId, now_ms: f64) {
        let guard_ms = self.config.guard_ramp_ms;
        if let Some(session) = self.find_mut(id) {
            if let Some(sweep) = session.sweep_mut() {
                sweep.cancel(now_ms);
            }
            session.begin_stop(guard_ms);
        }
        // Already stopped above; this only moves it to the drain list so
        // the guard ramp plays out before disconnection.
        if let Some(session) = self.active.take_if(|s| s.id() == id) {
            self.draining.push(session);
        }
        self.sweep_observers.retain(|(sid, _)| *sid != id);
    }

    /// The sweep's display value at `now_ms`, if the session still exists
    /// and has a sweep attached. Stable (frozen) after cancellation.
    pub fn sweep_value(&self, id: SessionId, now_ms: f64) -> Option<f32> {
        self.find(id)
            .and_then(AudioSession::sweep)
            .map(|sweep| sweep.value_at(now_ms))
    }

    /// Register an observer for sweep display ticks on a session.
    pub fn on_sweep_tick(&mut self, id: SessionId, callback: SweepTickFn) {
        self.sweep_observers.push((id, callback));
    }

    /// Display-clock tick: recompute sweep display values, notify
    /// observers, and auto-stop sweeps that have run their full duration.
    ///
    /// Driven by the caller's frame clock; independent of the render path.
    pub fn tick(&mut self, now_ms: f64) {
        let mut completed = None;
        if let Some(session) = &self.active
            && let Some(sweep) = session.sweep()
        {
            let value = sweep.value_at(now_ms);
            let id = session.id();
            for (sid, callback) in &mut self.sweep_observers {
                if *sid == id {
                    callback(value);
                }
            }
            if sweep.is_complete(now_ms) {
                completed = Some(id);
            }
        }
        if let Some(id) = completed {
            tracing::info!(session = %id, "sweep complete");
            self.stop_session(id);
        }
    }

    /// Render interleaved stereo into `out`.
    ///
    /// Mixes the active session with any sessions still draining their
    /// teardown ramps, then disconnects the ones that have fully drained.
    /// The per-frame path never allocates, locks, errors, or panics; the
    /// only bookkeeping outside it is moving a finished session to the
    /// drain list.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let guard_ms = self.config.guard_ramp_ms;

        if let Some(session) = &mut self.active {
            session.render(out, guard_ms);
        }
        for session in &mut self.draining {
            session.render(out, guard_ms);
        }

        // A session whose guard ramp has drained releases its device path.
        self.draining.retain(|session| !session.is_drained());

        // The active slot can also finish on its own (sweep or orbit
        // auto-stop); move it out so it drains and disconnects.
        if let Some(session) = self
            .active
            .take_if(|s| s.state() == SessionState::Stopped)
        {
            self.draining.push(session);
        }
    }

    /// Scope snapshot for the visualizer: the session's state plus its
    /// most recent mono frames.
    pub(crate) fn scope_of(&self, id: SessionId) -> Option<(SessionState, Vec<f32>)> {
        self.find(id)
            .map(|session| (session.state(), session.scope().snapshot()))
    }

    fn retire(&mut self, mut session: AudioSession) {
        session.begin_stop(self.config.guard_ramp_ms);
        self.draining.push(session);
    }

    fn find(&self, id: SessionId) -> Option<&AudioSession> {
        self.active
            .as_ref()
            .filter(|s| s.id() == id)
            .or_else(|| self.draining.iter().find(|s| s.id() == id))
    }

    fn find_mut(&mut self, id: SessionId) -> Option<&mut AudioSession> {
        if let Some(session) = self.active.as_mut().filter(|s| s.id() == id) {
            return Some(session);
        }
        self.draining.iter_mut().find(|s| s.id() == id)
    }

    /// A live (active-slot) session for parameter mutation; stopped and
    /// drained sessions reject updates.
    fn find_live_mut(&mut self, id: SessionId) -> Result<&mut AudioSession> {
        self.active
            .as_mut()
            .filter(|s| s.id() == id)
            .ok_or(EngineError::UnknownSession(id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_engine() -> Engine {
        let mut device = AudioDeviceHandle::new(48000.0);
        device.unlock().unwrap();
        Engine::new(device)
    }

    /// Render `ms` milliseconds of audio and return the buffer.
    fn render_ms(engine: &mut Engine, ms: f64) -> Vec<f32> {
        let frames = (ms / 1000.0 * 48000.0) as usize;
        let mut out = vec![0.0f32; frames * 2];
        engine.render(&mut out);
        out
    }

    #[test]
    fn start_produces_running_session() {
        let mut engine = ready_engine();
        let id = engine.start_session(SessionSpec::tone(440.0)).unwrap();
        assert_eq!(engine.session_state(id), Some(SessionState::Running));

        let out = render_ms(&mut engine, 100.0);
        assert!(out.iter().any(|&x| x.abs() > 0.1));
    }

    #[test]
    fn start_on_gated_device_suspends() {
        let device = AudioDeviceHandle::new(48000.0);
        let mut engine = Engine::new(device);

        let id = engine.start_session(SessionSpec::tone(440.0)).unwrap();
        assert_eq!(engine.session_state(id), Some(SessionState::Suspended));

        // Suspended sessions are silent.
        let out = render_ms(&mut engine, 50.0);
        assert!(out.iter().all(|&x| x == 0.0));

        // The unlock gesture resumes them.
        engine.unlock().unwrap();
        assert_eq!(engine.session_state(id), Some(SessionState::Running));
    }

    #[test]
    fn exclusivity_stops_previous_before_starting_next() {
        let mut engine = ready_engine();
        let a = engine.start_session(SessionSpec::tone(440.0)).unwrap();
        render_ms(&mut engine, 100.0);

        let b = engine.start_session(SessionSpec::tone(880.0)).unwrap();

        // A is already Stopped by the time B exists; at no point were both
        // running.
        assert_eq!(engine.session_state(a), Some(SessionState::Stopped));
        assert_eq!(engine.session_state(b), Some(SessionState::Running));
        assert_eq!(engine.current_session(), Some(b));
    }

    #[test]
    fn stopped_session_drains_then_disconnects() {
        let mut engine = ready_engine();
        let id = engine.start_session(SessionSpec::tone(440.0)).unwrap();
        render_ms(&mut engine, 100.0);

        engine.stop_session(id);
        assert_eq!(engine.session_state(id), Some(SessionState::Stopped));

        // After the 50 ms guard ramp the session is disconnected entirely.
        render_ms(&mut engine, 60.0);
        assert_eq!(engine.session_state(id), None);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut engine = ready_engine();
        let id = engine.start_session(SessionSpec::tone(440.0)).unwrap();
        engine.stop_session(id);
        engine.stop_session(id);
        render_ms(&mut engine, 100.0);
        engine.stop_session(id); // already disconnected: still a no-op
    }

    #[test]
    fn rejects_frequencies_device_cannot_carry() {
        let mut engine = ready_engine();

        assert!(matches!(
            engine.start_session(SessionSpec::tone(25_000.0)),
            Err(EngineError::SampleRateTooLow { .. })
        ));
        assert!(matches!(
            engine.start_session(SessionSpec::tone(-440.0)),
            Err(EngineError::FrequencyOutOfRange { .. })
        ));
    }

    #[test]
    fn update_frequency_validates() {
        let mut engine = ready_engine();
        let id = engine.start_session(SessionSpec::tone(440.0)).unwrap();

        assert!(engine.update_frequency(id, 880.0).is_ok());
        assert!(matches!(
            engine.update_frequency(id, 30_000.0),
            Err(EngineError::FrequencyOutOfRange { .. })
        ));
        assert!(matches!(
            engine.update_frequency(id, 0.0),
            Err(EngineError::FrequencyOutOfRange { .. })
        ));
    }

    #[test]
    fn sweep_renders_and_completes() {
        let mut engine = ready_engine();
        let id = engine.start_session(SessionSpec::tone(1000.0)).unwrap();
        engine
            .start_sweep(id, 1000.0, 2000.0, 200.0, SweepCurve::Exponential, 0.0)
            .unwrap();

        // Halfway: still running, value between the endpoints.
        render_ms(&mut engine, 100.0);
        let value = engine.sweep_value(id, 100.0).unwrap();
        assert!(value > 1000.0 && value < 2000.0);

        // Past the end: the render path auto-stops the session.
        render_ms(&mut engine, 150.0);
        assert_eq!(engine.session_state(id), Some(SessionState::Stopped));
    }

    #[test]
    fn sweep_tick_notifies_observers() {
        use std::sync::{Arc, Mutex};

        let mut engine = ready_engine();
        let id = engine.start_session(SessionSpec::tone(1000.0)).unwrap();
        engine
            .start_sweep(id, 1000.0, 4000.0, 1000.0, SweepCurve::Linear, 0.0)
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.on_sweep_tick(
            id,
            Box::new(move |value| sink.lock().unwrap().push(value)),
        );

        engine.tick(250.0);
        engine.tick(500.0);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!((seen[0] - 1750.0).abs() < 1.0);
        assert!((seen[1] - 2500.0).abs() < 1.0);
    }

    #[test]
    fn sweep_on_noise_session_is_rejected() {
        let mut engine = ready_engine();
        let id = engine
            .start_session(SessionSpec::noise(NoiseColor::Pink))
            .unwrap();
        assert!(
            engine
                .start_sweep(id, 100.0, 200.0, 1000.0, SweepCurve::Linear, 0.0)
                .is_err()
        );
    }

    #[test]
    fn orbit_auto_stops_at_max_duration() {
        let mut engine = ready_engine();
        let id = engine.start_session(SessionSpec::tone(440.0)).unwrap();
        engine.start_orbit(id, 2.0, 3.0, 0.1).unwrap();

        render_ms(&mut engine, 50.0);
        assert_eq!(engine.session_state(id), Some(SessionState::Running));

        render_ms(&mut engine, 100.0);
        assert_eq!(engine.session_state(id), Some(SessionState::Stopped));
    }
}
