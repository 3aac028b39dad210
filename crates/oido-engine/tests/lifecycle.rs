//! End-to-end lifecycle tests for the measurement engine.
//!
//! Exercises the properties the test suite exists to guarantee: sweep
//! endpoint correctness, session exclusivity, polarity cancellation, the
//! cancellation teardown ordering, and real backend wiring through the
//! deterministic mock output.

use oido_engine::{
    AudioDeviceHandle, Engine, EngineError, Placement, SessionSpec, SessionState, SweepCurve,
};
use oido_io::{BackendStreamConfig, MockBackend, OutputBackend};
use std::sync::{Arc, Mutex};

const SR: f32 = 48000.0;

fn ready_engine() -> Engine {
    let mut device = AudioDeviceHandle::new(SR);
    device.unlock().unwrap();
    Engine::new(device)
}

fn render_ms(engine: &mut Engine, ms: f64) -> Vec<f32> {
    let frames = (ms / 1000.0 * f64::from(SR)) as usize;
    let mut out = vec![0.0f32; frames * 2];
    engine.render(&mut out);
    out
}

// ---------------------------------------------------------------------------
// Sweep correctness
// ---------------------------------------------------------------------------

#[test]
fn hearing_sweep_hits_both_endpoints() {
    let mut engine = ready_engine();
    let id = engine.start_session(SessionSpec::tone(22_000.0)).unwrap();
    engine
        .start_sweep(id, 22_000.0, 8_000.0, 15_000.0, SweepCurve::Exponential, 0.0)
        .unwrap();

    assert!((engine.sweep_value(id, 0.0).unwrap() - 22_000.0).abs() < 0.5);
    assert!((engine.sweep_value(id, 15_000.0).unwrap() - 8_000.0).abs() < 0.5);

    // Monotonically decreasing across the whole descent.
    let mut prev = engine.sweep_value(id, 0.0).unwrap();
    for step in 1..=100 {
        let value = engine.sweep_value(id, step as f64 * 150.0).unwrap();
        assert!(value <= prev, "sweep rose at step {step}");
        prev = value;
    }
}

#[test]
fn sweep_audio_clock_matches_display_clock() {
    let mut engine = ready_engine();
    let id = engine.start_session(SessionSpec::tone(1_000.0)).unwrap();
    engine
        .start_sweep(id, 1_000.0, 4_000.0, 500.0, SweepCurve::Exponential, 0.0)
        .unwrap();

    // Render 250 ms of audio: the audio-clock side of the sweep has
    // advanced exactly as far as the display side computes for t=250 ms.
    render_ms(&mut engine, 250.0);
    let display = engine.sweep_value(id, 250.0).unwrap();
    let expected = 1_000.0 * 4.0f32.powf(0.5);
    assert!(
        (display - expected).abs() < 5.0,
        "display {display} vs {expected}"
    );
}

// ---------------------------------------------------------------------------
// Session exclusivity
// ---------------------------------------------------------------------------

#[test]
fn never_two_running_sessions() {
    let mut engine = ready_engine();

    let a = engine.start_session(SessionSpec::tone(440.0)).unwrap();
    render_ms(&mut engine, 20.0);

    let b = engine.start_session(SessionSpec::tone(880.0)).unwrap();

    let a_state = engine.session_state(a).unwrap();
    let b_state = engine.session_state(b).unwrap();
    assert_eq!(a_state, SessionState::Stopped);
    assert_eq!(b_state, SessionState::Running);

    // Repeat with a third session mid-drain: still exactly one Running.
    let c = engine.start_session(SessionSpec::tone(660.0)).unwrap();
    let running = [a, b, c]
        .iter()
        .filter(|&&id| engine.session_state(id) == Some(SessionState::Running))
        .count();
    assert_eq!(running, 1);
}

// ---------------------------------------------------------------------------
// Polarity round trip
// ---------------------------------------------------------------------------

#[test]
fn polarity_inversion_cancels_mono_sum() {
    let mut engine = ready_engine();

    // In phase: the mono sum carries the doubled signal.
    let in_phase = SessionSpec::tone(440.0).with_placement(Placement::Polarity {
        invert_left: false,
        invert_right: false,
    });
    let id = engine.start_session(in_phase).unwrap();
    let out = render_ms(&mut engine, 200.0);
    let in_phase_sum: f32 = out
        .chunks_exact(2)
        .map(|f| (f[0] + f[1]).abs())
        .fold(0.0, f32::max);
    engine.stop_session(id);
    render_ms(&mut engine, 60.0);

    // Out of phase: left and right cancel to numerical silence.
    let inverted = SessionSpec::tone(440.0).with_placement(Placement::Polarity {
        invert_left: false,
        invert_right: true,
    });
    let id = engine.start_session(inverted).unwrap();
    let out = render_ms(&mut engine, 200.0);
    let inverted_sum: f32 = out
        .chunks_exact(2)
        .map(|f| (f[0] + f[1]).abs())
        .fold(0.0, f32::max);
    let left_alone: f32 = out.chunks_exact(2).map(|f| f[0].abs()).fold(0.0, f32::max);

    assert!(in_phase_sum > 1.5, "in-phase sum {in_phase_sum}");
    assert!(inverted_sum < 1e-5, "inverted sum {inverted_sum}");
    assert!(left_alone > 0.5, "left path should still carry signal");
}

// ---------------------------------------------------------------------------
// Cancellation safety
// ---------------------------------------------------------------------------

#[test]
fn cancel_ramps_gain_before_disconnect() {
    let mut engine = ready_engine();
    let id = engine.start_session(SessionSpec::tone(10_000.0)).unwrap();
    engine
        .start_sweep(id, 10_000.0, 2_000.0, 10_000.0, SweepCurve::Exponential, 0.0)
        .unwrap();
    render_ms(&mut engine, 500.0);

    engine.cancel_sweep(id, 500.0);

    // Stopped immediately, but still connected while the guard ramp
    // drains: the first post-cancel buffer is a fade-out, not a cut.
    assert_eq!(engine.session_state(id), Some(SessionState::Stopped));
    let out = render_ms(&mut engine, 10.0);
    assert!(
        out.iter().any(|&x| x.abs() > 0.01),
        "gain must ramp, not cut to silence"
    );

    // After the ≥50 ms guard interval the device path is released.
    render_ms(&mut engine, 60.0);
    assert_eq!(engine.session_state(id), None);
}

#[test]
fn sweep_value_is_stable_after_cancel() {
    let mut engine = ready_engine();
    let id = engine.start_session(SessionSpec::tone(10_000.0)).unwrap();
    engine
        .start_sweep(id, 10_000.0, 2_000.0, 10_000.0, SweepCurve::Exponential, 0.0)
        .unwrap();

    engine.cancel_sweep(id, 4_000.0);

    let frozen = engine.sweep_value(id, 4_000.0).unwrap();
    assert_eq!(engine.sweep_value(id, 7_000.0), Some(frozen));
    assert_eq!(engine.sweep_value(id, 60_000.0), Some(frozen));

    // Cancel again: idempotent, no panic, value unchanged.
    engine.cancel_sweep(id, 8_000.0);
    assert_eq!(engine.sweep_value(id, 8_000.0), Some(frozen));

    // Once drained and disconnected, queries degrade to None - they never
    // panic or resume advancing.
    render_ms(&mut engine, 100.0);
    assert_eq!(engine.sweep_value(id, 9_000.0), None);
}

// ---------------------------------------------------------------------------
// Error surface
// ---------------------------------------------------------------------------

#[test]
fn binaural_frequencies_validate_like_any_other() {
    let mut engine = ready_engine();
    assert!(matches!(
        engine.start_session(SessionSpec::binaural(200.0, 30_000.0)),
        Err(EngineError::SampleRateTooLow { .. })
    ));
    assert!(matches!(
        engine.start_session(SessionSpec::binaural(0.0, 210.0)),
        Err(EngineError::FrequencyOutOfRange { .. })
    ));
    assert!(engine.start_session(SessionSpec::binaural(200.0, 210.0)).is_ok());
}

// ---------------------------------------------------------------------------
// Backend wiring
// ---------------------------------------------------------------------------

#[test]
fn engine_drives_output_backend() {
    let backend = MockBackend::new();
    let config = BackendStreamConfig::default();

    let mut device = AudioDeviceHandle::new(backend.actual_sample_rate(&config) as f32);
    device.unlock().unwrap();
    let engine = Arc::new(Mutex::new(Engine::new(device)));

    let render_engine = Arc::clone(&engine);
    let _stream = backend
        .build_output_stream(
            &config,
            Box::new(move |buffer| {
                if let Ok(mut engine) = render_engine.lock() {
                    engine.render(buffer);
                }
            }),
            Box::new(|err| panic!("backend error: {err}")),
        )
        .unwrap();

    let id = engine
        .lock()
        .unwrap()
        .start_session(SessionSpec::tone(440.0))
        .unwrap();

    // Simulate the audio thread pulling buffers.
    backend.drive(4800);
    let captured = backend.captured();
    assert_eq!(captured.len(), 9600);
    assert!(captured.iter().any(|&x| x.abs() > 0.1));

    engine.lock().unwrap().stop_session(id);
    backend.drive(4800);

    // The tail of the post-stop capture is silence: ramp drained, source
    // disconnected.
    let tail = &backend.captured()[9600 + 6000..];
    assert!(tail.iter().all(|&x| x.abs() < 1e-4));
}
