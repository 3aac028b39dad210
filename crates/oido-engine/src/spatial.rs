//! Stereo placement: pan, polarity inversion, and orbiting sources.
//!
//! Exactly one placement mode is active per session. Pan uses the
//! constant-power law; the polarity test splits a mono source into two
//! independently signed paths so a listener can compare in-phase
//! (reinforced) against out-of-phase (cancelled) presentation; the orbit
//! moves a source on a circle around the listener and expires after a
//! bounded duration.

use libm::{cosf, sinf};
use oido_core::constant_power_pan;

/// Stereo channel selector for polarity control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// Left output path.
    Left,
    /// Right output path.
    Right,
}

/// Parameters of an orbiting 3-D placement.
///
/// The source travels a circle of `radius` meters around the listener at
/// `angular_velocity` rad/s: `x = sin(theta) * r`, `z = cos(theta) * r`,
/// `theta = elapsed * angular_velocity`. Elevation is fixed at zero.
/// Orbits are a bounded resource: they expire after `max_duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    /// Circle radius in meters.
    pub radius: f32,
    /// Angular velocity in radians per second.
    pub angular_velocity: f32,
    /// Hard stop, in milliseconds.
    pub max_duration_ms: f64,
}

impl OrbitParams {
    /// Source position `(x, z)` at `elapsed_ms` into the orbit.
    pub fn position_at(&self, elapsed_ms: f64) -> (f32, f32) {
        let theta = (elapsed_ms / 1000.0) as f32 * self.angular_velocity;
        (sinf(theta) * self.radius, cosf(theta) * self.radius)
    }

    /// Whether the orbit has exceeded its maximum duration.
    pub fn is_expired(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.max_duration_ms
    }

    /// Left/right gains at `elapsed_ms`.
    ///
    /// Azimuth maps through the constant-power pan law (`x/r` is the sine
    /// of the azimuth already); distance attenuates inversely below 1 m of
    /// clearance.
    pub fn gains_at(&self, elapsed_ms: f64) -> (f32, f32) {
        let (x, _z) = self.position_at(elapsed_ms);
        let pan = if self.radius > 0.0 { x / self.radius } else { 0.0 };
        let (left, right) = constant_power_pan(pan);
        let distance_gain = 1.0 / self.radius.max(1.0);
        (left * distance_gain, right * distance_gain)
    }
}

/// Active placement mode of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Constant-power stereo pan, -1 (hard left) to 1 (hard right).
    Pan(f32),
    /// Per-channel polarity for phase tests. Both paths run at unity gain
    /// so summing them exposes reinforcement or cancellation directly.
    Polarity {
        /// Whether the left path is sign-inverted.
        invert_left: bool,
        /// Whether the right path is sign-inverted.
        invert_right: bool,
    },
    /// Orbiting 3-D source.
    Orbit(OrbitParams),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Pan(0.0)
    }
}

impl Placement {
    /// Flip one channel's polarity, converting the placement to polarity
    /// mode if it was not already.
    pub fn set_polarity(&mut self, channel: Channel, inverted: bool) {
        let (mut left, mut right) = match *self {
            Placement::Polarity {
                invert_left,
                invert_right,
            } => (invert_left, invert_right),
            _ => (false, false),
        };
        match channel {
            Channel::Left => left = inverted,
            Channel::Right => right = inverted,
        }
        *self = Placement::Polarity {
            invert_left: left,
            invert_right: right,
        };
    }

    /// Apply the placement to one mono frame, producing left and right
    /// output samples. `elapsed_ms` positions orbiting sources.
    #[inline]
    pub fn apply(&self, mono: f32, elapsed_ms: f64) -> (f32, f32) {
        match *self {
            Placement::Pan(pan) => {
                let (l, r) = constant_power_pan(pan);
                (mono * l, mono * r)
            }
            Placement::Polarity {
                invert_left,
                invert_right,
            } => {
                let l = if invert_left { -mono } else { mono };
                let r = if invert_right { -mono } else { mono };
                (l, r)
            }
            Placement::Orbit(orbit) => {
                let (l, r) = orbit.gains_at(elapsed_ms);
                (mono * l, mono * r)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pan_splits_equally() {
        let placement = Placement::Pan(0.0);
        let (l, r) = placement.apply(1.0, 0.0);
        assert!((l - r).abs() < 1e-6);
    }

    #[test]
    fn hard_pan_isolates_channels() {
        let (l, r) = Placement::Pan(-1.0).apply(1.0, 0.0);
        assert!((l - 1.0).abs() < 1e-6 && r.abs() < 1e-6);

        let (l, r) = Placement::Pan(1.0).apply(1.0, 0.0);
        assert!(l.abs() < 1e-6 && (r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn in_phase_sum_doubles_out_of_phase_cancels() {
        // The property a polarity test exists to exhibit.
        let in_phase = Placement::Polarity {
            invert_left: false,
            invert_right: false,
        };
        let inverted = Placement::Polarity {
            invert_left: false,
            invert_right: true,
        };

        for i in 0..100 {
            let mono = sinf(i as f32 * 0.13);
            let (l, r) = in_phase.apply(mono, 0.0);
            assert!(((l + r) - 2.0 * mono).abs() < 1e-6);

            let (l, r) = inverted.apply(mono, 0.0);
            assert!((l + r).abs() < 1e-6);
        }
    }

    #[test]
    fn set_polarity_converts_and_updates() {
        let mut placement = Placement::Pan(0.3);
        placement.set_polarity(Channel::Right, true);
        assert_eq!(
            placement,
            Placement::Polarity {
                invert_left: false,
                invert_right: true,
            }
        );

        placement.set_polarity(Channel::Right, false);
        assert_eq!(
            placement,
            Placement::Polarity {
                invert_left: false,
                invert_right: false,
            }
        );
    }

    #[test]
    fn orbit_traces_the_circle() {
        let orbit = OrbitParams {
            radius: 2.0,
            angular_velocity: core::f32::consts::PI, // half turn per second
            max_duration_ms: 10_000.0,
        };

        // t=0: directly ahead.
        let (x, z) = orbit.position_at(0.0);
        assert!(x.abs() < 1e-5 && (z - 2.0).abs() < 1e-5);

        // Quarter period (500 ms): hard right.
        let (x, z) = orbit.position_at(500.0);
        assert!((x - 2.0).abs() < 1e-4 && z.abs() < 1e-3);

        // Half period: behind.
        let (x, z) = orbit.position_at(1000.0);
        assert!(x.abs() < 1e-3 && (z + 2.0).abs() < 1e-4);
    }

    #[test]
    fn orbit_expires_at_max_duration() {
        let orbit = OrbitParams {
            radius: 1.0,
            angular_velocity: 1.0,
            max_duration_ms: 5_000.0,
        };
        assert!(!orbit.is_expired(4_999.0));
        assert!(orbit.is_expired(5_000.0));
    }

    #[test]
    fn orbit_gains_follow_azimuth() {
        let orbit = OrbitParams {
            radius: 1.0,
            angular_velocity: core::f32::consts::PI,
            max_duration_ms: 10_000.0,
        };

        // Hard right at the quarter turn.
        let (l, r) = orbit.gains_at(500.0);
        assert!(r > 0.99 && l.abs() < 0.01, "left {l}, right {r}");
    }

    #[test]
    fn distant_orbit_attenuates() {
        let near = OrbitParams {
            radius: 1.0,
            angular_velocity: 0.0,
            max_duration_ms: 1000.0,
        };
        let far = OrbitParams {
            radius: 4.0,
            angular_velocity: 0.0,
            max_duration_ms: 1000.0,
        };

        let near_power = {
            let (l, r) = near.gains_at(0.0);
            l * l + r * r
        };
        let far_power = {
            let (l, r) = far.gains_at(0.0);
            l * l + r * r
        };
        assert!(far_power < near_power / 4.0);
    }
}
