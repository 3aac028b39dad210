//! Oido Core - shared primitives for the stimulus/response engine
//!
//! This crate provides the foundational building blocks used by every other
//! oido crate:
//!
//! - [`Clock`] - injectable monotonic time capability, so sweep display
//!   loops, visualizer sampling, and tap timing are testable without a real
//!   display loop ([`ManualClock`] drives discrete ticks in tests)
//! - [`SmoothedParam`] - one-pole exponential smoothing for click-free
//!   frequency and gain changes
//! - [`LinearRamp`] - fixed-duration gain ramps for click-free teardown
//! - Math helpers: [`db_to_linear`], [`constant_power_pan`], interval
//!   statistics
//! - [`ScoreBand`] - linear 0-100 normalization of raw measured values
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. [`SystemClock`] requires the default
//! `std` feature; everything else is freestanding with `libm` for math.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod clock;
pub mod math;
pub mod param;
pub mod score;

pub use clock::{Clock, ManualClock};
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use math::{
    constant_power_pan, db_to_linear, interval_mean, interval_stddev, linear_to_db,
};
pub use param::{LinearRamp, SmoothedParam};
pub use score::ScoreBand;
