#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) driving sheet offsets.
//!
//! Every animated offset change of a sheet (presenting, settling after a
//! release, dismissing) is a spring from the current offset to a target
//! offset, seeded with the gesture velocity when there is one. A flung sheet
//! therefore keeps moving in its flung direction before the spring takes over.
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! # Integration
//!
//! Semi-implicit Euler with steps of at most 4ms; larger `dt` values are
//! subdivided.
//!
//! # Invariants
//!
//! 1. `position()` is unclamped and measured in points.
//! 2. A spring at rest stays at rest until `set_target()` or `reset()`.
//! 3. Coming to rest snaps `position` exactly onto `target`.
//! 4. Stiffness is always at least 0.1; damping is never negative.
//!
//! # Failure Modes
//!
//! - Zero damping never settles. Not an error, but `is_at_rest()` may stay
//!   `false` forever.

use std::time::Duration;

use super::Animation;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Default rest threshold in points.
pub const DEFAULT_REST_THRESHOLD: f64 = 0.5;

/// Default velocity threshold in points/sec.
pub const DEFAULT_VELOCITY_THRESHOLD: f64 = 5.0;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Spring parameters, separable from any particular spring instance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringConfig {
    /// Restoring force strength (default: 300).
    pub stiffness: f64,
    /// Velocity drag (default: 2√300, critically damped).
    pub damping: f64,
    /// Position delta below which the spring may rest (default: 0.5pt).
    pub rest_threshold: f64,
    /// Velocity below which the spring may rest (default: 5pt/s).
    pub velocity_threshold: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        let stiffness: f64 = 300.0;
        Self {
            stiffness,
            damping: 2.0 * stiffness.sqrt(),
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
        }
    }
}

impl SpringConfig {
    /// Snappy settle with a hint of overshoot.
    #[must_use]
    pub fn snappy() -> Self {
        Self {
            stiffness: 400.0,
            damping: 34.0,
            ..Self::default()
        }
    }

    /// Build a spring from `initial` to `target` with these parameters.
    #[must_use]
    pub fn spring(&self, initial: f64, target: f64) -> Spring {
        Spring::new(initial, target)
            .with_stiffness(self.stiffness)
            .with_damping(self.damping)
            .with_rest_threshold(self.rest_threshold)
            .with_velocity_threshold(self.velocity_threshold)
    }
}

/// A damped harmonic oscillator producing physically-based motion.
///
/// ```
/// use std::time::Duration;
/// use bsheet_core::animation::{Animation, Spring};
///
/// let mut spring = Spring::new(800.0, 400.0);
/// for _ in 0..120 {
///     spring.tick(Duration::from_millis(16));
/// }
/// assert!(spring.is_complete());
/// assert_eq!(spring.position(), 400.0);
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring starting at `initial` and targeting `target`, using
    /// [`SpringConfig::default`] parameters.
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        let config = SpringConfig::default();
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            stiffness: config.stiffness,
            damping: config.damping,
            rest_threshold: config.rest_threshold,
            velocity_threshold: config.velocity_threshold,
            at_rest: false,
        }
    }

    /// Set stiffness (builder pattern). Clamped to minimum 0.1.
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set damping (builder pattern). Clamped to minimum 0.0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Set rest threshold (builder pattern).
    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    /// Set velocity threshold (builder pattern).
    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold.abs();
        self
    }

    /// Seed the spring with an initial velocity (builder pattern).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Current position (unclamped).
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Change the target. Wakes the spring if it was at rest.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() > f64::EPSILON {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Whether the spring has settled at the target.
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Critical damping coefficient for the current stiffness.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.sqrt()
    }

    /// Perform a single integration step of `dt` seconds.
    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance the spring by `dt`, subdividing if necessary for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }

        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }

        let pos_delta = (self.position - self.target).abs();
        if pos_delta < self.rest_threshold && self.velocity.abs() < self.velocity_threshold {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    fn value(&self) -> f64 {
        self.position
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = 0.0;
        self.at_rest = false;
    }
}
