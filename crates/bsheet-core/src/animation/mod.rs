#![forbid(unsafe_code)]

//! Time-driven motion for sheet offsets.
//!
//! Animations advance only when the host's scheduler calls
//! [`Animation::tick`]. There is no timer or thread behind them: a host that
//! stops ticking freezes every animation in place.

pub mod spring;

use std::time::Duration;

pub use spring::{Spring, SpringConfig};

/// A value that changes over time under host-driven ticks.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end state.
    fn is_complete(&self) -> bool;

    /// Current value, in the animated quantity's own units.
    fn value(&self) -> f64;

    /// Return to the initial state.
    fn reset(&mut self);
}
